use super::Project;
use crate::output::print_with_next_step;
use anyhow::Context;
use mission_core::{exec_log::ExecutionLog, finalize::Finalizer, types::LogLevel};
use std::path::Path;

/// An invalid plan is a report with a STOP line, not a failed command.
pub fn run(root: &Path) -> anyhow::Result<()> {
    let project = Project::new(root);
    let report = Finalizer::new(&project.fs, &project.mission_dir)
        .finalize()
        .context("failed to finalize mission")?;

    let next_step = if report.valid {
        ExecutionLog::new(&project.fs, &project.mission_dir)
            .append(LogLevel::Info, "planning finalized")?;
        "PROCEED. Mission is planned. Run 'mission apply' to start execution.".to_string()
    } else {
        format!(
            "STOP. {}. Fill these sections and run 'mission finalize' again.",
            report.message
        )
    };
    print_with_next_step(&report, &next_step)
}
