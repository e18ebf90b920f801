use super::Project;
use crate::output::print_with_next_step;
use mission_core::{exec_log::ExecutionLog, types::LogLevel};
use serde_json::json;
use std::path::Path;

pub fn run(root: &Path, message: &str, level: &str) -> anyhow::Result<()> {
    let level: LogLevel = level.parse()?;
    let project = Project::new(root);
    let log = ExecutionLog::new(&project.fs, &project.mission_dir);
    log.append(level, message)?;
    print_with_next_step(
        &json!({ "level": level, "path": log.path().display().to_string() }),
        "PROCEED. Logged.",
    )
}
