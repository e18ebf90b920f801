use super::{Project, Stopped};
use crate::output::print_with_next_step;
use anyhow::Context as _;
use mission_core::{
    archive::{self, ArchiveReport, Archiver},
    checkpoint::CheckpointEngine,
    exec_log::ExecutionLog,
    lifecycle,
    types::{Context, LogLevel, MissionStatus},
};
use serde_json::json;
use std::path::Path;

/// Gate, consolidate, mark completed, archive, clean up. A mission already
/// marked completed skips straight to archiving so an interrupted run can
/// be resumed.
pub fn run(root: &Path, message: &str, force: bool) -> anyhow::Result<()> {
    let project = Project::new(root);

    if !project.has_mission() {
        if !force {
            return Err(Stopped {
                next_step: "STOP. No active mission to complete. Use --force to clean up leftovers."
                    .to_string(),
            }
            .into());
        }
        let removed = archive::cleanup_obsolete_files(&project.fs, &project.mission_dir)
            .context("failed to clean up mission files")?;
        return print_with_next_step(
            &json!({ "archive": ArchiveReport::nothing(), "removed": removed }),
            "PROCEED. Nothing to complete. Run 'mission check --context plan' to start a new mission.",
        );
    }

    if message.trim().is_empty() {
        anyhow::bail!("--message must not be empty");
    }
    project.gate(Context::Complete)?;
    let git = project.git()?;
    let archiver = Archiver::new(&project.fs, &git, &project.mission_dir);

    let writer = project.writer();
    let mission = writer.read()?;
    let consolidated = if mission.status()? == MissionStatus::Completed {
        tracing::info!(id = %mission.id, "mission already completed, skipping consolidate");
        None
    } else {
        let result = CheckpointEngine::new(&project.fs, &git, &project.root, &project.mission_dir)
            .consolidate(&mission.id, message)
            .context("failed to consolidate checkpoints")?;
        Some(result)
    };

    lifecycle::transition(&writer, MissionStatus::Completed)
        .context("failed to mark mission completed")?;
    ExecutionLog::new(&project.fs, &project.mission_dir)
        .append(LogLevel::Success, &format!("mission completed: {message}"))?;

    let report = archiver.archive(force).context("failed to archive mission")?;
    let removed = archiver
        .cleanup_obsolete_files()
        .context("failed to clean up mission files")?;

    print_with_next_step(
        &json!({
            "id": mission.id,
            "consolidate": consolidated,
            "archive": report,
            "removed": removed,
        }),
        "PROCEED. Mission complete. Run 'mission check --context plan' to start the next one.",
    )
}
