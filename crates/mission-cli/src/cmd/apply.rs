use super::{Project, Stopped};
use crate::output::print_with_next_step;
use anyhow::Context as _;
use clap::Subcommand;
use mission_core::{
    checkpoint::CheckpointEngine,
    exec_log::ExecutionLog,
    lifecycle,
    types::{Context, LogLevel, MissionStatus},
};
use serde_json::json;
use std::path::Path;

#[derive(Subcommand)]
pub enum ApplySubcommand {
    /// Execution finished; mark the mission executed
    Done,

    /// Execution failed; mark the mission failed
    Fail {
        /// What went wrong
        #[arg(long, default_value = "")]
        reason: String,
    },
}

pub fn run(root: &Path, subcmd: Option<ApplySubcommand>) -> anyhow::Result<()> {
    let project = Project::new(root);
    match subcmd {
        None => start(&project),
        Some(ApplySubcommand::Done) => finish(&project),
        Some(ApplySubcommand::Fail { reason }) => fail(&project, &reason),
    }
}

fn start(project: &Project) -> anyhow::Result<()> {
    if !project.has_mission() {
        return Err(Stopped {
            next_step: "STOP. No active mission. Run 'mission plan new' and 'mission finalize' first."
                .to_string(),
        }
        .into());
    }
    project.gate(Context::Apply)?;
    let git = project.git()?;

    let mission = lifecycle::transition(&project.writer(), MissionStatus::Active)
        .context("failed to activate mission")?;
    let checkpoint = CheckpointEngine::new(&project.fs, &git, &project.root, &project.mission_dir)
        .create(&mission.id)
        .context("failed to create checkpoint")?;

    ExecutionLog::new(&project.fs, &project.mission_dir).append(
        LogLevel::Info,
        &format!("execution started at checkpoint {checkpoint}"),
    )?;

    print_with_next_step(
        &json!({
            "id": mission.id,
            "status": mission.status,
            "checkpoint": checkpoint,
            "plan_steps": mission.plan_steps(),
        }),
        "PROCEED. Execute the PLAN steps in order. Run 'mission update step <N>' after each and 'mission checkpoint create' at safe points, then 'mission apply done'.",
    )
}

fn finish(project: &Project) -> anyhow::Result<()> {
    let mission = lifecycle::transition(&project.writer(), MissionStatus::Executed)
        .context("failed to mark mission executed")?;
    ExecutionLog::new(&project.fs, &project.mission_dir)
        .append(LogLevel::Success, "execution finished")?;
    print_with_next_step(
        &json!({ "id": mission.id, "status": mission.status }),
        "PROCEED. Run 'mission complete --message <msg>' to consolidate and archive.",
    )
}

fn fail(project: &Project, reason: &str) -> anyhow::Result<()> {
    let mission = lifecycle::transition(&project.writer(), MissionStatus::Failed)
        .context("failed to mark mission failed")?;
    let record = if reason.trim().is_empty() {
        "execution failed".to_string()
    } else {
        format!("execution failed: {reason}")
    };
    ExecutionLog::new(&project.fs, &project.mission_dir).append(LogLevel::Error, &record)?;
    print_with_next_step(
        &json!({ "id": mission.id, "status": mission.status }),
        "STOP. Execution failed. Diagnose with 'mission check --context debug', then retry with 'mission apply' or roll back with 'mission checkpoint restore --all'.",
    )
}
