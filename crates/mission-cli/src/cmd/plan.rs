use super::{Project, Stopped};
use crate::output::print_with_next_step;
use anyhow::Context as _;
use clap::Subcommand;
use mission_core::{
    exec_log::ExecutionLog,
    lifecycle,
    paths,
    plan::PlanSpec,
    types::{Context, LogLevel, MissionStatus},
};
use serde_json::json;
use std::path::Path;

#[derive(Subcommand)]
pub enum PlanSubcommand {
    /// Create the mission document for a new intent
    New {
        /// What the mission should achieve
        intent: String,
    },

    /// Copy .mission/plan.json into the mission document
    Sync,
}

pub fn run(root: &Path, subcmd: PlanSubcommand) -> anyhow::Result<()> {
    let project = Project::new(root);
    match subcmd {
        PlanSubcommand::New { intent } => new(&project, &intent),
        PlanSubcommand::Sync => sync(&project),
    }
}

fn new(project: &Project, intent: &str) -> anyhow::Result<()> {
    if intent.trim().is_empty() {
        anyhow::bail!("intent must not be empty");
    }
    if project.has_mission() {
        return Err(Stopped {
            next_step: "STOP. A mission document already exists. Refine it with 'mission update' or 'mission plan sync', or pause it first.".to_string(),
        }
        .into());
    }
    let check = project.gate(Context::Plan)?;

    let id = match check.mission_id {
        Some(id) => id,
        None => project.ids().get_or_create_id()?,
    };
    let mission = project
        .writer()
        .create_with_intent(&id, intent)
        .context("failed to create mission document")?;
    ExecutionLog::new(&project.fs, &project.mission_dir)
        .append(LogLevel::Info, &format!("mission {id} created: {}", intent.trim()))?;

    print_with_next_step(
        &json!({
            "id": mission.id,
            "status": mission.status,
            "path": paths::mission_file(&project.mission_dir).display().to_string(),
            "stale_artifacts_cleaned": check.stale_artifacts_cleaned,
        }),
        "PROCEED. Write .mission/plan.json (intent, files, plan, verification) and run 'mission plan sync', then 'mission finalize'.",
    )
}

fn sync(project: &Project) -> anyhow::Result<()> {
    let spec = match PlanSpec::load(&project.fs, &project.mission_dir) {
        Ok(spec) => spec,
        Err(e) if e.is_not_found() => {
            return Err(Stopped {
                next_step: "STOP. .mission/plan.json does not exist. Write it before syncing."
                    .to_string(),
            }
            .into())
        }
        Err(e) => return Err(e).context("failed to read plan.json"),
    };

    let writer = project.writer();
    let mission = spec
        .apply_to_mission(&writer)
        .context("failed to apply plan.json")?;
    let problems = spec.validate();

    let open_questions = spec.clarification_questions.clone().unwrap_or_default();
    let mut status = mission.status.clone();
    if !open_questions.is_empty() && mission.status()? == MissionStatus::Planning {
        status = lifecycle::transition(&writer, MissionStatus::Clarifying)?.status;
    } else if open_questions.is_empty() && mission.status()? == MissionStatus::Clarifying {
        status = lifecycle::transition(&writer, MissionStatus::Planning)?.status;
    }

    let next_step = if !open_questions.is_empty() {
        format!(
            "STOP. Ask the user: {}. Record the answers in plan.json and sync again.",
            open_questions.join(" ")
        )
    } else if problems.is_empty() {
        "PROCEED. Plan synced. Run 'mission finalize'.".to_string()
    } else {
        format!("PROCEED. Fix plan.json: {}.", problems.join("; "))
    };

    print_with_next_step(
        &json!({
            "id": mission.id,
            "status": status,
            "scope": spec.scope_files(),
            "problems": problems,
            "clarification_questions": open_questions,
        }),
        &next_step,
    )
}
