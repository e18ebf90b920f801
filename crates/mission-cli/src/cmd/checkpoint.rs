use super::Project;
use crate::output::print_with_next_step;
use anyhow::Context;
use clap::Subcommand;
use mission_core::checkpoint::CheckpointEngine;
use serde_json::json;
use std::path::Path;

#[derive(Subcommand)]
pub enum CheckpointSubcommand {
    /// Commit the mission scope and tag it
    Create,

    /// Reset scope files to a checkpoint, or to the baseline with --all
    Restore {
        /// Checkpoint tag, e.g. 20261118143005-0421-2
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        name: Option<String>,
        /// Roll back to the baseline and drop every checkpoint
        #[arg(long)]
        all: bool,
    },

    /// Delete every checkpoint tag of the mission
    Clear,

    /// Squash the mission's checkpoints into one commit
    Consolidate {
        #[arg(long, short = 'm')]
        message: String,
    },

    /// List checkpoints with their commits
    List,
}

pub fn run(root: &Path, subcmd: CheckpointSubcommand) -> anyhow::Result<()> {
    let project = Project::new(root);
    let git = project.git()?;
    let engine = CheckpointEngine::new(&project.fs, &git, &project.root, &project.mission_dir);
    let id = project.mission_id()?;

    match subcmd {
        CheckpointSubcommand::Create => {
            let name = engine.create(&id).context("failed to create checkpoint")?;
            print_with_next_step(
                &json!({ "id": id, "checkpoint": name }),
                "PROCEED. Checkpoint saved. Continue with the next PLAN step.",
            )
        }
        CheckpointSubcommand::Restore { all: true, .. } => {
            let result = engine
                .restore_all(&id)
                .context("failed to restore baseline")?;
            print_with_next_step(
                &result,
                "PROCEED. Scope is back at the baseline and the mission's changes are staged. Review them, then discard or re-plan.",
            )
        }
        CheckpointSubcommand::Restore { name, all: false } => {
            let name = name.context("a checkpoint name is required")?;
            let result = engine
                .restore(&name)
                .with_context(|| format!("failed to restore {name}"))?;
            print_with_next_step(
                &result,
                "PROCEED. Scope files restored. Resume from the matching PLAN step.",
            )
        }
        CheckpointSubcommand::Clear => {
            let deleted = engine.clear(&id).context("failed to clear checkpoints")?;
            print_with_next_step(
                &json!({ "id": id, "deleted": deleted }),
                "PROCEED. Checkpoint tags removed.",
            )
        }
        CheckpointSubcommand::Consolidate { message } => {
            let result = engine
                .consolidate(&id, &message)
                .context("failed to consolidate checkpoints")?;
            print_with_next_step(
                &result,
                "PROCEED. Checkpoints squashed into one commit.",
            )
        }
        CheckpointSubcommand::List => {
            let checkpoints = engine.list(&id).context("failed to list checkpoints")?;
            print_with_next_step(
                &json!({ "id": id, "checkpoints": checkpoints }),
                "PROCEED. Use 'mission checkpoint restore <NAME>' to roll back to one.",
            )
        }
    }
}
