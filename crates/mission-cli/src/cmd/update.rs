use super::Project;
use crate::output::print_with_next_step;
use anyhow::Context;
use clap::Subcommand;
use mission_core::{lifecycle, types::LogLevel, types::MissionStatus};
use serde_json::json;
use std::path::Path;

#[derive(Subcommand)]
pub enum UpdateSubcommand {
    /// Replace a section's content
    Section {
        /// Section name, e.g. INTENT or VERIFICATION
        name: String,
        content: String,
    },

    /// Replace (or extend) a section with one item per line
    List {
        name: String,
        items: Vec<String>,
        /// Keep the section's existing lines before the new items
        #[arg(long)]
        append: bool,
    },

    /// Set frontmatter fields from key=value pairs
    Frontmatter {
        #[arg(required = true)]
        pairs: Vec<String>,
    },

    /// Tick a PLAN step (1-based)
    Step {
        number: usize,
        /// Also record this in the execution log
        #[arg(long, default_value = "")]
        message: String,
        #[arg(long, default_value = "INFO")]
        level: String,
    },

    /// Move the mission to another status
    Status {
        status: String,
        /// Skip the transition table
        #[arg(long)]
        force: bool,
    },
}

pub fn run(root: &Path, subcmd: UpdateSubcommand) -> anyhow::Result<()> {
    let project = Project::new(root);
    let writer = project.writer();

    match subcmd {
        UpdateSubcommand::Section { name, content } => {
            writer
                .update_section(&name, &content)
                .with_context(|| format!("failed to update section {name}"))?;
            print_with_next_step(
                &json!({ "section": name.to_uppercase() }),
                "PROCEED. Section updated.",
            )
        }
        UpdateSubcommand::List {
            name,
            items,
            append,
        } => {
            writer
                .update_list(&name, &items, append)
                .with_context(|| format!("failed to update section {name}"))?;
            print_with_next_step(
                &json!({ "section": name.to_uppercase(), "items": items.len(), "append": append }),
                "PROCEED. Section updated.",
            )
        }
        UpdateSubcommand::Frontmatter { pairs } => {
            let applied = writer
                .update_frontmatter(&pairs)
                .context("failed to update frontmatter")?;
            print_with_next_step(&json!({ "applied": applied }), "PROCEED. Frontmatter updated.")
        }
        UpdateSubcommand::Step {
            number,
            message,
            level,
        } => {
            let level: LogLevel = level.parse()?;
            let step = writer
                .mark_plan_step_complete(number, Some(level), &message)
                .with_context(|| format!("failed to mark step {number}"))?;
            let remaining = writer
                .read()?
                .plan_steps()
                .iter()
                .filter(|s| !s.done)
                .count();
            let next_step = if remaining == 0 {
                "PROCEED. All PLAN steps are done. Run the VERIFICATION, then 'mission apply done'."
                    .to_string()
            } else {
                format!("PROCEED. {remaining} PLAN step(s) remain. Continue with the next one.")
            };
            print_with_next_step(&json!({ "step": step, "remaining": remaining }), &next_step)
        }
        UpdateSubcommand::Status { status, force } => {
            let target: MissionStatus = status.parse()?;
            let mission = if force {
                writer.update_status(target)?
            } else {
                lifecycle::transition(&writer, target)?
            };
            print_with_next_step(
                &json!({ "id": mission.id, "status": mission.status }),
                &format!("PROCEED. Mission status is '{target}'."),
            )
        }
    }
}
