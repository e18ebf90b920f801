use super::Project;
use crate::output::print_with_next_step;
use clap::Subcommand;
use mission_core::config::WarnLevel;
use serde_json::json;
use std::path::Path;

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Print the effective configuration
    Show,

    /// Validate the config for common mistakes
    Validate,
}

pub fn run(root: &Path, subcmd: ConfigSubcommand) -> anyhow::Result<()> {
    let project = Project::new(root);
    let config = project.config()?;

    match subcmd {
        ConfigSubcommand::Show => {
            print_with_next_step(&config, "PROCEED. Configuration loaded.")
        }
        ConfigSubcommand::Validate => {
            let warnings = config.validate();
            let has_errors = warnings.iter().any(|w| w.level == WarnLevel::Error);
            let next_step = if has_errors {
                "STOP. Fix the errors in .mission/config.yaml."
            } else {
                "PROCEED. Configuration is usable."
            };
            print_with_next_step(&json!({ "warnings": warnings }), next_step)?;
            if has_errors {
                anyhow::bail!("config validation found errors");
            }
            Ok(())
        }
    }
}
