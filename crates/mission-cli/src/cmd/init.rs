use super::Project;
use crate::output::print_with_next_step;
use anyhow::Context;
use mission_core::{config::Config, fs::Fs, io, paths};
use serde_json::json;
use std::path::Path;

pub fn run(root: &Path) -> anyhow::Result<()> {
    let project = Project::new(root);

    project
        .fs
        .create_dir_all(&project.mission_dir)
        .with_context(|| format!("failed to create {}", project.mission_dir.display()))?;

    let config_path = paths::config_file(&project.mission_dir);
    let created_config = !config_path.exists();
    if created_config {
        Config::default()
            .save(&project.fs, &project.mission_dir)
            .context("failed to write config.yaml")?;
    }

    let gitignore_added = io::ensure_gitignore_entries(root, paths::GITIGNORE_ENTRIES)
        .context("failed to update .gitignore")?;

    print_with_next_step(
        &json!({
            "root": root.display().to_string(),
            "created_config": created_config,
            "gitignore_added": gitignore_added,
        }),
        "PROCEED. Run 'mission check --context plan' before planning a mission.",
    )
}
