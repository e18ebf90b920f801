use super::Project;
use crate::output::print_json;
use anyhow::Context as _;
use mission_core::{check::CheckService, types::Context};
use std::path::Path;

/// Exits 0 whenever the check itself ran; STOP is reported in `next_step`.
pub fn run(root: &Path, context: &str) -> anyhow::Result<()> {
    let context: Context = context.parse()?;
    let project = Project::new(root);
    let status = CheckService::new(&project.fs, &project.mission_dir)
        .check(context)
        .context("check failed")?;
    print_json(&status)
}
