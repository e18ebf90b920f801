use super::Project;
use crate::output::print_with_next_step;
use anyhow::Context;
use mission_core::pause::Pauser;
use std::path::Path;

pub fn pause(root: &Path) -> anyhow::Result<()> {
    let project = Project::new(root);
    let report = Pauser::new(&project.fs, &project.mission_dir)
        .pause()
        .context("failed to pause mission")?;
    print_with_next_step(
        &report,
        "PROCEED. Mission paused. Run 'mission restore' to resume it.",
    )
}

pub fn restore(root: &Path, id: Option<&str>) -> anyhow::Result<()> {
    let project = Project::new(root);
    let report = Pauser::new(&project.fs, &project.mission_dir)
        .restore(id.unwrap_or_default())
        .context("failed to restore paused mission")?;
    print_with_next_step(
        &report,
        "PROCEED. Mission restored. Run 'mission check' to see where it left off.",
    )
}
