use super::Project;
use crate::output::print_with_next_step;
use mission_core::MissionError;
use serde_json::json;
use std::path::Path;

pub fn run(root: &Path) -> anyhow::Result<()> {
    let project = Project::new(root);
    let ids = project.ids();
    let id = match ids.get_current_id() {
        Ok(id) => id,
        Err(MissionError::IdNotFound) => ids.get_or_create_id()?,
        Err(e) => return Err(e.into()),
    };
    print_with_next_step(
        &json!({ "id": id }),
        "PROCEED. Use this id for the mission's checkpoints and archive.",
    )
}
