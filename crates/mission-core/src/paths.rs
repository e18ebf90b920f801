use crate::error::{MissionError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const MISSION_DIR: &str = ".mission";

pub const MISSION_FILE: &str = "mission.md";
pub const ID_FILE: &str = "id";
pub const PLAN_FILE: &str = "plan.json";
pub const EXECUTION_LOG: &str = "execution.log";
pub const CONFIG_FILE: &str = "config.yaml";
pub const DIAGNOSIS_FILE: &str = "diagnosis.md";

pub const COMPLETED_DIR: &str = "completed";
pub const PAUSED_DIR: &str = "paused";
pub const TEMPLATES_DIR: &str = "templates";

/// Sidecars that are transient per mission and should stay out of version control.
pub const GITIGNORE_ENTRIES: &[&str] = &[
    ".mission/mission.md",
    ".mission/id",
    ".mission/plan.json",
    ".mission/execution.log",
    ".mission/paused/",
];

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn mission_dir(root: &Path) -> PathBuf {
    root.join(MISSION_DIR)
}

pub fn mission_file(dir: &Path) -> PathBuf {
    dir.join(MISSION_FILE)
}

pub fn id_file(dir: &Path) -> PathBuf {
    dir.join(ID_FILE)
}

pub fn plan_file(dir: &Path) -> PathBuf {
    dir.join(PLAN_FILE)
}

pub fn execution_log(dir: &Path) -> PathBuf {
    dir.join(EXECUTION_LOG)
}

pub fn config_file(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE)
}

pub fn diagnosis_file(dir: &Path) -> PathBuf {
    dir.join(DIAGNOSIS_FILE)
}

pub fn completed_dir(dir: &Path) -> PathBuf {
    dir.join(COMPLETED_DIR)
}

pub fn paused_dir(dir: &Path) -> PathBuf {
    dir.join(PAUSED_DIR)
}

pub fn templates_dir(dir: &Path) -> PathBuf {
    dir.join(TEMPLATES_DIR)
}

pub fn completed_mission(dir: &Path, id: &str) -> PathBuf {
    completed_dir(dir).join(format!("{id}-mission.md"))
}

pub fn completed_log(dir: &Path, id: &str) -> PathBuf {
    completed_dir(dir).join(format!("{id}-execution.log"))
}

pub fn completed_commit_msg(dir: &Path, id: &str) -> PathBuf {
    completed_dir(dir).join(format!("{id}-commit.msg"))
}

pub fn paused_mission(dir: &Path, timestamp: &str, id: &str) -> PathBuf {
    paused_dir(dir).join(format!("{timestamp}-{id}-mission.md"))
}

pub fn paused_log(dir: &Path, timestamp: &str, id: &str) -> PathBuf {
    paused_dir(dir).join(format!("{timestamp}-{id}-execution.log"))
}

// ---------------------------------------------------------------------------
// Mission ID validation
// ---------------------------------------------------------------------------

static ID_RE: OnceLock<Regex> = OnceLock::new();

fn id_re() -> &'static Regex {
    ID_RE.get_or_init(|| Regex::new(r"^\d{14}-\d{4}$").unwrap())
}

pub fn is_valid_id(id: &str) -> bool {
    id_re().is_match(id)
}

pub fn validate_id(id: &str) -> Result<()> {
    if !is_valid_id(id) {
        return Err(MissionError::InvalidId(id.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
