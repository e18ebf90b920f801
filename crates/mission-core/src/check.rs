use crate::error::{MissionError, Result};
use crate::fs::Fs;
use crate::id::IdService;
use crate::lifecycle::{decide, Decision};
use crate::mission::{parse_frontmatter, Mission};
use crate::paths;
use crate::types::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Result of the check gate, serialized as-is by the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckStatus {
    pub has_active_mission: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mission_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mission_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mission_intent: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stale_artifacts_cleaned: Vec<String>,
    pub ready: bool,
    pub message: String,
    pub next_step: String,
}

pub struct CheckService<'a> {
    fs: &'a dyn Fs,
    mission_dir: PathBuf,
}

impl<'a> CheckService<'a> {
    pub fn new(fs: &'a dyn Fs, mission_dir: &Path) -> Self {
        Self {
            fs,
            mission_dir: mission_dir.to_path_buf(),
        }
    }

    /// Run the gate for `context`. Any underlying failure comes back wrapped
    /// in [`MissionError::Check`].
    pub fn check(&self, context: Context) -> Result<CheckStatus> {
        self.run(context)
            .map_err(|e| MissionError::Check(Box::new(e)))
    }

    fn run(&self, context: Context) -> Result<CheckStatus> {
        let mission_path = paths::mission_file(&self.mission_dir);
        if !self.fs.exists(&mission_path) {
            return self.no_mission(context);
        }

        let mission = Mission::read(self.fs, &mission_path)?;
        let mut status = CheckStatus {
            has_active_mission: true,
            mission_status: Some(mission.status.clone()),
            mission_id: Some(mission.id.clone()),
            mission_intent: mission.intent(),
            stale_artifacts_cleaned: Vec::new(),
            ready: false,
            message: String::new(),
            next_step: String::new(),
        };

        let parsed = match mission.status() {
            Ok(s) => s,
            Err(_) => {
                status.message = format!("Mission has unknown status '{}'", mission.status);
                status.next_step = format!(
                    "STOP. Mission status '{}' is not recognized. Fix the frontmatter of {}.",
                    mission.status,
                    mission_path.display()
                );
                return Ok(status);
            }
        };

        let decision = decide(context, Some(parsed));
        status.ready = decision.is_proceed();
        status.message = format!("Mission {} is {parsed}", mission.id);
        status.next_step = decision.next_step();

        if context == Context::Debug && decision.is_proceed() {
            self.check_diagnosis(&mut status)?;
        }
        Ok(status)
    }

    fn no_mission(&self, context: Context) -> Result<CheckStatus> {
        let mut cleaned = Vec::new();
        if context == Context::Plan {
            for path in [
                paths::id_file(&self.mission_dir),
                paths::plan_file(&self.mission_dir),
                paths::execution_log(&self.mission_dir),
            ] {
                if self.fs.exists(&path) {
                    self.fs.remove_file(&path)?;
                    cleaned.push(path.display().to_string());
                }
            }
            if !cleaned.is_empty() {
                tracing::info!(count = cleaned.len(), "removed stale mission artifacts");
            }
        }

        let id = IdService::new(self.fs, &self.mission_dir).get_or_create_id()?;
        let decision = decide(context, None);
        Ok(CheckStatus {
            has_active_mission: false,
            mission_status: None,
            mission_id: Some(id),
            mission_intent: None,
            stale_artifacts_cleaned: cleaned,
            ready: true,
            message: "No active mission".to_string(),
            next_step: decision.next_step(),
        })
    }

    fn check_diagnosis(&self, status: &mut CheckStatus) -> Result<()> {
        let path = paths::diagnosis_file(&self.mission_dir);
        if !self.fs.exists(&path) {
            status.next_step = format!(
                "PROCEED. Create {} with YAML frontmatter describing the failure, then continue debugging.",
                path.display()
            );
            return Ok(());
        }

        let content = self.fs.read_to_string(&path)?;
        let source = path.display().to_string();
        match parse_frontmatter::<serde_yaml::Mapping>(&content, &source) {
            Ok(_) => {
                status.next_step =
                    "PROCEED. diagnosis.md is valid. Apply the fix it describes.".to_string();
            }
            Err(e) => {
                status.ready = false;
                status.next_step = format!("STOP. diagnosis.md is invalid: {e}");
            }
        }
        Ok(())
    }
}

/// Transition-table decision for an already loaded mission.
pub fn decision_for(context: Context, mission: Option<&Mission>) -> Result<Decision> {
    let status = mission.map(Mission::status).transpose()?;
    Ok(decide(context, status))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
