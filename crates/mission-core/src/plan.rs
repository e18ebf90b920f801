use crate::error::{MissionError, Result};
use crate::fs::Fs;
use crate::mission::{Mission, SECTION_INTENT, SECTION_PLAN, SECTION_SCOPE, SECTION_VERIFICATION};
use crate::paths;
use crate::types::{FileAction, MissionType};
use crate::writer::{parse_track, replace_section, MissionWriter};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedFile {
    pub path: String,
    pub action: FileAction,
}

/// Structured planning output held in `plan.json` until finalize.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanSpec {
    pub intent: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub mission_type: Option<MissionType>,
    /// Legacy flat scope list; `files` supersedes it.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scope: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<PlannedFile>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domain: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track: Option<String>,
    #[serde(default)]
    pub plan: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clarification_questions: Option<Vec<String>>,
}

impl PlanSpec {
    pub fn load(fs: &dyn Fs, mission_dir: &Path) -> Result<Self> {
        let path = paths::plan_file(mission_dir);
        if !fs.exists(&path) {
            return Err(MissionError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            )));
        }
        let data = fs.read_to_string(&path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn save(&self, fs: &dyn Fs, mission_dir: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        fs.write(&paths::plan_file(mission_dir), data.as_bytes())
    }

    /// `files[].path` followed by legacy `scope[]`, first appearance wins.
    pub fn scope_files(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.files
            .iter()
            .map(|f| f.path.as_str())
            .chain(self.scope.iter().map(String::as_str))
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .filter(|p| seen.insert(p.to_string()))
            .map(str::to_string)
            .collect()
    }

    /// Problems that would keep this plan from producing a finalizable mission.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.intent.trim().is_empty() {
            problems.push("intent is empty".to_string());
        }
        if self.scope_files().is_empty() {
            problems.push("no files in scope".to_string());
        }
        if self.plan.iter().all(|s| s.trim().is_empty()) {
            problems.push("plan has no steps".to_string());
        }
        if self
            .verification
            .as_deref()
            .map_or(true, |v| v.trim().is_empty())
        {
            problems.push("verification is empty".to_string());
        }
        if let Some(track) = &self.track {
            if parse_track(track).is_err() {
                problems.push(format!("track '{track}' is not 1-4"));
            }
        }
        if let Some(questions) = &self.clarification_questions {
            if !questions.is_empty() {
                problems.push(format!(
                    "{} clarification question(s) still open",
                    questions.len()
                ));
            }
        }
        problems
    }

    /// Write this plan into the live mission: the four sections plus the
    /// `type`, `track` and `domains` frontmatter.
    pub fn apply_to_mission(&self, writer: &MissionWriter<'_>) -> Result<Mission> {
        let mut mission = writer.read()?;

        if let Some(t) = self.mission_type {
            mission.mission_type = t;
        }
        if let Some(track) = &self.track {
            mission.track = parse_track(track)?;
        }
        for domain in self.domain.iter().map(|d| d.trim()).filter(|d| !d.is_empty()) {
            if !mission.domains.iter().any(|d| d == domain) {
                mission.domains.push(domain.to_string());
            }
        }

        let mut body = mission.body.clone();
        if !self.intent.trim().is_empty() {
            body = replace_section(&body, SECTION_INTENT, &self.intent);
        }
        body = replace_section(&body, SECTION_SCOPE, &self.scope_files().join("\n"));
        let steps: Vec<String> = self
            .plan
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| format!("- [ ] {s}"))
            .collect();
        body = replace_section(&body, SECTION_PLAN, &steps.join("\n"));
        body = replace_section(
            &body,
            SECTION_VERIFICATION,
            self.verification.as_deref().unwrap_or_default(),
        );
        mission.body = body;

        writer.write(&mission)?;
        tracing::info!(id = %mission.id, "applied plan.json to mission");
        Ok(mission)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
