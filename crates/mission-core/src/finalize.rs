use crate::error::{MissionError, Result};
use crate::fs::Fs;
use crate::mission::REQUIRED_SECTIONS;
use crate::paths;
use crate::types::MissionStatus;
use crate::writer::MissionWriter;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalizeReport {
    pub valid: bool,
    pub missing_sections: Vec<String>,
    pub empty_sections: Vec<String>,
    pub message: String,
}

/// Closes the planning phase once every required section has content.
pub struct Finalizer<'a> {
    fs: &'a dyn Fs,
    mission_dir: PathBuf,
}

impl<'a> Finalizer<'a> {
    pub fn new(fs: &'a dyn Fs, mission_dir: &Path) -> Self {
        Self {
            fs,
            mission_dir: mission_dir.to_path_buf(),
        }
    }

    /// Validate the document. When valid, drop planning scaffolding
    /// (`templates/`, `plan.json`) and move the status to `planned`.
    /// An invalid document is reported, not raised, and left untouched.
    pub fn finalize(&self) -> Result<FinalizeReport> {
        let writer = MissionWriter::new(self.fs, &self.mission_dir);
        let mission = writer.read()?;

        let mut missing_sections = Vec::new();
        let mut empty_sections = Vec::new();
        for name in REQUIRED_SECTIONS {
            match mission.section(name) {
                None => missing_sections.push(name.to_string()),
                Some(content) if content.is_empty() => empty_sections.push(name.to_string()),
                Some(_) => {}
            }
        }

        if !missing_sections.is_empty() || !empty_sections.is_empty() {
            let mut parts = Vec::new();
            if !missing_sections.is_empty() {
                parts.push(format!("missing: {}", missing_sections.join(", ")));
            }
            if !empty_sections.is_empty() {
                parts.push(format!("empty: {}", empty_sections.join(", ")));
            }
            return Ok(FinalizeReport {
                valid: false,
                missing_sections,
                empty_sections,
                message: format!("Mission is not ready to finalize ({})", parts.join("; ")),
            });
        }

        let current = mission.status()?;
        if !current.can_transition_to(MissionStatus::Planned) {
            return Err(MissionError::InvalidTransition {
                from: current.to_string(),
                to: MissionStatus::Planned.to_string(),
            });
        }

        let templates = paths::templates_dir(&self.mission_dir);
        if self.fs.is_dir(&templates) {
            self.fs.remove_dir_all(&templates)?;
        }
        let plan = paths::plan_file(&self.mission_dir);
        if self.fs.exists(&plan) {
            self.fs.remove_file(&plan)?;
        }
        writer.update_status(MissionStatus::Planned)?;

        Ok(FinalizeReport {
            valid: true,
            missing_sections,
            empty_sections,
            message: format!("Mission {} is planned", mission.id),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemFs;
    use crate::mission::Mission;

    const READY: &str = "---
id: 20261118143005-0421
type: WET
track: 2
iteration: 1
status: planning
---
## INTENT
Add X
## SCOPE
a.go
## PLAN
- [ ] Do a
## VERIFICATION
run tests
";

    fn dir() -> PathBuf {
        PathBuf::from("/p/.mission")
    }

    #[test]
    fn finalize_happy_path() {
        let fs = MemFs::new();
        fs.write(&dir().join("mission.md"), READY.as_bytes()).unwrap();
        fs.write(&dir().join("templates/intent.md"), b"tmpl").unwrap();
        fs.write(&dir().join("plan.json"), b"{}").unwrap();

        let report = Finalizer::new(&fs, &dir()).finalize().unwrap();
        assert!(report.valid, "{}", report.message);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["valid"], true);

        let m = Mission::read(&fs, &dir().join("mission.md")).unwrap();
        assert_eq!(m.status, "planned");
        assert_eq!(m.intent().as_deref(), Some("Add X"));
        assert!(!fs.exists(&dir().join("templates")));
        assert!(!fs.exists(&dir().join("plan.json")));
    }

    #[test]
    fn missing_and_empty_sections_leave_state_untouched() {
        let fs = MemFs::new();
        let doc = "---\nid: 20261118143005-0421\nstatus: planning\n---\n## INTENT\nAdd X\n## SCOPE\n\n## PLAN\n- [ ] a\n";
        fs.write(&dir().join("mission.md"), doc.as_bytes()).unwrap();
        fs.write(&dir().join("plan.json"), b"{}").unwrap();

        let report = Finalizer::new(&fs, &dir()).finalize().unwrap();
        assert!(!report.valid);
        assert_eq!(report.missing_sections, vec!["VERIFICATION"]);
        assert_eq!(report.empty_sections, vec!["SCOPE"]);
        assert_eq!(
            fs.read_to_string(&dir().join("mission.md")).unwrap(),
            doc
        );
        assert!(fs.exists(&dir().join("plan.json")));
    }

    #[test]
    fn finalize_outside_planning_is_rejected() {
        let fs = MemFs::new();
        fs.write(
            &dir().join("mission.md"),
            READY.replace("status: planning", "status: active").as_bytes(),
        )
        .unwrap();
        assert!(matches!(
            Finalizer::new(&fs, &dir()).finalize(),
            Err(MissionError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn finalize_without_mission_fails() {
        let fs = MemFs::new();
        assert!(matches!(
            Finalizer::new(&fs, &dir()).finalize(),
            Err(MissionError::MissionNotFound(_))
        ));
    }
}
