//! Read-modify-write edits of the live mission document.
//!
//! Every operation loads the whole document, rebuilds it and writes it
//! back in one call, so content outside the targeted field or section is
//! preserved and a crash never leaves a half-edited file behind.

use crate::error::{MissionError, Result};
use crate::exec_log::ExecutionLog;
use crate::fs::Fs;
use crate::mission::{section_bounds, Mission, PlanStep, SECTION_INTENT, SECTION_PLAN};
use crate::paths;
use crate::types::{LogLevel, MissionStatus, MissionType};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub struct MissionWriter<'a> {
    fs: &'a dyn Fs,
    mission_dir: PathBuf,
    path: PathBuf,
}

impl<'a> MissionWriter<'a> {
    pub fn new(fs: &'a dyn Fs, mission_dir: &Path) -> Self {
        Self {
            fs,
            mission_dir: mission_dir.to_path_buf(),
            path: paths::mission_file(mission_dir),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> Result<Mission> {
        Mission::read(self.fs, &self.path)
    }

    pub fn write(&self, mission: &Mission) -> Result<()> {
        let text = mission.to_markdown()?;
        self.fs.write(&self.path, text.as_bytes())
    }

    /// Initial document for a fresh mission: status `planning`, INTENT only.
    pub fn create_with_intent(&self, id: &str, intent: &str) -> Result<Mission> {
        paths::validate_id(id)?;
        let mut mission = Mission::new(id, MissionStatus::Planning);
        mission.body = format!("## {SECTION_INTENT}\n{}\n", intent.trim());
        self.write(&mission)?;
        tracing::info!(id, "created mission document");
        Ok(mission)
    }

    /// Rewrite the status field without consulting the transition table.
    pub fn update_status(&self, status: MissionStatus) -> Result<Mission> {
        let mut mission = self.read()?;
        mission.status = status.to_string();
        self.write(&mission)?;
        tracing::info!(id = %mission.id, %status, "updated mission status");
        Ok(mission)
    }

    pub fn update_section(&self, name: &str, content: &str) -> Result<()> {
        let mut mission = self.read()?;
        mission.body = replace_section(&mission.body, name, content);
        self.write(&mission)
    }

    /// Write `items` as the section's lines. PLAN items become unchecked
    /// checkboxes; other sections take items verbatim. With `append`, the
    /// section's existing non-blank lines come first.
    pub fn update_list(&self, name: &str, items: &[String], append: bool) -> Result<()> {
        let mut mission = self.read()?;
        let is_plan = name.eq_ignore_ascii_case(SECTION_PLAN);

        let mut lines: Vec<String> = Vec::new();
        if append {
            if let Some(existing) = mission.section(name) {
                lines.extend(
                    existing
                        .lines()
                        .filter(|l| !l.trim().is_empty())
                        .map(str::to_string),
                );
            }
        }
        for item in items.iter().map(|i| i.trim()).filter(|i| !i.is_empty()) {
            if is_plan {
                lines.push(format!("- [ ] {}", strip_list_marker(item)));
            } else {
                lines.push(item.to_string());
            }
        }

        mission.body = replace_section(&mission.body, name, &lines.join("\n"));
        self.write(&mission)
    }

    /// Tick the `step`-th (1-based) checkbox line of PLAN. A non-empty
    /// `message` is also recorded in the execution log at `level`.
    pub fn mark_plan_step_complete(
        &self,
        step: usize,
        level: Option<LogLevel>,
        message: &str,
    ) -> Result<PlanStep> {
        let mut mission = self.read()?;
        let mut lines: Vec<String> = mission.body.lines().map(str::to_string).collect();

        let borrowed: Vec<&str> = lines.iter().map(String::as_str).collect();
        let (start, end) = section_bounds(&borrowed, SECTION_PLAN)
            .ok_or_else(|| MissionError::MissingSection(SECTION_PLAN.to_string()))?;
        let step_lines: Vec<usize> = (start + 1..end)
            .filter(|&i| lines[i].trim_start().starts_with("- ["))
            .collect();

        if step == 0 || step > step_lines.len() {
            return Err(MissionError::StepOutOfRange {
                step,
                count: step_lines.len(),
            });
        }

        let idx = step_lines[step - 1];
        lines[idx] = lines[idx].replacen("- [ ]", "- [x]", 1);
        mission.body = lines.join("\n");
        mission.body.push('\n');
        self.write(&mission)?;

        if !message.trim().is_empty() {
            ExecutionLog::new(self.fs, &self.mission_dir)
                .append(level.unwrap_or_default(), message)?;
        }

        let marked = mission
            .plan_steps()
            .into_iter()
            .nth(step - 1)
            .ok_or(MissionError::StepOutOfRange {
                step,
                count: step_lines.len(),
            })?;
        Ok(marked)
    }

    /// Apply `key=value` pairs to typed frontmatter fields. `domains` values
    /// are appended in order, repeats included. Unknown keys are skipped;
    /// all pairs are validated before anything is written.
    /// Returns the keys that were applied.
    pub fn update_frontmatter(&self, pairs: &[String]) -> Result<Vec<String>> {
        let mut mission = self.read()?;
        let mut applied = Vec::new();

        for pair in pairs {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| MissionError::InvalidPair(pair.clone()))?;
            let key = key.trim();
            let value = value.trim();
            match key {
                "track" => mission.track = parse_track(value)?,
                "type" => mission.mission_type = MissionType::from_str(value)?,
                "domains" | "domain" => {
                    mission.domains.extend(
                        value
                            .split(',')
                            .map(str::trim)
                            .filter(|d| !d.is_empty())
                            .map(str::to_string),
                    );
                }
                "iteration" => {
                    mission.iteration = value
                        .parse::<u32>()
                        .ok()
                        .filter(|n| *n >= 1)
                        .ok_or_else(|| MissionError::InvalidPair(pair.clone()))?
                }
                "parent_mission" => {
                    mission.parent_mission = (!value.is_empty()).then(|| value.to_string())
                }
                other => {
                    tracing::debug!(key = other, "ignoring unknown frontmatter key");
                    continue;
                }
            }
            applied.push(key.to_string());
        }

        self.write(&mission)?;
        Ok(applied)
    }
}

pub(crate) fn parse_track(value: &str) -> Result<u8> {
    value
        .trim()
        .parse::<u8>()
        .ok()
        .filter(|t| (1..=4).contains(t))
        .ok_or_else(|| MissionError::InvalidTrack(value.to_string()))
}

fn strip_list_marker(item: &str) -> &str {
    for prefix in ["- [ ]", "- [x]", "- [X]", "-", "*"] {
        if let Some(rest) = item.strip_prefix(prefix) {
            return rest.trim();
        }
    }
    item
}

/// Replace the body of section `name` with `content`, or append the
/// section when absent. Exactly one blank line separates the section from
/// its neighbours afterwards.
pub(crate) fn replace_section(body: &str, name: &str, content: &str) -> String {
    let lines: Vec<&str> = body.lines().collect();
    let content = content.trim();
    let mut out = String::new();

    match section_bounds(&lines, name) {
        Some((start, end)) => {
            let before = lines[..start].join("\n");
            let before = before.trim_end();
            if !before.is_empty() {
                out.push_str(before);
                out.push_str("\n\n");
            }
            out.push_str(lines[start].trim_end());
            out.push('\n');
            if !content.is_empty() {
                out.push_str(content);
                out.push('\n');
            }
            let after = lines[end..].join("\n");
            let after = after.trim_start();
            if !after.is_empty() {
                out.push('\n');
                out.push_str(after);
                out.push('\n');
            }
        }
        None => {
            let existing = body.trim_end();
            if !existing.is_empty() {
                out.push_str(existing);
                out.push_str("\n\n");
            }
            out.push_str("## ");
            out.push_str(&name.to_ascii_uppercase());
            out.push('\n');
            if !content.is_empty() {
                out.push_str(content);
                out.push('\n');
            }
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
