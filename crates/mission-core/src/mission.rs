//! The mission document: YAML frontmatter plus a markdown body with a
//! handful of known `## ` sections.
//!
//! Two grammars are accepted on read. New documents open with a `---`
//! fenced YAML block; archived documents may instead start with
//! `# MISSION` followed by `key: value` lines. Writes always use the
//! fenced form (see [`crate::writer`]).

use crate::error::{MissionError, Result};
use crate::fs::Fs;
use crate::types::{MissionStatus, MissionType};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

pub const SECTION_INTENT: &str = "INTENT";
pub const SECTION_SCOPE: &str = "SCOPE";
pub const SECTION_PLAN: &str = "PLAN";
pub const SECTION_VERIFICATION: &str = "VERIFICATION";

/// Sections a mission must carry before planning can close.
pub const REQUIRED_SECTIONS: &[&str] = &[
    SECTION_INTENT,
    SECTION_SCOPE,
    SECTION_PLAN,
    SECTION_VERIFICATION,
];

const LEGACY_MARKER: &str = "# MISSION";
const LEGACY_DEFAULT_ID: &str = "legacy-mission";

// ---------------------------------------------------------------------------
// Mission
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mission {
    pub id: String,
    #[serde(rename = "type", default)]
    pub mission_type: MissionType,
    #[serde(default = "default_track")]
    pub track: u8,
    #[serde(default = "default_iteration")]
    pub iteration: u32,
    /// Kept as text so documents with unknown statuses still load; use
    /// [`Mission::status`] for control flow.
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_mission: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domains: Vec<String>,
    #[serde(skip)]
    pub body: String,
}

fn default_track() -> u8 {
    2
}

fn default_iteration() -> u32 {
    1
}

/// One `- [ ]` / `- [x]` line of the PLAN section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanStep {
    /// 1-based position among the checkbox lines.
    pub number: usize,
    pub done: bool,
    pub text: String,
}

impl Mission {
    pub fn new(id: impl Into<String>, status: MissionStatus) -> Self {
        Self {
            id: id.into(),
            mission_type: MissionType::default(),
            track: default_track(),
            iteration: default_iteration(),
            status: status.to_string(),
            parent_mission: None,
            domains: Vec::new(),
            body: String::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Reading
    // -----------------------------------------------------------------------

    pub fn read(fs: &dyn Fs, path: &Path) -> Result<Self> {
        if !fs.exists(path) {
            return Err(MissionError::MissionNotFound(path.display().to_string()));
        }
        let content = fs.read_to_string(path)?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Parse a document. `source` only labels error messages.
    pub fn parse(content: &str, source: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Err(MissionError::EmptyFile(source.to_string()));
        }
        if has_frontmatter_fence(content) {
            let (mut mission, body): (Mission, &str) = parse_frontmatter(content, source)?;
            mission.check_ranges(source)?;
            mission.body = body.trim_start().to_string();
            return Ok(mission);
        }
        if content.starts_with(LEGACY_MARKER) {
            return parse_legacy(content);
        }
        Err(MissionError::MissingFrontmatter(source.to_string()))
    }

    /// Same bounds the legacy grammar enforces: track 1 to 4, iteration 1+.
    fn check_ranges(&self, source: &str) -> Result<()> {
        if !(1..=4).contains(&self.track) {
            return Err(MissionError::Frontmatter(format!(
                "{source}: track {} is outside 1..=4",
                self.track
            )));
        }
        if self.iteration == 0 {
            return Err(MissionError::Frontmatter(format!(
                "{source}: iteration must be at least 1"
            )));
        }
        Ok(())
    }

    /// Serialize as fenced frontmatter followed by the body.
    pub fn to_markdown(&self) -> Result<String> {
        let yaml = serde_yaml::to_string(self)?;
        let body = self.body.trim_start();
        let mut out = format!("---\n{}\n---\n\n{}", yaml.trim_end(), body);
        if !body.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        Ok(out)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn status(&self) -> Result<MissionStatus> {
        MissionStatus::from_str(&self.status)
    }

    /// Trimmed content between `## name` and the next `## ` header.
    /// `None` if the header is absent.
    pub fn section(&self, name: &str) -> Option<String> {
        let lines: Vec<&str> = self.body.lines().collect();
        let (start, end) = section_bounds(&lines, name)?;
        Some(lines[start + 1..end].join("\n").trim().to_string())
    }

    pub fn has_section(&self, name: &str) -> bool {
        let lines: Vec<&str> = self.body.lines().collect();
        section_bounds(&lines, name).is_some()
    }

    pub fn intent(&self) -> Option<String> {
        self.section(SECTION_INTENT).filter(|s| !s.is_empty())
    }

    pub fn verification(&self) -> Option<String> {
        self.section(SECTION_VERIFICATION).filter(|s| !s.is_empty())
    }

    /// Project-relative paths listed under `## SCOPE`, in order, duplicates kept.
    pub fn scope(&self) -> Vec<String> {
        self.section(SECTION_SCOPE)
            .map(|content| parse_list(&content))
            .unwrap_or_default()
    }

    pub fn plan_steps(&self) -> Vec<PlanStep> {
        let Some(content) = self.section(SECTION_PLAN) else {
            return Vec::new();
        };
        content
            .lines()
            .map(str::trim)
            .filter(|l| l.starts_with("- ["))
            .enumerate()
            .map(|(i, line)| {
                let done = line.starts_with("- [x]") || line.starts_with("- [X]");
                let text = line
                    .split_once(']')
                    .map(|(_, rest)| rest.trim())
                    .unwrap_or_default()
                    .to_string();
                PlanStep {
                    number: i + 1,
                    done,
                    text,
                }
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Field shortcuts
// ---------------------------------------------------------------------------

pub fn get_mission_id(fs: &dyn Fs, path: &Path) -> Result<String> {
    Ok(Mission::read(fs, path)?.id)
}

pub fn get_mission_status(fs: &dyn Fs, path: &Path) -> Result<String> {
    Ok(Mission::read(fs, path)?.status)
}

pub fn read_intent(fs: &dyn Fs, path: &Path) -> Result<String> {
    Mission::read(fs, path)?
        .intent()
        .ok_or_else(|| MissionError::MissingSection(SECTION_INTENT.to_string()))
}

pub fn read_scope(fs: &dyn Fs, path: &Path) -> Result<Vec<String>> {
    let scope = Mission::read(fs, path)?.scope();
    if scope.is_empty() {
        return Err(MissionError::MissingSection(SECTION_SCOPE.to_string()));
    }
    Ok(scope)
}

// ---------------------------------------------------------------------------
// Section scanning
// ---------------------------------------------------------------------------

/// The name of a level-2 header line, if `line` is one.
pub(crate) fn header_name(line: &str) -> Option<&str> {
    line.strip_prefix("## ").map(str::trim)
}

/// `(header_index, end_index)` of a section; `end_index` is the next
/// header or `lines.len()`. Header names compare case-insensitively.
pub(crate) fn section_bounds(lines: &[&str], name: &str) -> Option<(usize, usize)> {
    let start = lines
        .iter()
        .position(|l| header_name(l).is_some_and(|h| h.eq_ignore_ascii_case(name)))?;
    let end = lines[start + 1..]
        .iter()
        .position(|l| header_name(l).is_some())
        .map(|offset| start + 1 + offset)
        .unwrap_or(lines.len());
    Some((start, end))
}

/// List lines with `-` / `*` markers and whitespace stripped, blanks skipped.
pub(crate) fn parse_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| {
            let line = line.trim();
            line.strip_prefix('-')
                .or_else(|| line.strip_prefix('*'))
                .unwrap_or(line)
                .trim()
                .to_string()
        })
        .filter(|line| !line.is_empty())
        .collect()
}

// ---------------------------------------------------------------------------
// Frontmatter parsing
// ---------------------------------------------------------------------------

fn has_frontmatter_fence(content: &str) -> bool {
    content.starts_with("---\n") || content.starts_with("---\r\n")
}

/// Split a fenced document into its typed frontmatter and the raw body.
///
/// The closing fence is the first later line that is `---` once
/// surrounding whitespace is trimmed.
pub fn parse_frontmatter<'a, T: DeserializeOwned>(
    content: &'a str,
    source: &str,
) -> Result<(T, &'a str)> {
    let rest = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))
        .ok_or_else(|| MissionError::MissingFrontmatter(source.to_string()))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim() == "---" {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            let value: T = serde_yaml::from_str(yaml)
                .map_err(|e| MissionError::Frontmatter(format!("{source}: {e}")))?;
            return Ok((value, body));
        }
        offset += line.len();
    }
    Err(MissionError::UnterminatedFrontmatter(source.to_string()))
}

fn parse_legacy(content: &str) -> Result<Mission> {
    let mut mission = Mission::new(LEGACY_DEFAULT_ID, MissionStatus::Planning);
    mission.status = String::new();

    let mut body_start = content.len();
    let mut offset = 0;
    for (i, line) in content.split_inclusive('\n').enumerate() {
        if header_name(line).is_some() {
            body_start = offset;
            break;
        }
        offset += line.len();
        if i == 0 {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key
            .trim()
            .trim_matches(|c: char| c == '*' || c == '-' || c.is_whitespace())
            .to_ascii_lowercase();
        let value = value.trim().trim_matches('*').trim();
        if value.is_empty() {
            continue;
        }
        let bad = |reason: &str| MissionError::LegacyMetadata {
            key: key.clone(),
            reason: reason.to_string(),
        };
        match key.as_str() {
            "id" => mission.id = value.to_string(),
            "type" => {
                mission.mission_type =
                    MissionType::from_str(value).map_err(|_| bad("expected WET or DRY"))?
            }
            "track" => {
                mission.track = value
                    .parse::<u8>()
                    .ok()
                    .filter(|t| (1..=4).contains(t))
                    .ok_or_else(|| bad("expected an integer from 1 to 4"))?
            }
            "iteration" => {
                mission.iteration = value
                    .parse::<u32>()
                    .ok()
                    .filter(|n| *n >= 1)
                    .ok_or_else(|| bad("expected a positive integer"))?
            }
            "status" => mission.status = value.to_ascii_lowercase(),
            "parent_mission" | "parent" => mission.parent_mission = Some(value.to_string()),
            "domains" => {
                mission.domains = value
                    .split(',')
                    .map(str::trim)
                    .filter(|d| !d.is_empty())
                    .map(str::to_string)
                    .collect()
            }
            _ => {}
        }
    }

    mission.body = content[body_start..].trim_start().to_string();
    Ok(mission)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemFs;

    const SAMPLE: &str = "---
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

    #[test]
    fn parses_frontmatter_and_sections() {
        let m = Mission::parse(SAMPLE, "mission.md").unwrap();
        assert_eq!(m.id, "20261118143005-0421");
        assert_eq!(m.mission_type, MissionType::Wet);
        assert_eq!(m.track, 2);
        assert_eq!(m.iteration, 1);
        assert_eq!(m.status().unwrap(), MissionStatus::Planning);
        assert_eq!(m.intent().as_deref(), Some("Add X"));
        assert_eq!(m.scope(), vec!["a.go".to_string()]);
        assert_eq!(m.verification().as_deref(), Some("run tests"));
        assert_eq!(
            m.plan_steps(),
            vec![PlanStep {
                number: 1,
                done: false,
                text: "Do a".to_string()
            }]
        );
    }

    #[test]
    fn write_then_read_is_identity() {
        let mut m = Mission::parse(SAMPLE, "mission.md").unwrap();
        m.parent_mission = Some("20250101000000-0001".to_string());
        m.domains = vec!["api".to_string(), "db".to_string()];
        let text = m.to_markdown().unwrap();
        assert!(text.starts_with("---\n"));
        assert!(text.contains("\n---\n\n## INTENT"));
        let back = Mission::parse(&text, "mission.md").unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn closing_fence_tolerates_whitespace() {
        let doc = "---\nid: a\nstatus: active\n  ---  \n\n\n## INTENT\nhi\n";
        let m = Mission::parse(doc, "m").unwrap();
        assert_eq!(m.id, "a");
        assert!(m.body.starts_with("## INTENT"));
    }

    #[test]
    fn unknown_status_loads_but_fails_control_flow() {
        let doc = "---\nid: a\nstatus: archived\n---\n";
        let m = Mission::parse(doc, "m").unwrap();
        assert_eq!(m.status, "archived");
        assert!(matches!(m.status(), Err(MissionError::InvalidStatus(_))));
    }

    #[test]
    fn empty_and_unfenced_files_are_rejected() {
        assert!(matches!(
            Mission::parse("", "m"),
            Err(MissionError::EmptyFile(_))
        ));
        assert!(matches!(
            Mission::parse("## INTENT\nx\n", "m"),
            Err(MissionError::MissingFrontmatter(_))
        ));
        assert!(matches!(
            Mission::parse("---\nid: a\n## INTENT\n", "m"),
            Err(MissionError::UnterminatedFrontmatter(_))
        ));
        assert!(matches!(
            Mission::parse("---\nid: [unclosed\n---\n", "m"),
            Err(MissionError::Frontmatter(_))
        ));
    }

    #[test]
    fn frontmatter_track_and_iteration_are_bounded() {
        for doc in [
            "---\nid: a\ntrack: 9\nstatus: active\n---\n",
            "---\nid: a\ntrack: 0\nstatus: active\n---\n",
            "---\nid: a\niteration: 0\nstatus: active\n---\n",
        ] {
            assert!(
                matches!(Mission::parse(doc, "m"), Err(MissionError::Frontmatter(_))),
                "{doc}"
            );
        }
        let m = Mission::parse("---\nid: a\ntrack: 4\niteration: 3\n---\n", "m").unwrap();
        assert_eq!((m.track, m.iteration), (4, 3));
    }

    #[test]
    fn scope_strips_markers_and_blank_lines() {
        let doc = "---\nid: a\nstatus: active\n---\n## scope\n- src/a.rs\n\n  * src/b.rs  \nsrc/c.rs\n- src/a.rs\n## PLAN\n";
        let m = Mission::parse(doc, "m").unwrap();
        assert_eq!(
            m.scope(),
            vec!["src/a.rs", "src/b.rs", "src/c.rs", "src/a.rs"]
        );
    }

    #[test]
    fn level_three_headers_stay_inside_section() {
        let doc = "---\nid: a\nstatus: active\n---\n## PLAN\n### Phase 1\n- [x] one\n- [ ] two\n## VERIFICATION\ncargo test\n";
        let m = Mission::parse(doc, "m").unwrap();
        let steps = m.plan_steps();
        assert_eq!(steps.len(), 2);
        assert!(steps[0].done);
        assert_eq!(steps[1].text, "two");
    }

    #[test]
    fn legacy_format_is_readable() {
        let doc = "# MISSION: refactor\n\n**Type:** DRY\ntrack: 3\nstatus: Completed\nowner: someone\n\n## INTENT\nClean up\n## SCOPE\n- lib.rs\n";
        let m = Mission::parse(doc, "archive").unwrap();
        assert_eq!(m.id, "legacy-mission");
        assert_eq!(m.mission_type, MissionType::Dry);
        assert_eq!(m.track, 3);
        assert_eq!(m.status().unwrap(), MissionStatus::Completed);
        assert_eq!(m.intent().as_deref(), Some("Clean up"));
        assert_eq!(m.scope(), vec!["lib.rs"]);
    }

    #[test]
    fn legacy_format_with_id_and_bad_track() {
        let doc = "# MISSION\nid: 20240101000000-0001\n## INTENT\nx\n";
        assert_eq!(
            Mission::parse(doc, "m").unwrap().id,
            "20240101000000-0001"
        );

        let doc = "# MISSION\ntrack: seven\n## INTENT\nx\n";
        assert!(matches!(
            Mission::parse(doc, "m"),
            Err(MissionError::LegacyMetadata { .. })
        ));
    }

    #[test]
    fn accessors_read_through_fs() {
        let fs = MemFs::new();
        let path = Path::new("/p/.mission/mission.md");
        assert!(matches!(
            Mission::read(&fs, path),
            Err(MissionError::MissionNotFound(_))
        ));

        fs.write(path, SAMPLE.as_bytes()).unwrap();
        assert_eq!(get_mission_id(&fs, path).unwrap(), "20261118143005-0421");
        assert_eq!(get_mission_status(&fs, path).unwrap(), "planning");
        assert_eq!(read_intent(&fs, path).unwrap(), "Add X");
        assert_eq!(read_scope(&fs, path).unwrap(), vec!["a.go"]);

        fs.write(path, b"---\nid: a\nstatus: planning\n---\n## INTENT\n\n## SCOPE\n")
            .unwrap();
        assert!(matches!(
            read_intent(&fs, path),
            Err(MissionError::MissingSection(_))
        ));
        assert!(matches!(
            read_scope(&fs, path),
            Err(MissionError::MissingSection(_))
        ));
    }
}
