use crate::error::{MissionError, Result};
use crate::fs::Fs;
use crate::id::IdService;
use crate::paths;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// `YYYYMMDD-HHMMSS`, the prefix of every paused file name.
const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";
/// Timestamp plus its trailing `-`.
const PREFIX_LEN: usize = 16;
const MISSION_SUFFIX: &str = "-mission.md";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PauseReport {
    pub id: String,
    pub timestamp: String,
    pub files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeReport {
    pub id: String,
    pub paused_at: String,
    pub files: Vec<String>,
}

/// A paused mission document found under `paused/`.
#[derive(Debug, Clone)]
struct PausedEntry {
    timestamp: String,
    id: String,
    at: Option<NaiveDateTime>,
}

impl PausedEntry {
    fn from_file_name(name: &str) -> Option<Self> {
        let stem = name.strip_suffix(MISSION_SUFFIX)?;
        let timestamp = stem.get(..PREFIX_LEN - 1)?;
        let id = stem.get(PREFIX_LEN..)?;
        if id.is_empty() {
            return None;
        }
        Some(Self {
            timestamp: timestamp.to_string(),
            id: id.to_string(),
            at: NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT).ok(),
        })
    }
}

/// Parks the live mission under `paused/` and brings it back later.
pub struct Pauser<'a> {
    fs: &'a dyn Fs,
    mission_dir: PathBuf,
}

impl<'a> Pauser<'a> {
    pub fn new(fs: &'a dyn Fs, mission_dir: &Path) -> Self {
        Self {
            fs,
            mission_dir: mission_dir.to_path_buf(),
        }
    }

    pub fn pause(&self) -> Result<PauseReport> {
        self.pause_at(Utc::now())
    }

    pub fn pause_at(&self, now: DateTime<Utc>) -> Result<PauseReport> {
        let mission_path = paths::mission_file(&self.mission_dir);
        if !self.fs.exists(&mission_path) {
            return Err(MissionError::MissionNotFound(
                mission_path.display().to_string(),
            ));
        }
        let id = IdService::new(self.fs, &self.mission_dir).get_current_id()?;
        self.fs.create_dir_all(&paths::paused_dir(&self.mission_dir))?;
        let timestamp = now.format(TIMESTAMP_FORMAT).to_string();

        let mut files = Vec::new();
        let dest = paths::paused_mission(&self.mission_dir, &timestamp, &id);
        self.fs.copy(&mission_path, &dest)?;
        files.push(dest.display().to_string());

        let log = paths::execution_log(&self.mission_dir);
        let has_log = self.fs.exists(&log);
        if has_log {
            let dest = paths::paused_log(&self.mission_dir, &timestamp, &id);
            self.fs.copy(&log, &dest)?;
            files.push(dest.display().to_string());
        }

        self.fs.remove_file(&mission_path)?;
        if has_log {
            self.fs.remove_file(&log)?;
        }

        tracing::info!(%id, %timestamp, "paused mission");
        Ok(PauseReport {
            id,
            timestamp,
            files,
        })
    }

    /// Bring back the paused mission `mission_id`, or the most recently
    /// paused one when it is empty.
    pub fn restore(&self, mission_id: &str) -> Result<ResumeReport> {
        let entries = self.paused_entries()?;
        if entries.is_empty() {
            return Err(MissionError::NoPausedMissions);
        }

        let mission_id = mission_id.trim();
        let entry = if mission_id.is_empty() {
            entries
                .iter()
                .filter(|e| e.at.is_some())
                .max_by_key(|e| e.at)
                .ok_or(MissionError::NoPausedMissions)?
        } else {
            entries
                .iter()
                .filter(|e| e.id == mission_id)
                .max_by_key(|e| e.at)
                .ok_or_else(|| MissionError::PausedNotFound(mission_id.to_string()))?
        };

        let live = paths::mission_file(&self.mission_dir);
        if self.fs.exists(&live) {
            return Err(MissionError::MissionExists(live.display().to_string()));
        }

        let paused_doc = paths::paused_mission(&self.mission_dir, &entry.timestamp, &entry.id);
        let paused_log = paths::paused_log(&self.mission_dir, &entry.timestamp, &entry.id);
        let mut files = Vec::new();

        self.fs.copy(&paused_doc, &live)?;
        files.push(live.display().to_string());
        let has_log = self.fs.exists(&paused_log);
        if has_log {
            let log = paths::execution_log(&self.mission_dir);
            self.fs.copy(&paused_log, &log)?;
            files.push(log.display().to_string());
        }

        self.fs.remove_file(&paused_doc)?;
        if has_log {
            self.fs.remove_file(&paused_log)?;
        }

        tracing::info!(id = %entry.id, paused_at = %entry.timestamp, "restored paused mission");
        Ok(ResumeReport {
            id: entry.id.clone(),
            paused_at: entry.timestamp.clone(),
            files,
        })
    }

    /// Paused mission ids with their timestamps, oldest first.
    pub fn list(&self) -> Result<Vec<(String, String)>> {
        let mut entries = self.paused_entries()?;
        entries.sort_by(|a, b| a.at.cmp(&b.at).then_with(|| a.timestamp.cmp(&b.timestamp)));
        Ok(entries.into_iter().map(|e| (e.id, e.timestamp)).collect())
    }

    fn paused_entries(&self) -> Result<Vec<PausedEntry>> {
        let dir = paths::paused_dir(&self.mission_dir);
        if !self.fs.is_dir(&dir) {
            return Ok(Vec::new());
        }
        Ok(self
            .fs
            .read_dir(&dir)?
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
            .filter_map(PausedEntry::from_file_name)
            .collect())
    }
}
