use crate::error::{MissionError, Result};
use crate::fs::Fs;
use crate::id::IdService;
use crate::paths;
use crate::vcs::Vcs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveReport {
    pub archived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
}

impl ArchiveReport {
    /// Report for a forced archive with no live mission.
    pub fn nothing() -> Self {
        Self {
            archived: false,
            id: None,
            files: Vec::new(),
        }
    }
}

/// Remove the live mission and its sidecars. Returns what was removed.
/// Absent files are skipped.
pub fn cleanup_obsolete_files(fs: &dyn Fs, mission_dir: &Path) -> Result<Vec<String>> {
    let mut removed = Vec::new();
    for path in [
        paths::execution_log(mission_dir),
        paths::mission_file(mission_dir),
        paths::id_file(mission_dir),
        paths::plan_file(mission_dir),
    ] {
        if fs.exists(&path) {
            fs.remove_file(&path)?;
            removed.push(path.display().to_string());
        }
    }
    Ok(removed)
}

/// Copies a finished mission into `completed/` and clears the live sidecars.
pub struct Archiver<'a> {
    fs: &'a dyn Fs,
    vcs: &'a dyn Vcs,
    mission_dir: PathBuf,
}

impl<'a> Archiver<'a> {
    pub fn new(fs: &'a dyn Fs, vcs: &'a dyn Vcs, mission_dir: &Path) -> Self {
        Self {
            fs,
            vcs,
            mission_dir: mission_dir.to_path_buf(),
        }
    }

    /// With `force`, a missing mission is a no-op instead of an error.
    pub fn archive(&self, force: bool) -> Result<ArchiveReport> {
        let mission_path = paths::mission_file(&self.mission_dir);
        if !self.fs.exists(&mission_path) {
            if force {
                tracing::debug!("nothing to archive");
                return Ok(ArchiveReport::nothing());
            }
            return Err(MissionError::MissionNotFound(
                mission_path.display().to_string(),
            ));
        }

        self.fs
            .create_dir_all(&paths::completed_dir(&self.mission_dir))?;
        let id = IdService::new(self.fs, &self.mission_dir).get_current_id()?;

        let mut files = Vec::new();
        let dest = paths::completed_mission(&self.mission_dir, &id);
        self.fs.copy(&mission_path, &dest)?;
        files.push(dest.display().to_string());

        let log = paths::execution_log(&self.mission_dir);
        if self.fs.exists(&log) {
            let dest = paths::completed_log(&self.mission_dir, &id);
            self.fs.copy(&log, &dest)?;
            files.push(dest.display().to_string());
        }

        let message = self.vcs.get_commit_message("HEAD")?;
        let dest = paths::completed_commit_msg(&self.mission_dir, &id);
        self.fs.write(&dest, message.as_bytes())?;
        files.push(dest.display().to_string());

        tracing::info!(%id, "archived mission");
        Ok(ArchiveReport {
            archived: true,
            id: Some(id),
            files,
        })
    }

    pub fn cleanup_obsolete_files(&self) -> Result<Vec<String>> {
        cleanup_obsolete_files(self.fs, &self.mission_dir)
    }
}
