use crate::error::{MissionError, Result};
use crate::fs::Fs;
use crate::mission::Mission;
use crate::paths;
use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rand::Rng;
use std::path::{Path, PathBuf};

/// Issues and resolves mission IDs (`YYYYMMDDHHMMSS-NNNN`).
///
/// The ID is anchored in the live mission document once one exists, and in
/// the `id` sidecar before that.
pub struct IdService<'a> {
    fs: &'a dyn Fs,
    mission_dir: PathBuf,
}

impl<'a> IdService<'a> {
    pub fn new(fs: &'a dyn Fs, mission_dir: &Path) -> Self {
        Self {
            fs,
            mission_dir: mission_dir.to_path_buf(),
        }
    }

    /// Return the sidecar ID, generating and persisting one if the sidecar is
    /// missing or malformed.
    pub fn get_or_create_id(&self) -> Result<String> {
        self.get_or_create_id_at(Utc::now())
    }

    pub fn get_or_create_id_at(&self, now: DateTime<Utc>) -> Result<String> {
        if let Some(id) = self.read_sidecar()? {
            return Ok(id);
        }
        let id = generate_id(now);
        self.fs.create_dir_all(&self.mission_dir)?;
        self.fs.write(&paths::id_file(&self.mission_dir), id.as_bytes())?;
        tracing::info!(%id, "issued mission id");
        Ok(id)
    }

    /// The live document's ID, else the sidecar's.
    pub fn get_current_id(&self) -> Result<String> {
        let mission_path = paths::mission_file(&self.mission_dir);
        if self.fs.exists(&mission_path) {
            let id = Mission::read(self.fs, &mission_path)?.id;
            if !id.trim().is_empty() {
                return Ok(id);
            }
        }
        self.read_sidecar()?.ok_or(MissionError::IdNotFound)
    }

    /// Remove the sidecar when no mission document exists. Returns whether a
    /// file was removed.
    pub fn cleanup_stale_id(&self) -> Result<bool> {
        let id_path = paths::id_file(&self.mission_dir);
        if self.fs.exists(&paths::mission_file(&self.mission_dir)) || !self.fs.exists(&id_path) {
            return Ok(false);
        }
        self.fs.remove_file(&id_path)?;
        tracing::info!("removed stale mission id");
        Ok(true)
    }

    fn read_sidecar(&self) -> Result<Option<String>> {
        let id_path = paths::id_file(&self.mission_dir);
        if !self.fs.exists(&id_path) {
            return Ok(None);
        }
        let id = self.fs.read_to_string(&id_path)?.trim().to_string();
        if paths::is_valid_id(&id) {
            Ok(Some(id))
        } else {
            tracing::warn!(%id, "ignoring malformed id file");
            Ok(None)
        }
    }
}

/// Timestamp plus four digits from the OS random source.
pub fn generate_id(now: DateTime<Utc>) -> String {
    let suffix: u16 = OsRng.gen_range(0..10_000);
    format!("{}-{suffix:04}", now.format("%Y%m%d%H%M%S"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
