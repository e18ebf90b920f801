use crate::error::Result;
use crate::fs::Fs;
use crate::paths;
use crate::types::LogLevel;
use chrono::{DateTime, SecondsFormat, Utc};
use std::path::{Path, PathBuf};

/// Append-only `execution.log` next to the mission document.
///
/// Each record is one line, `<RFC3339 UTC> [LEVEL] message`, and is also
/// emitted as a tracing event.
pub struct ExecutionLog<'a> {
    fs: &'a dyn Fs,
    path: PathBuf,
}

impl<'a> ExecutionLog<'a> {
    pub fn new(fs: &'a dyn Fs, mission_dir: &Path) -> Self {
        Self {
            fs,
            path: paths::execution_log(mission_dir),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, level: LogLevel, message: &str) -> Result<()> {
        self.append_at(Utc::now(), level, message)
    }

    pub fn append_at(&self, at: DateTime<Utc>, level: LogLevel, message: &str) -> Result<()> {
        match level {
            LogLevel::Debug => tracing::debug!(target: "mission::execution", "{message}"),
            LogLevel::Info | LogLevel::Success => {
                tracing::info!(target: "mission::execution", record = %level, "{message}")
            }
            LogLevel::Warn => tracing::warn!(target: "mission::execution", "{message}"),
            LogLevel::Error => tracing::error!(target: "mission::execution", "{message}"),
        }
        // Multi-line messages stay one record.
        let message = message.trim().replace('\n', " ");
        let line = format!(
            "{} [{}] {}\n",
            at.to_rfc3339_opts(SecondsFormat::Secs, true),
            level,
            message
        );
        self.fs.append(&self.path, line.as_bytes())
    }

    /// All records, oldest first. Empty when the log does not exist yet.
    pub fn read(&self) -> Result<Vec<String>> {
        if !self.fs.exists(&self.path) {
            return Ok(Vec::new());
        }
        Ok(self
            .fs
            .read_to_string(&self.path)?
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(str::to_string)
            .collect())
    }
}
