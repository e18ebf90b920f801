pub mod apply;
pub mod check;
pub mod checkpoint;
pub mod complete;
pub mod config;
pub mod finalize;
pub mod id;
pub mod init;
pub mod log;
pub mod pause;
pub mod plan;
pub mod update;

use anyhow::Context as _;
use mission_core::{
    check::{CheckService, CheckStatus},
    config::Config,
    fs::OsFs,
    id::IdService,
    paths,
    types::Context,
    vcs::GitClient,
    writer::MissionWriter,
};
use std::fmt;
use std::path::{Path, PathBuf};

/// The check gate refused the command. Carries the `STOP.` line for output.
#[derive(Debug)]
pub struct Stopped {
    pub next_step: String,
}

impl fmt::Display for Stopped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.next_step.trim_start_matches("STOP.").trim())
    }
}

impl std::error::Error for Stopped {}

/// Paths and capabilities shared by every command.
pub struct Project {
    pub root: PathBuf,
    pub mission_dir: PathBuf,
    pub fs: OsFs,
}

impl Project {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            mission_dir: paths::mission_dir(root),
            fs: OsFs,
        }
    }

    pub fn writer(&self) -> MissionWriter<'_> {
        MissionWriter::new(&self.fs, &self.mission_dir)
    }

    pub fn ids(&self) -> IdService<'_> {
        IdService::new(&self.fs, &self.mission_dir)
    }

    pub fn config(&self) -> anyhow::Result<Config> {
        Config::load(&self.fs, &self.mission_dir).context("failed to load .mission/config.yaml")
    }

    pub fn git(&self) -> anyhow::Result<GitClient> {
        let config = self.config()?;
        GitClient::new(&self.root, &config.vcs).context("version control is not available")
    }

    pub fn mission_id(&self) -> anyhow::Result<String> {
        self.ids().get_current_id().context("no mission id")
    }

    pub fn has_mission(&self) -> bool {
        paths::mission_file(&self.mission_dir).exists()
    }

    /// Run the check gate for `context` and fail with [`Stopped`] unless it
    /// says PROCEED.
    pub fn gate(&self, context: Context) -> anyhow::Result<CheckStatus> {
        let status = CheckService::new(&self.fs, &self.mission_dir)
            .check(context)
            .with_context(|| format!("check failed for context '{context}'"))?;
        if !status.ready {
            return Err(Stopped {
                next_step: status.next_step,
            }
            .into());
        }
        Ok(status)
    }
}
