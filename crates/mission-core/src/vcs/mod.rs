//! Version-control capability consumed by the checkpoint engine and archiver.
//!
//! Two implementations: [`GitClient`] shells out to the `git` binary,
//! [`MemoryVcs`] keeps commits, index and tags in memory over an [`Fs`]
//! so the engine can be exercised without a repository.
//!
//! [`Fs`]: crate::fs::Fs

mod git;
mod memory;

pub use git::GitClient;
pub use memory::MemoryVcs;

use crate::error::Result;

/// Paths are repo-relative strings, as recorded in a mission's SCOPE.
pub trait Vcs: Send + Sync {
    fn add(&self, files: &[String]) -> Result<()>;

    /// Commit the index. [`MissionError::NoChanges`] when it matches HEAD.
    ///
    /// [`MissionError::NoChanges`]: crate::error::MissionError::NoChanges
    fn commit(&self, message: &str) -> Result<String>;

    /// Annotated tag `name` on `hash`, written by the configured tagger.
    fn create_tag(&self, name: &str, hash: &str) -> Result<()>;

    /// Check out `files` from `reference` into the working tree and index.
    fn restore(&self, reference: &str, files: &[String]) -> Result<()>;

    fn list_tags(&self, prefix: &str) -> Result<Vec<String>>;

    fn delete_tag(&self, name: &str) -> Result<()>;

    /// Commit a tag points at, dereferencing annotated tags.
    fn get_tag_commit(&self, name: &str) -> Result<String>;

    /// Move HEAD to `hash`, keeping index and working tree.
    fn soft_reset(&self, hash: &str) -> Result<()>;

    fn get_commit_message(&self, reference: &str) -> Result<String>;

    fn is_tracked(&self, path: &str) -> Result<bool>;

    /// `None` for a root commit.
    fn get_commit_parent(&self, hash: &str) -> Result<Option<String>>;

    fn get_unstaged_files(&self) -> Result<Vec<String>>;

    fn get_untracked_files(&self) -> Result<Vec<String>>;

    fn head_commit(&self) -> Result<String>;

    /// Content of `path` at `reference`, `None` if the file is absent there.
    fn show_file(&self, reference: &str, path: &str) -> Result<Option<Vec<u8>>>;
}
