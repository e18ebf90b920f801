//! Mission-scoped undo rail on top of a [`Vcs`].
//!
//! A mission `M` accumulates numbered tags `M-1, M-2, ...` plus one
//! `M-baseline` sharing the commit of `M-1`. Every operation only touches
//! files listed in the mission's SCOPE section.

use crate::error::{MissionError, Result};
use crate::fs::Fs;
use crate::mission::Mission;
use crate::paths;
use crate::vcs::Vcs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Prefix of every commit this engine creates.
pub const CHECKPOINT_COMMIT_PREFIX: &str = "checkpoint:";

const BASELINE_SUFFIX: &str = "baseline";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub name: String,
    /// `None` for the baseline.
    pub number: Option<u32>,
    pub commit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestoreResult {
    pub checkpoint: String,
    pub restored: Vec<String>,
    pub removed: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestoreAllResult {
    pub baseline: String,
    pub commit: String,
    pub restored: Vec<String>,
    pub removed: Vec<String>,
    pub tags_cleared: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidateResult {
    pub commit_hash: String,
    /// Commit the checkpoints were squashed onto, if any.
    pub squashed_onto: Option<String>,
    pub unstaged_files: Vec<String>,
}

pub fn checkpoint_name(id: &str, number: u32) -> String {
    format!("{id}-{number}")
}

pub fn baseline_name(id: &str) -> String {
    format!("{id}-{BASELINE_SUFFIX}")
}

/// Numeric suffix after the last `-`; `None` for the baseline or junk.
fn tag_number(tag: &str) -> Option<u32> {
    let (_, suffix) = tag.rsplit_once('-')?;
    if suffix == BASELINE_SUFFIX {
        return None;
    }
    suffix.parse().ok()
}

pub struct CheckpointEngine<'a> {
    fs: &'a dyn Fs,
    vcs: &'a dyn Vcs,
    root: PathBuf,
    mission_dir: PathBuf,
}

impl<'a> CheckpointEngine<'a> {
    pub fn new(fs: &'a dyn Fs, vcs: &'a dyn Vcs, root: &Path, mission_dir: &Path) -> Self {
        Self {
            fs,
            vcs,
            root: root.to_path_buf(),
            mission_dir: mission_dir.to_path_buf(),
        }
    }

    fn scope(&self) -> Result<Vec<String>> {
        let mission = Mission::read(self.fs, &paths::mission_file(&self.mission_dir))?;
        let scope = mission.scope();
        if scope.is_empty() {
            return Err(MissionError::EmptyScope);
        }
        Ok(scope)
    }

    /// Scope entries present on disk or known to the VCS. Tracked files that
    /// were deleted stay in so the deletion gets staged.
    fn stagable(&self, scope: &[String]) -> Result<Vec<String>> {
        let mut files = Vec::with_capacity(scope.len());
        for path in scope {
            if self.fs.exists(&self.root.join(path)) || self.vcs.is_tracked(path)? {
                files.push(path.clone());
            }
        }
        Ok(files)
    }

    pub fn next_number(&self, id: &str) -> Result<u32> {
        let prefix = format!("{id}-");
        let max = self
            .vcs
            .list_tags(&prefix)?
            .iter()
            .filter_map(|t| tag_number(t))
            .max()
            .unwrap_or(0);
        Ok(max + 1)
    }

    /// Commit the scope and tag it `<id>-<k>`. Nothing to commit means the
    /// tag lands on the current HEAD. The first checkpoint also sets the
    /// baseline.
    pub fn create(&self, id: &str) -> Result<String> {
        let scope = self.scope()?;
        let stagable = self.stagable(&scope)?;
        let number = self.next_number(id)?;
        let name = checkpoint_name(id, number);

        self.vcs.add(&stagable)?;
        let target = match self
            .vcs
            .commit(&format!("{CHECKPOINT_COMMIT_PREFIX} {name}"))
        {
            Ok(hash) => hash,
            Err(MissionError::NoChanges) => {
                tracing::debug!(%name, "no scope changes, tagging HEAD");
                self.vcs.head_commit()?
            }
            Err(e) => return Err(e),
        };

        self.vcs.create_tag(&name, &target)?;
        if number == 1 {
            let baseline = baseline_name(id);
            if self.vcs.list_tags(&baseline)?.iter().any(|t| *t == baseline) {
                tracing::warn!(%baseline, "baseline already present, keeping it");
            } else {
                self.vcs.create_tag(&baseline, &target)?;
            }
        }
        tracing::info!(%name, commit = %target, "created checkpoint");
        Ok(name)
    }

    /// Put every scope file back to its content and mode at `name`; scope
    /// files absent there are deleted. Stops at the first read error, keeping
    /// files already written.
    pub fn restore(&self, name: &str) -> Result<RestoreResult> {
        let commit = self.vcs.get_tag_commit(name).map_err(|e| match e {
            MissionError::RefNotFound(_) => MissionError::CheckpointNotFound(name.to_string()),
            other => other,
        })?;
        let scope = self.scope()?;

        let mut restored = Vec::new();
        let mut removed = Vec::new();
        for path in &scope {
            let full = self.root.join(path);
            match self.vcs.show_file(&commit, path)? {
                Some(_) => {
                    self.vcs.restore(&commit, std::slice::from_ref(path))?;
                    restored.push(path.clone());
                }
                None => {
                    if self.fs.exists(&full) {
                        self.fs.remove_file(&full)?;
                        removed.push(path.clone());
                    }
                }
            }
        }
        tracing::info!(checkpoint = %name, restored = restored.len(), removed = removed.len(), "restored checkpoint");
        Ok(RestoreResult {
            checkpoint: name.to_string(),
            restored,
            removed,
        })
    }

    /// Delete every `<id>-*` tag, baseline included.
    pub fn clear(&self, id: &str) -> Result<usize> {
        let tags = self
            .vcs
            .list_tags(&format!("{id}-"))
            .map_err(|e| MissionError::ClearFailed {
                deleted: 0,
                source: Box::new(e),
            })?;
        let mut deleted = 0;
        for tag in &tags {
            self.vcs
                .delete_tag(tag)
                .map_err(|e| MissionError::ClearFailed {
                    deleted,
                    source: Box::new(e),
                })?;
            deleted += 1;
        }
        tracing::info!(%id, deleted, "cleared checkpoints");
        Ok(deleted)
    }

    /// Roll the scope back to the baseline, move HEAD there (soft) and drop
    /// all checkpoint tags.
    pub fn restore_all(&self, id: &str) -> Result<RestoreAllResult> {
        let baseline = baseline_name(id);
        let commit = self.vcs.get_tag_commit(&baseline).map_err(|e| match e {
            MissionError::RefNotFound(_) => MissionError::BaselineMissing(id.to_string()),
            other => other,
        })?;
        let scope = self.scope()?;

        let mut present = Vec::new();
        let mut absent = Vec::new();
        for path in scope {
            if self.vcs.show_file(&commit, &path)?.is_some() {
                present.push(path);
            } else {
                absent.push(path);
            }
        }

        self.vcs.restore(&commit, &present)?;
        let mut removed = Vec::new();
        let mut tracked_absent = Vec::new();
        for path in absent {
            let full = self.root.join(&path);
            if self.fs.exists(&full) {
                self.fs.remove_file(&full)?;
                removed.push(path.clone());
            }
            if self.vcs.is_tracked(&path)? {
                tracked_absent.push(path);
            }
        }
        self.vcs.add(&tracked_absent)?;

        self.vcs.soft_reset(&commit)?;
        let tags_cleared = self.clear(id)?;
        tracing::info!(%id, %commit, "restored mission baseline");
        Ok(RestoreAllResult {
            baseline,
            commit,
            restored: present,
            removed,
            tags_cleared,
        })
    }

    /// Squash the mission's checkpoint commits and any final scope edits into
    /// one commit titled `message`, then drop the tags.
    pub fn consolidate(&self, id: &str, message: &str) -> Result<ConsolidateResult> {
        let first = checkpoint_name(id, 1);
        let squashed_onto = match self.vcs.get_tag_commit(&first) {
            Ok(hash) => Some(self.squash_target(&hash)?),
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(e),
        };

        if let Some(target) = &squashed_onto {
            self.vcs.soft_reset(target)?;
        }

        let scope = self.scope()?;
        let stagable = self.stagable(&scope)?;
        self.vcs.add(&stagable)?;
        let commit_hash = self.vcs.commit(message)?;

        if let Err(e) = self.clear(id) {
            tracing::warn!(error = %e, %id, "failed to clear checkpoint tags after consolidate");
        }

        let unstaged_files = self.vcs.get_unstaged_files().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "could not list unstaged files");
            Vec::new()
        });

        tracing::info!(%id, commit = %commit_hash, "consolidated mission");
        Ok(ConsolidateResult {
            commit_hash,
            squashed_onto,
            unstaged_files,
        })
    }

    /// Parent of an engine-made first checkpoint, or the commit itself when
    /// it was a pre-existing HEAD that got tagged.
    fn squash_target(&self, first_commit: &str) -> Result<String> {
        let message = self.vcs.get_commit_message(first_commit)?;
        if !message.trim_start().starts_with(CHECKPOINT_COMMIT_PREFIX) {
            return Ok(first_commit.to_string());
        }
        match self.vcs.get_commit_parent(first_commit)? {
            Some(parent) => Ok(parent),
            None => {
                tracing::warn!(commit = %first_commit, "first checkpoint is a root commit, squashing onto it");
                Ok(first_commit.to_string())
            }
        }
    }

    /// Numbered checkpoints in order, then the baseline.
    pub fn list(&self, id: &str) -> Result<Vec<Checkpoint>> {
        let baseline = baseline_name(id);
        let mut numbered = Vec::new();
        let mut base = None;
        for tag in self.vcs.list_tags(&format!("{id}-"))? {
            let commit = self.vcs.get_tag_commit(&tag)?;
            if tag == baseline {
                base = Some(Checkpoint {
                    name: tag,
                    number: None,
                    commit,
                });
            } else if let Some(number) = tag_number(&tag) {
                numbered.push(Checkpoint {
                    name: tag,
                    number: Some(number),
                    commit,
                });
            }
        }
        numbered.sort_by_key(|c| c.number);
        numbered.extend(base);
        Ok(numbered)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemFs;
    use crate::vcs::MemoryVcs;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    struct Repo {
        fs: Arc<MemFs>,
        vcs: MemoryVcs,
    }

    impl Repo {
        fn new(scope: &[&str]) -> Self {
            let fs = Arc::new(MemFs::new());
            let vcs = MemoryVcs::new(fs.clone(), Path::new("/repo"));
            let doc = format!(
                "---\nid: M\nstatus: active\n---\n\n## INTENT\nx\n\n## SCOPE\n{}\n",
                scope.join("\n")
            );
            fs.write(Path::new("/repo/.mission/mission.md"), doc.as_bytes())
                .unwrap();
            Repo { fs, vcs }
        }

        fn engine(&self) -> CheckpointEngine<'_> {
            CheckpointEngine::new(
                self.fs.as_ref(),
                &self.vcs,
                Path::new("/repo"),
                Path::new("/repo/.mission"),
            )
        }

        fn put(&self, path: &str, data: &str) {
            self.fs
                .write(&Path::new("/repo").join(path), data.as_bytes())
                .unwrap();
        }

        fn get(&self, path: &str) -> Option<String> {
            self.fs
                .read_to_string(&Path::new("/repo").join(path))
                .ok()
        }

        /// Pre-mission commit made outside the engine.
        fn seed(&self, files: &[&str]) -> String {
            let files: Vec<String> = files.iter().map(|s| s.to_string()).collect();
            self.vcs.add(&files).unwrap();
            self.vcs.commit("init").unwrap()
        }
    }

    #[test]
    fn create_then_restore() {
        let repo = Repo::new(&["f.txt"]);
        repo.put("f.txt", "v1");
        repo.put("other.txt", "o1");

        let engine = repo.engine();
        assert_eq!(engine.create("M").unwrap(), "M-1");
        let tags = repo.vcs.list_tags("M-").unwrap();
        assert!(tags.contains(&"M-1".to_string()));
        assert!(tags.contains(&"M-baseline".to_string()));
        assert_eq!(
            repo.vcs.get_tag_commit("M-1").unwrap(),
            repo.vcs.get_tag_commit("M-baseline").unwrap()
        );
        assert_eq!(repo.vcs.tagger_of("M-1").as_deref(), Some("mission <mission@localhost>"));

        repo.put("f.txt", "v2");
        repo.put("other.txt", "o2");
        let result = engine.restore("M-1").unwrap();
        assert_eq!(result.restored, vec!["f.txt"]);
        assert_eq!(repo.get("f.txt").as_deref(), Some("v1"));
        assert_eq!(repo.get("other.txt").as_deref(), Some("o2"));
    }

    #[test]
    fn unchanged_scope_tags_head() {
        let repo = Repo::new(&["f.txt"]);
        repo.put("f.txt", "v0");
        let init = repo.seed(&["f.txt"]);

        let engine = repo.engine();
        assert_eq!(engine.create("M").unwrap(), "M-1");
        assert_eq!(repo.vcs.get_tag_commit("M-1").unwrap(), init);
        assert_eq!(repo.vcs.get_tag_commit("M-baseline").unwrap(), init);
        assert_eq!(engine.create("M").unwrap(), "M-2");
        assert_eq!(repo.vcs.commit_count(), 1);
    }

    #[test]
    fn numbering_ignores_baseline_and_junk() {
        let repo = Repo::new(&["f.txt"]);
        repo.put("f.txt", "v0");
        let init = repo.seed(&["f.txt"]);
        for tag in ["M-baseline", "M-abc", "M-7", "M-2"] {
            repo.vcs.create_tag(tag, &init).unwrap();
        }
        let engine = repo.engine();
        assert_eq!(engine.next_number("M").unwrap(), 8);
        assert_eq!(engine.create("M").unwrap(), "M-8");
    }

    #[test]
    fn empty_scope_is_rejected() {
        let repo = Repo::new(&[]);
        assert!(matches!(repo.engine().create("M"), Err(MissionError::EmptyScope)));
    }

    #[test]
    fn restore_unknown_checkpoint() {
        let repo = Repo::new(&["f.txt"]);
        assert!(matches!(
            repo.engine().restore("M-4"),
            Err(MissionError::CheckpointNotFound(name)) if name == "M-4"
        ));
    }

    #[test]
    fn restore_removes_files_absent_at_tag() {
        let repo = Repo::new(&["f.txt", "new.txt"]);
        repo.put("f.txt", "v1");
        let engine = repo.engine();
        engine.create("M").unwrap();

        repo.put("new.txt", "fresh");
        let result = engine.restore("M-1").unwrap();
        assert_eq!(result.removed, vec!["new.txt"]);
        assert_eq!(repo.get("new.txt"), None);
    }

    #[test]
    fn deleted_scope_file_is_staged() {
        let repo = Repo::new(&["f.txt"]);
        repo.put("f.txt", "v0");
        repo.seed(&["f.txt"]);
        repo.fs.remove_file(Path::new("/repo/f.txt")).unwrap();

        let engine = repo.engine();
        engine.create("M").unwrap();
        let commit = repo.vcs.get_tag_commit("M-1").unwrap();
        assert_eq!(repo.vcs.show_file(&commit, "f.txt").unwrap(), None);
    }

    #[test]
    fn clear_removes_every_tag() {
        let repo = Repo::new(&["f.txt"]);
        let engine = repo.engine();
        repo.put("f.txt", "v1");
        engine.create("M").unwrap();
        repo.put("f.txt", "v2");
        engine.create("M").unwrap();

        assert_eq!(engine.clear("M").unwrap(), 3);
        assert!(repo.vcs.list_tags("M-").unwrap().is_empty());
        assert_eq!(engine.clear("M").unwrap(), 0);
    }

    #[test]
    fn restore_all_returns_to_baseline() {
        let repo = Repo::new(&["f.txt", "new.txt"]);
        repo.put("f.txt", "v0");
        let init = repo.seed(&["f.txt"]);
        let engine = repo.engine();

        engine.create("M").unwrap();
        repo.put("f.txt", "v1");
        engine.create("M").unwrap();
        repo.put("new.txt", "added");
        engine.create("M").unwrap();

        let result = engine.restore_all("M").unwrap();
        assert_eq!(result.commit, init);
        assert_eq!(result.tags_cleared, 4);
        assert_eq!(result.removed, vec!["new.txt"]);
        assert_eq!(repo.get("f.txt").as_deref(), Some("v0"));
        assert_eq!(repo.get("new.txt"), None);
        assert_eq!(repo.vcs.head_commit().unwrap(), init);
        assert!(repo.vcs.list_tags("M-").unwrap().is_empty());
        assert!(!repo.vcs.is_tracked("new.txt").unwrap());

        assert!(matches!(
            engine.restore_all("M"),
            Err(MissionError::BaselineMissing(_))
        ));
    }

    #[test]
    fn consolidate_squashes_checkpoints() {
        let repo = Repo::new(&["f.txt"]);
        repo.put("f.txt", "v0");
        let init = repo.seed(&["f.txt"]);
        let engine = repo.engine();

        repo.put("f.txt", "v1");
        engine.create("M").unwrap();
        repo.put("f.txt", "v2");
        engine.create("M").unwrap();
        repo.put("f.txt", "v3");
        repo.put("outside.txt", "dirty");

        let result = engine.consolidate("M", "Final").unwrap();
        assert_eq!(result.squashed_onto.as_deref(), Some(init.as_str()));
        assert_eq!(repo.vcs.get_commit_message("HEAD").unwrap(), "Final");
        assert_eq!(repo.vcs.head_commit().unwrap(), result.commit_hash);
        assert_eq!(
            repo.vcs.get_commit_parent(&result.commit_hash).unwrap(),
            Some(init)
        );
        assert_eq!(
            repo.vcs.show_file("HEAD", "f.txt").unwrap(),
            Some(b"v3".to_vec())
        );
        assert!(repo.vcs.list_tags("M-").unwrap().is_empty());
        assert!(result.unstaged_files.is_empty());
    }

    #[test]
    fn consolidate_keeps_pre_existing_head() {
        let repo = Repo::new(&["f.txt"]);
        repo.put("f.txt", "v0");
        let init = repo.seed(&["f.txt"]);
        let engine = repo.engine();

        engine.create("M").unwrap();
        repo.put("f.txt", "v1");
        engine.create("M").unwrap();

        let result = engine.consolidate("M", "Final").unwrap();
        assert_eq!(result.squashed_onto.as_deref(), Some(init.as_str()));
        assert_eq!(
            repo.vcs.get_commit_parent(&result.commit_hash).unwrap(),
            Some(init.clone())
        );
        assert_eq!(repo.vcs.get_commit_message(&init).unwrap(), "init");
    }

    #[test]
    fn consolidate_without_changes_fails() {
        let repo = Repo::new(&["f.txt"]);
        repo.put("f.txt", "v0");
        repo.seed(&["f.txt"]);
        assert!(matches!(
            repo.engine().consolidate("M", "Final"),
            Err(MissionError::NoChanges)
        ));
    }

    #[test]
    fn list_orders_by_number() {
        let repo = Repo::new(&["f.txt"]);
        let engine = repo.engine();
        for v in 1..=3 {
            repo.put("f.txt", &format!("v{v}"));
            engine.create("M").unwrap();
        }
        repo.vcs
            .create_tag("M-10", &repo.vcs.head_commit().unwrap())
            .unwrap();

        let names: Vec<String> = engine.list("M").unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["M-1", "M-2", "M-3", "M-10", "M-baseline"]);
    }

    /// Delegates to a [`MemoryVcs`], failing tag writes or single-file reads
    /// on demand.
    struct Faulty<'a> {
        inner: &'a MemoryVcs,
        fail_tags: AtomicBool,
        fail_show: Mutex<Option<String>>,
    }

    impl<'a> Faulty<'a> {
        fn new(inner: &'a MemoryVcs) -> Self {
            Self {
                inner,
                fail_tags: AtomicBool::new(false),
                fail_show: Mutex::new(None),
            }
        }

        fn injected(what: &str) -> MissionError {
            MissionError::Vcs {
                command: what.to_string(),
                stderr: "injected failure".to_string(),
            }
        }
    }

    impl Vcs for Faulty<'_> {
        fn add(&self, files: &[String]) -> Result<()> {
            self.inner.add(files)
        }
        fn commit(&self, message: &str) -> Result<String> {
            self.inner.commit(message)
        }
        fn create_tag(&self, name: &str, hash: &str) -> Result<()> {
            if self.fail_tags.load(Ordering::SeqCst) {
                return Err(Self::injected("tag"));
            }
            self.inner.create_tag(name, hash)
        }
        fn restore(&self, reference: &str, files: &[String]) -> Result<()> {
            self.inner.restore(reference, files)
        }
        fn list_tags(&self, prefix: &str) -> Result<Vec<String>> {
            self.inner.list_tags(prefix)
        }
        fn delete_tag(&self, name: &str) -> Result<()> {
            self.inner.delete_tag(name)
        }
        fn get_tag_commit(&self, name: &str) -> Result<String> {
            self.inner.get_tag_commit(name)
        }
        fn soft_reset(&self, hash: &str) -> Result<()> {
            self.inner.soft_reset(hash)
        }
        fn get_commit_message(&self, reference: &str) -> Result<String> {
            self.inner.get_commit_message(reference)
        }
        fn is_tracked(&self, path: &str) -> Result<bool> {
            self.inner.is_tracked(path)
        }
        fn get_commit_parent(&self, hash: &str) -> Result<Option<String>> {
            self.inner.get_commit_parent(hash)
        }
        fn get_unstaged_files(&self) -> Result<Vec<String>> {
            self.inner.get_unstaged_files()
        }
        fn get_untracked_files(&self) -> Result<Vec<String>> {
            self.inner.get_untracked_files()
        }
        fn head_commit(&self) -> Result<String> {
            self.inner.head_commit()
        }
        fn show_file(&self, reference: &str, path: &str) -> Result<Option<Vec<u8>>> {
            let failing = self.fail_show.lock().unwrap().clone();
            if failing.as_deref() == Some(path) {
                return Err(Self::injected("show"));
            }
            self.inner.show_file(reference, path)
        }
    }

    #[test]
    fn create_retags_head_after_tag_failure() {
        let repo = Repo::new(&["f.txt"]);
        repo.put("f.txt", "v1");
        let faulty = Faulty::new(&repo.vcs);
        let engine = CheckpointEngine::new(
            repo.fs.as_ref(),
            &faulty,
            Path::new("/repo"),
            Path::new("/repo/.mission"),
        );

        faulty.fail_tags.store(true, Ordering::SeqCst);
        assert!(matches!(engine.create("M"), Err(MissionError::Vcs { .. })));
        assert_eq!(repo.vcs.commit_count(), 1);
        assert!(repo.vcs.list_tags("M-").unwrap().is_empty());
        let head = repo.vcs.head_commit().unwrap();

        faulty.fail_tags.store(false, Ordering::SeqCst);
        assert_eq!(engine.create("M").unwrap(), "M-1");
        assert_eq!(repo.vcs.commit_count(), 1);
        assert_eq!(repo.vcs.get_tag_commit("M-1").unwrap(), head);
        assert_eq!(repo.vcs.get_tag_commit("M-baseline").unwrap(), head);
    }

    #[test]
    fn restore_stops_at_first_read_error() {
        let repo = Repo::new(&["a.txt", "b.txt", "c.txt"]);
        for f in ["a.txt", "b.txt", "c.txt"] {
            repo.put(f, "v1");
        }
        repo.engine().create("M").unwrap();
        for f in ["a.txt", "b.txt", "c.txt"] {
            repo.put(f, "v2");
        }

        let faulty = Faulty::new(&repo.vcs);
        *faulty.fail_show.lock().unwrap() = Some("b.txt".to_string());
        let engine = CheckpointEngine::new(
            repo.fs.as_ref(),
            &faulty,
            Path::new("/repo"),
            Path::new("/repo/.mission"),
        );

        assert!(engine.restore("M-1").is_err());
        assert_eq!(repo.get("a.txt").as_deref(), Some("v1"));
        assert_eq!(repo.get("b.txt").as_deref(), Some("v2"));
        assert_eq!(repo.get("c.txt").as_deref(), Some("v2"));
    }

    #[cfg(unix)]
    #[test]
    fn git_restore_from_subdirectory_keeps_mode() {
        use crate::config::VcsConfig;
        use crate::fs::OsFs;
        use crate::vcs::GitClient;
        use std::os::unix::fs::PermissionsExt;
        use std::process::Command;

        if which::which("git").is_err() {
            return;
        }
        let dir = tempfile::TempDir::new().unwrap();
        for args in [
            &["init", "-q"][..],
            &["config", "user.name", "Test"],
            &["config", "user.email", "test@example.com"],
        ] {
            let status = Command::new("git")
                .current_dir(dir.path())
                .args(args)
                .status()
                .unwrap();
            assert!(status.success());
        }

        let root = dir.path().join("sub");
        let mission_dir = root.join(".mission");
        std::fs::create_dir_all(&mission_dir).unwrap();
        std::fs::write(
            mission_dir.join("mission.md"),
            "---\nid: M\nstatus: active\n---\n\n## SCOPE\nrun.sh\n",
        )
        .unwrap();
        let script = root.join("run.sh");
        std::fs::write(&script, "v1").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let git = GitClient::new(&root, &VcsConfig::default()).unwrap();
        let engine = CheckpointEngine::new(&OsFs, &git, &root, &mission_dir);
        assert_eq!(engine.create("M").unwrap(), "M-1");

        std::fs::write(&script, "v2").unwrap();
        let result = engine.restore("M-1").unwrap();
        assert_eq!(result.restored, vec!["run.sh"]);
        assert!(result.removed.is_empty());
        assert_eq!(std::fs::read_to_string(&script).unwrap(), "v1");
        let mode = std::fs::metadata(&script).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}
