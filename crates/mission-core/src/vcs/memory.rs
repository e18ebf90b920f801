use super::Vcs;
use crate::error::{MissionError, Result};
use crate::fs::Fs;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

type Tree = BTreeMap<String, Vec<u8>>;

#[derive(Debug, Clone)]
struct Commit {
    parent: Option<String>,
    message: String,
    tree: Tree,
}

#[derive(Debug, Clone)]
struct Tag {
    commit: String,
    tagger: String,
}

#[derive(Debug, Default)]
struct RepoState {
    seq: u64,
    commits: BTreeMap<String, Commit>,
    head: Option<String>,
    index: Tree,
    tags: BTreeMap<String, Tag>,
}

impl RepoState {
    fn resolve(&self, reference: &str) -> Result<String> {
        if reference == "HEAD" {
            return self
                .head
                .clone()
                .ok_or_else(|| MissionError::RefNotFound(reference.to_string()));
        }
        if let Some(tag) = self.tags.get(reference) {
            return Ok(tag.commit.clone());
        }
        if self.commits.contains_key(reference) {
            return Ok(reference.to_string());
        }
        Err(MissionError::RefNotFound(reference.to_string()))
    }

    fn commit(&self, hash: &str) -> Result<&Commit> {
        self.commits
            .get(hash)
            .ok_or_else(|| MissionError::RefNotFound(hash.to_string()))
    }

    fn head_tree(&self) -> Tree {
        self.head
            .as_ref()
            .and_then(|h| self.commits.get(h))
            .map(|c| c.tree.clone())
            .unwrap_or_default()
    }
}

/// In-memory repository over an [`Fs`] working tree.
///
/// Commits snapshot the index; HEAD, index and annotated tags behave like
/// their git counterparts for the operations in [`Vcs`]. Ignore files are
/// not modelled.
pub struct MemoryVcs {
    fs: Arc<dyn Fs>,
    root: PathBuf,
    tagger: String,
    state: Mutex<RepoState>,
}

impl MemoryVcs {
    pub fn new(fs: Arc<dyn Fs>, root: &Path) -> Self {
        Self {
            fs,
            root: root.to_path_buf(),
            tagger: "mission <mission@localhost>".to_string(),
            state: Mutex::new(RepoState::default()),
        }
    }

    pub fn with_tagger(mut self, name: &str, email: &str) -> Self {
        self.tagger = format!("{name} <{email}>");
        self
    }

    /// Identity recorded on an annotated tag.
    pub fn tagger_of(&self, tag: &str) -> Option<String> {
        self.lock().tags.get(tag).map(|t| t.tagger.clone())
    }

    pub fn commit_count(&self) -> usize {
        self.lock().commits.len()
    }

    fn lock(&self) -> MutexGuard<'_, RepoState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn disk(&self, path: &str) -> Result<Option<Vec<u8>>> {
        let full = self.root.join(path);
        if !self.fs.exists(&full) || self.fs.is_dir(&full) {
            return Ok(None);
        }
        Ok(Some(self.fs.read(&full)?))
    }

    fn relative(&self, path: &Path) -> Option<String> {
        path.strip_prefix(&self.root)
            .ok()
            .map(|p| p.to_string_lossy().replace('\\', "/"))
    }
}

impl Vcs for MemoryVcs {
    fn add(&self, files: &[String]) -> Result<()> {
        let mut staged = Vec::with_capacity(files.len());
        for file in files {
            staged.push((file.clone(), self.disk(file)?));
        }
        let mut state = self.lock();
        for (file, content) in staged {
            match content {
                Some(data) => {
                    state.index.insert(file, data);
                }
                None => {
                    state.index.remove(&file);
                }
            }
        }
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<String> {
        let mut state = self.lock();
        if state.index == state.head_tree() {
            return Err(MissionError::NoChanges);
        }
        state.seq += 1;
        let hash = format!("{:040x}", state.seq);
        let commit = Commit {
            parent: state.head.clone(),
            message: message.to_string(),
            tree: state.index.clone(),
        };
        state.commits.insert(hash.clone(), commit);
        state.head = Some(hash.clone());
        Ok(hash)
    }

    fn create_tag(&self, name: &str, hash: &str) -> Result<()> {
        let mut state = self.lock();
        let commit = state.resolve(hash)?;
        if state.tags.contains_key(name) {
            return Err(MissionError::Vcs {
                command: format!("tag -a {name}"),
                stderr: format!("tag '{name}' already exists"),
            });
        }
        let tag = Tag {
            commit,
            tagger: self.tagger.clone(),
        };
        state.tags.insert(name.to_string(), tag);
        Ok(())
    }

    fn restore(&self, reference: &str, files: &[String]) -> Result<()> {
        let tree = {
            let state = self.lock();
            let hash = state.resolve(reference)?;
            state.commit(&hash)?.tree.clone()
        };
        for file in files {
            let data = tree.get(file).ok_or_else(|| MissionError::Vcs {
                command: format!("checkout {reference} -- {file}"),
                stderr: format!("pathspec '{file}' did not match any file(s) known to git"),
            })?;
            self.fs.write(&self.root.join(file), data)?;
            self.lock().index.insert(file.clone(), data.clone());
        }
        Ok(())
    }

    fn list_tags(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .lock()
            .tags
            .keys()
            .filter(|t| t.starts_with(prefix))
            .cloned()
            .collect())
    }

    fn delete_tag(&self, name: &str) -> Result<()> {
        self.lock()
            .tags
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| MissionError::RefNotFound(name.to_string()))
    }

    fn get_tag_commit(&self, name: &str) -> Result<String> {
        self.lock()
            .tags
            .get(name)
            .map(|t| t.commit.clone())
            .ok_or_else(|| MissionError::RefNotFound(name.to_string()))
    }

    fn soft_reset(&self, hash: &str) -> Result<()> {
        let mut state = self.lock();
        let target = state.resolve(hash)?;
        state.head = Some(target);
        Ok(())
    }

    fn get_commit_message(&self, reference: &str) -> Result<String> {
        let state = self.lock();
        let hash = state.resolve(reference)?;
        Ok(state.commit(&hash)?.message.clone())
    }

    fn is_tracked(&self, path: &str) -> Result<bool> {
        Ok(self.lock().index.contains_key(path))
    }

    fn get_commit_parent(&self, hash: &str) -> Result<Option<String>> {
        let state = self.lock();
        let hash = state.resolve(hash)?;
        Ok(state.commit(&hash)?.parent.clone())
    }

    fn get_unstaged_files(&self) -> Result<Vec<String>> {
        let index = self.lock().index.clone();
        let mut changed = Vec::new();
        for (path, staged) in &index {
            if self.disk(path)?.as_ref() != Some(staged) {
                changed.push(path.clone());
            }
        }
        Ok(changed)
    }

    fn get_untracked_files(&self) -> Result<Vec<String>> {
        if !self.fs.is_dir(&self.root) {
            return Ok(Vec::new());
        }
        let index = self.lock().index.clone();
        Ok(self
            .fs
            .walk(&self.root)?
            .iter()
            .filter_map(|p| self.relative(p))
            .filter(|p| !p.starts_with(".git/") && !index.contains_key(p))
            .collect())
    }

    fn head_commit(&self) -> Result<String> {
        self.lock().resolve("HEAD")
    }

    fn show_file(&self, reference: &str, path: &str) -> Result<Option<Vec<u8>>> {
        let state = self.lock();
        let hash = state.resolve(reference)?;
        Ok(state.commit(&hash)?.tree.get(path).cloned())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemFs;

    fn setup() -> (Arc<MemFs>, MemoryVcs) {
        let fs = Arc::new(MemFs::new());
        let vcs = MemoryVcs::new(fs.clone(), Path::new("/repo"));
        (fs, vcs)
    }

    fn files(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn commit_requires_changes() {
        let (fs, vcs) = setup();
        assert!(matches!(vcs.commit("empty"), Err(MissionError::NoChanges)));
        assert!(matches!(vcs.head_commit(), Err(MissionError::RefNotFound(_))));

        fs.write(Path::new("/repo/f.txt"), b"v1").unwrap();
        vcs.add(&files(&["f.txt"])).unwrap();
        let first = vcs.commit("one").unwrap();
        assert_eq!(first.len(), 40);
        assert_eq!(vcs.head_commit().unwrap(), first);
        assert!(matches!(vcs.commit("two"), Err(MissionError::NoChanges)));
        assert_eq!(vcs.get_commit_parent(&first).unwrap(), None);
    }

    #[test]
    fn tags_dereference_and_record_tagger() {
        let (fs, vcs) = setup();
        let vcs = vcs.with_tagger("bot", "bot@example.com");
        fs.write(Path::new("/repo/f.txt"), b"v1").unwrap();
        vcs.add(&files(&["f.txt"])).unwrap();
        let hash = vcs.commit("one").unwrap();

        vcs.create_tag("M-1", &hash).unwrap();
        vcs.create_tag("M-baseline", "HEAD").unwrap();
        assert!(vcs.create_tag("M-1", &hash).is_err());
        assert_eq!(vcs.list_tags("M-").unwrap(), vec!["M-1", "M-baseline"]);
        assert_eq!(vcs.get_tag_commit("M-baseline").unwrap(), hash);
        assert_eq!(vcs.tagger_of("M-1").as_deref(), Some("bot <bot@example.com>"));

        vcs.delete_tag("M-1").unwrap();
        assert!(vcs.delete_tag("M-1").is_err());
        assert_eq!(vcs.list_tags("M-").unwrap(), vec!["M-baseline"]);
    }

    #[test]
    fn working_tree_queries() {
        let (fs, vcs) = setup();
        fs.write(Path::new("/repo/a.txt"), b"a").unwrap();
        fs.write(Path::new("/repo/b.txt"), b"b").unwrap();
        fs.write(Path::new("/repo/.git/HEAD"), b"ref").unwrap();
        vcs.add(&files(&["a.txt"])).unwrap();
        vcs.commit("a").unwrap();

        assert_eq!(vcs.get_untracked_files().unwrap(), vec!["b.txt"]);
        assert!(vcs.get_unstaged_files().unwrap().is_empty());

        fs.write(Path::new("/repo/a.txt"), b"a2").unwrap();
        assert_eq!(vcs.get_unstaged_files().unwrap(), vec!["a.txt"]);

        vcs.restore("HEAD", &files(&["a.txt"])).unwrap();
        assert_eq!(fs.read(Path::new("/repo/a.txt")).unwrap(), b"a");
        assert!(vcs.restore("HEAD", &files(&["b.txt"])).is_err());
        assert_eq!(vcs.show_file("HEAD", "b.txt").unwrap(), None);
    }

    #[test]
    fn deletion_and_soft_reset() {
        let (fs, vcs) = setup();
        fs.write(Path::new("/repo/a.txt"), b"a").unwrap();
        vcs.add(&files(&["a.txt"])).unwrap();
        let first = vcs.commit("first").unwrap();

        fs.remove_file(Path::new("/repo/a.txt")).unwrap();
        assert!(vcs.is_tracked("a.txt").unwrap());
        vcs.add(&files(&["a.txt"])).unwrap();
        assert!(!vcs.is_tracked("a.txt").unwrap());
        let second = vcs.commit("second").unwrap();
        assert_eq!(vcs.get_commit_parent(&second).unwrap(), Some(first.clone()));

        vcs.soft_reset(&first).unwrap();
        assert_eq!(vcs.get_commit_message("HEAD").unwrap(), "first");
        // Index still holds the deletion.
        let third = vcs.commit("squashed").unwrap();
        assert_eq!(vcs.get_commit_parent(&third).unwrap(), Some(first));
        assert_eq!(vcs.show_file(&third, "a.txt").unwrap(), None);
    }
}
