use super::Vcs;
use crate::config::VcsConfig;
use crate::error::{MissionError, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// [`Vcs`] backed by the `git` binary, run with the project root as cwd.
#[derive(Debug, Clone)]
pub struct GitClient {
    binary: PathBuf,
    root: PathBuf,
    tagger_name: String,
    tagger_email: String,
}

impl GitClient {
    /// Resolve the configured binary on `PATH`.
    pub fn new(root: &Path, config: &VcsConfig) -> Result<Self> {
        let binary = which::which(&config.binary)
            .map_err(|_| MissionError::VcsUnavailable(config.binary.clone()))?;
        Ok(Self {
            binary,
            root: root.to_path_buf(),
            tagger_name: config.tagger_name.clone(),
            tagger_email: config.tagger_email.clone(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn output(&self, args: &[&str]) -> Result<Output> {
        tracing::debug!(?args, "git");
        let output = Command::new(&self.binary)
            .current_dir(&self.root)
            .args(args)
            .output()?;
        Ok(output)
    }

    /// Run and require success, returning raw stdout.
    fn run_bytes(&self, args: &[&str]) -> Result<Vec<u8>> {
        let output = self.output(args)?;
        if !output.status.success() {
            return Err(MissionError::Vcs {
                command: format!("git {}", args.join(" ")),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output.stdout)
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        let stdout = self.run_bytes(args)?;
        Ok(String::from_utf8_lossy(&stdout).trim_end().to_string())
    }

    fn run_lines(&self, args: &[&str]) -> Result<Vec<String>> {
        Ok(self
            .run(args)?
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Exit status only; a non-zero exit is an answer, not an error.
    fn succeeds(&self, args: &[&str]) -> Result<bool> {
        Ok(self.output(args)?.status.success())
    }
}

fn with_files<'a>(head: &[&'a str], files: &'a [String]) -> Vec<&'a str> {
    let mut args = head.to_vec();
    args.push("--");
    args.extend(files.iter().map(String::as_str));
    args
}

impl Vcs for GitClient {
    fn add(&self, files: &[String]) -> Result<()> {
        if files.is_empty() {
            return Ok(());
        }
        self.run(&with_files(&["add", "-A"], files))?;
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<String> {
        if self.succeeds(&["diff", "--cached", "--quiet"])? {
            return Err(MissionError::NoChanges);
        }
        self.run(&["-c", "commit.gpgSign=false", "commit", "-q", "-m", message])?;
        self.head_commit()
    }

    fn create_tag(&self, name: &str, hash: &str) -> Result<()> {
        let user_name = format!("user.name={}", self.tagger_name);
        let user_email = format!("user.email={}", self.tagger_email);
        self.run(&[
            "-c",
            &user_name,
            "-c",
            &user_email,
            "-c",
            "tag.gpgSign=false",
            "tag",
            "-a",
            name,
            hash,
            "-m",
            name,
        ])?;
        Ok(())
    }

    fn restore(&self, reference: &str, files: &[String]) -> Result<()> {
        if files.is_empty() {
            return Ok(());
        }
        self.run(&with_files(&["checkout", reference], files))?;
        Ok(())
    }

    fn list_tags(&self, prefix: &str) -> Result<Vec<String>> {
        let pattern = format!("{prefix}*");
        let mut tags: Vec<String> = self
            .run_lines(&["tag", "--list", &pattern])?
            .into_iter()
            .filter(|t| t.starts_with(prefix))
            .collect();
        tags.sort();
        Ok(tags)
    }

    fn delete_tag(&self, name: &str) -> Result<()> {
        self.run(&["tag", "-d", name])?;
        Ok(())
    }

    fn get_tag_commit(&self, name: &str) -> Result<String> {
        let spec = format!("refs/tags/{name}^{{commit}}");
        self.run(&["rev-parse", "--verify", "--quiet", &spec])
            .map_err(|_| MissionError::RefNotFound(name.to_string()))
    }

    fn soft_reset(&self, hash: &str) -> Result<()> {
        self.run(&["reset", "--soft", hash])?;
        Ok(())
    }

    fn get_commit_message(&self, reference: &str) -> Result<String> {
        self.run(&["log", "-1", "--format=%B", reference])
    }

    fn is_tracked(&self, path: &str) -> Result<bool> {
        self.succeeds(&["ls-files", "--error-unmatch", "--", path])
    }

    fn get_commit_parent(&self, hash: &str) -> Result<Option<String>> {
        let spec = format!("{hash}^");
        let output = self.output(&["rev-parse", "--verify", "--quiet", &spec])?;
        if !output.status.success() {
            return Ok(None);
        }
        let parent = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok((!parent.is_empty()).then_some(parent))
    }

    fn get_unstaged_files(&self) -> Result<Vec<String>> {
        self.run_lines(&["diff", "--name-only"])
    }

    fn get_untracked_files(&self) -> Result<Vec<String>> {
        self.run_lines(&["ls-files", "--others", "--exclude-standard"])
    }

    fn head_commit(&self) -> Result<String> {
        self.run(&["rev-parse", "HEAD"])
            .map_err(|_| MissionError::RefNotFound("HEAD".to_string()))
    }

    /// `path` is read relative to the project root, which may sit below
    /// the repository root.
    fn show_file(&self, reference: &str, path: &str) -> Result<Option<Vec<u8>>> {
        let object = format!("{reference}:./{path}");
        if !self.succeeds(&["cat-file", "-e", &object])? {
            return Ok(None);
        }
        Ok(Some(self.run_bytes(&["show", &object])?))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn git_available() -> bool {
        which::which("git").is_ok()
    }

    fn init_repo() -> (TempDir, GitClient) {
        let dir = TempDir::new().unwrap();
        let git = GitClient::new(dir.path(), &VcsConfig::default()).unwrap();
        git.run(&["init", "-q"]).unwrap();
        git.run(&["config", "user.name", "Test"]).unwrap();
        git.run(&["config", "user.email", "test@example.com"]).unwrap();
        (dir, git)
    }

    fn files(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn missing_binary_is_unavailable() {
        let config = VcsConfig {
            binary: "definitely-not-a-vcs-binary".to_string(),
            ..VcsConfig::default()
        };
        assert!(matches!(
            GitClient::new(Path::new("."), &config),
            Err(MissionError::VcsUnavailable(_))
        ));
    }

    #[test]
    fn commit_tag_and_read_back() {
        if !git_available() {
            return;
        }
        let (dir, git) = init_repo();
        std::fs::write(dir.path().join("f.txt"), "v1").unwrap();
        assert!(!git.is_tracked("f.txt").unwrap());
        assert_eq!(git.get_untracked_files().unwrap(), vec!["f.txt"]);

        git.add(&files(&["f.txt"])).unwrap();
        let first = git.commit("checkpoint: M-1").unwrap();
        assert_eq!(git.head_commit().unwrap(), first);
        assert!(git.is_tracked("f.txt").unwrap());
        assert_eq!(git.get_commit_parent(&first).unwrap(), None);
        assert!(matches!(git.commit("again"), Err(MissionError::NoChanges)));

        git.create_tag("M-1", &first).unwrap();
        git.create_tag("M-baseline", &first).unwrap();
        assert_eq!(git.list_tags("M-").unwrap(), vec!["M-1", "M-baseline"]);
        assert_eq!(git.get_tag_commit("M-1").unwrap(), first);
        assert!(matches!(
            git.get_tag_commit("M-9"),
            Err(MissionError::RefNotFound(_))
        ));

        std::fs::write(dir.path().join("f.txt"), "v2").unwrap();
        assert_eq!(git.get_unstaged_files().unwrap(), vec!["f.txt"]);
        git.add(&files(&["f.txt"])).unwrap();
        let second = git.commit("second").unwrap();
        assert_eq!(git.get_commit_parent(&second).unwrap(), Some(first.clone()));
        assert_eq!(git.get_commit_message("HEAD").unwrap(), "second");

        assert_eq!(git.show_file("M-1", "f.txt").unwrap(), Some(b"v1".to_vec()));
        assert_eq!(git.show_file("M-1", "nope.txt").unwrap(), None);

        git.restore("M-1", &files(&["f.txt"])).unwrap();
        assert_eq!(std::fs::read_to_string(dir.path().join("f.txt")).unwrap(), "v1");

        git.soft_reset(&first).unwrap();
        assert_eq!(git.head_commit().unwrap(), first);

        git.delete_tag("M-1").unwrap();
        assert_eq!(git.list_tags("M-").unwrap(), vec!["M-baseline"]);
    }

    #[test]
    fn deleted_tracked_file_can_be_staged() {
        if !git_available() {
            return;
        }
        let (dir, git) = init_repo();
        std::fs::write(dir.path().join("gone.txt"), "x").unwrap();
        git.add(&files(&["gone.txt"])).unwrap();
        git.commit("add").unwrap();

        std::fs::remove_file(dir.path().join("gone.txt")).unwrap();
        assert!(git.is_tracked("gone.txt").unwrap());
        git.add(&files(&["gone.txt"])).unwrap();
        git.commit("remove").unwrap();
        assert!(!git.is_tracked("gone.txt").unwrap());
    }

    #[test]
    fn show_file_resolves_from_project_subdirectory() {
        if !git_available() {
            return;
        }
        let (dir, top) = init_repo();
        let sub = dir.path().join("sub");
        std::fs::create_dir_all(&sub).unwrap();
        std::fs::write(sub.join("f.txt"), "v1").unwrap();
        std::fs::write(dir.path().join("f.txt"), "top").unwrap();

        let git = GitClient::new(&sub, &VcsConfig::default()).unwrap();
        git.add(&files(&["f.txt"])).unwrap();
        let first = git.commit("checkpoint: M-1").unwrap();
        assert_eq!(git.show_file(&first, "f.txt").unwrap(), Some(b"v1".to_vec()));
        assert_eq!(git.show_file(&first, "nope.txt").unwrap(), None);
        assert!(git.is_tracked("f.txt").unwrap());
        assert!(!top.is_tracked("f.txt").unwrap());
    }
}
