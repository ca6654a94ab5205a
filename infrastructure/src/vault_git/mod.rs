//! Vault git coordinator
//!
//! Stages, commits and pushes changes under the vault directory. The vault
//! may be a subdirectory of a larger repository, so status and staging are
//! scoped to it. The whole sequence runs under [`VaultGitLock`], shared with
//! any other process working on the same repository.

pub mod lock;

pub use lock::VaultGitLock;

use async_trait::async_trait;
use dbrain_application::ports::vault_persistence::{CommitOutcome, VaultPersistence};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tracing::{debug, error, info};

const LOCK_FILE_IN_GIT_DIR: &str = "vault-git-ops.lock";
const LOCK_FILE_IN_VAULT: &str = ".git-ops.lock";

#[derive(Debug, Clone)]
pub struct VaultGit {
    vault_path: PathBuf,
    extra_env: Vec<(String, String)>,
}

impl VaultGit {
    pub fn new(vault_path: impl Into<PathBuf>) -> Self {
        let vault_path = vault_path.into();
        let vault_path = std::fs::canonicalize(&vault_path).unwrap_or(vault_path);
        Self {
            vault_path,
            extra_env: Vec::new(),
        }
    }

    /// Extra environment for every git invocation
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_env.push((key.into(), value.into()));
        self
    }

    fn git(&self, cwd: &Path, args: &[&str]) -> std::io::Result<Output> {
        debug!(cwd = %cwd.display(), ?args, "git");
        Command::new("git")
            .args(args)
            .current_dir(cwd)
            .env("GIT_DISCOVERY_ACROSS_FILESYSTEM", "1")
            .envs(self.extra_env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .output()
    }

    /// Run git in the repository root; failures carry stderr.
    fn run(&self, root: &Path, args: &[&str]) -> Result<String, String> {
        let step = args.first().copied().unwrap_or("git");
        match self.git(root, args) {
            Ok(output) if output.status.success() => {
                Ok(String::from_utf8_lossy(&output.stdout).into_owned())
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let stderr = stderr.trim();
                Err(format!(
                    "git {} failed: {}",
                    step,
                    if stderr.is_empty() { "unknown error" } else { stderr }
                ))
            }
            Err(e) => Err(format!("git {} could not run: {}", step, e)),
        }
    }

    /// Top level of the repository containing the vault
    pub fn repo_root(&self) -> Option<PathBuf> {
        let output = match self.git(&self.vault_path, &["rev-parse", "--show-toplevel"]) {
            Ok(output) => output,
            Err(e) => {
                error!("Git executable not available: {}", e);
                return None;
            }
        };
        if !output.status.success() {
            error!(
                vault = %self.vault_path.display(),
                "Could not detect git repository: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return None;
        }
        let root = PathBuf::from(String::from_utf8_lossy(&output.stdout).trim());
        std::fs::canonicalize(&root).ok()
    }

    /// Vault path relative to `root`, or `.` when they coincide
    fn scope(&self, root: &Path) -> String {
        match self.vault_path.strip_prefix(root) {
            Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
            Ok(rel) => rel.to_string_lossy().replace('\\', "/"),
            Err(_) => ".".to_string(),
        }
    }

    fn lock_path(&self, root: &Path) -> PathBuf {
        let git_dir = root.join(".git");
        if git_dir.is_dir() {
            git_dir.join(LOCK_FILE_IN_GIT_DIR)
        } else {
            self.vault_path.join(LOCK_FILE_IN_VAULT)
        }
    }

    /// Stage, commit and push the vault; `true` on commit+push or nothing to do.
    pub fn commit_and_push(&self, message: &str) -> bool {
        self.commit_and_push_detailed(message).is_success()
    }

    pub fn commit_and_push_detailed(&self, message: &str) -> CommitOutcome {
        let Some(root) = self.repo_root() else {
            return CommitOutcome::Failed(format!(
                "No git repository for vault {}",
                self.vault_path.display()
            ));
        };

        let _lock = match VaultGitLock::acquire(&self.lock_path(&root)) {
            Ok(lock) => lock,
            Err(e) => {
                error!("Could not acquire vault git lock: {}", e);
                return CommitOutcome::Failed(format!("Could not acquire git lock: {}", e));
            }
        };

        let outcome = self.commit_and_push_locked(&root, message);
        match &outcome {
            CommitOutcome::Committed => info!(commit_message = message, "Committed and pushed vault"),
            CommitOutcome::NoChanges => info!("No vault changes to commit"),
            CommitOutcome::Failed(reason) => error!("Vault sync failed: {}", reason),
        }
        outcome
    }

    fn commit_and_push_locked(&self, root: &Path, message: &str) -> CommitOutcome {
        let scope = self.scope(root);

        let status = match self.run(root, &["status", "--porcelain", "--", &scope]) {
            Ok(status) => status,
            Err(e) => return CommitOutcome::Failed(e),
        };
        if status.trim().is_empty() {
            return CommitOutcome::NoChanges;
        }

        let steps: [&[&str]; 3] = [
            &["add", "-A", "--", &scope],
            &["commit", "-m", message, "--", &scope],
            &["push"],
        ];
        for args in steps {
            if let Err(e) = self.run(root, args) {
                return CommitOutcome::Failed(e);
            }
        }
        CommitOutcome::Committed
    }
}

#[async_trait]
impl VaultPersistence for VaultGit {
    async fn commit_and_push(&self, message: &str) -> CommitOutcome {
        let git = self.clone();
        let message = message.to_string();
        tokio::task::spawn_blocking(move || git.commit_and_push_detailed(&message))
            .await
            .unwrap_or_else(|e| CommitOutcome::Failed(format!("Git task failed: {}", e)))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        remote: PathBuf,
        work: PathBuf,
        vault: PathBuf,
    }

    fn sh_git(cwd: &Path, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(args)
            .current_dir(cwd)
            .env("GIT_CONFIG_GLOBAL", "/dev/null")
            .env("GIT_CONFIG_NOSYSTEM", "1")
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "git {:?}: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).into_owned()
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let remote = root.join("remote.git");
        let work = root.join("work");
        let vault = work.join("vault");
        fs::create_dir_all(&vault).unwrap();

        sh_git(&root, &["init", "--bare", "-q", remote.to_str().unwrap()]);
        sh_git(&work, &["init", "-q"]);
        sh_git(&work, &["config", "user.name", "dbrain"]);
        sh_git(&work, &["config", "user.email", "dbrain@example.com"]);
        sh_git(&work, &["remote", "add", "origin", remote.to_str().unwrap()]);
        fs::write(vault.join("README.md"), "vault\n").unwrap();
        sh_git(&work, &["add", "-A"]);
        sh_git(&work, &["commit", "-q", "-m", "init"]);
        sh_git(&work, &["push", "-q", "-u", "origin", "HEAD"]);

        Fixture {
            _dir: dir,
            remote,
            work,
            vault,
        }
    }

    fn vault_git(path: &Path) -> VaultGit {
        let ceiling = path
            .ancestors()
            .nth(2)
            .unwrap_or(Path::new("/"))
            .display()
            .to_string();
        VaultGit::new(path)
            .with_env("GIT_CONFIG_GLOBAL", "/dev/null")
            .with_env("GIT_CONFIG_NOSYSTEM", "1")
            .with_env("GIT_CEILING_DIRECTORIES", ceiling)
    }

    fn remote_head_subject(remote: &Path) -> String {
        sh_git(remote, &["log", "-1", "--format=%s"]).trim().to_string()
    }

    #[test]
    fn test_no_changes() {
        let fx = fixture();
        let git = vault_git(&fx.vault);
        assert_eq!(git.commit_and_push_detailed("chore: nothing"), CommitOutcome::NoChanges);
        assert!(git.commit_and_push("chore: nothing"));
        assert_eq!(remote_head_subject(&fx.remote), "init");
    }

    #[test]
    fn test_commit_and_push_scoped_to_vault() {
        let fx = fixture();
        fs::create_dir_all(fx.vault.join("daily")).unwrap();
        fs::write(fx.vault.join("daily/2026-02-10.md"), "- note\n").unwrap();
        fs::write(fx.work.join("outside.txt"), "not mine\n").unwrap();

        let git = vault_git(&fx.vault);
        assert_eq!(
            git.commit_and_push_detailed("chore: process daily 2026-02-10"),
            CommitOutcome::Committed
        );
        assert_eq!(remote_head_subject(&fx.remote), "chore: process daily 2026-02-10");

        let status = sh_git(&fx.work, &["status", "--porcelain"]);
        assert_eq!(status.trim(), "?? outside.txt");
    }

    #[test]
    fn test_lock_lives_in_git_dir() {
        let fx = fixture();
        let git = vault_git(&fx.vault);
        let root = git.repo_root().unwrap();
        assert_eq!(root, fx.work);
        assert_eq!(git.lock_path(&root), fx.work.join(".git/vault-git-ops.lock"));
        assert_eq!(git.scope(&root), "vault");
    }

    #[test]
    fn test_missing_repository() {
        let dir = TempDir::new().unwrap();
        let vault = dir.path().join("vault");
        fs::create_dir_all(&vault).unwrap();
        fs::write(vault.join("a.md"), "x").unwrap();

        let git = vault_git(&vault);
        assert!(git.repo_root().is_none());
        assert!(!git.commit_and_push("chore: process request"));
    }

    #[test]
    fn test_unreachable_remote_fails() {
        let fx = fixture();
        sh_git(
            &fx.work,
            &["remote", "set-url", "origin", "/nonexistent/remote.git"],
        );
        fs::write(fx.vault.join("a.md"), "x").unwrap();

        let outcome = vault_git(&fx.vault).commit_and_push_detailed("chore: process request");
        match outcome {
            CommitOutcome::Failed(reason) => assert!(reason.starts_with("git push failed")),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_concurrent_commits_serialize() {
        let fx = fixture();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let vault = fx.vault.clone();
                std::thread::spawn(move || {
                    fs::write(vault.join(format!("note-{i}.md")), format!("{i}\n")).unwrap();
                    vault_git(&vault).commit_and_push_detailed(&format!("chore: note {i}"))
                })
            })
            .collect();
        let outcomes: Vec<CommitOutcome> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(outcomes.iter().all(CommitOutcome::is_success), "{outcomes:?}");
        let committed = outcomes
            .iter()
            .filter(|o| **o == CommitOutcome::Committed)
            .count();
        assert!(committed >= 1);

        let count: usize = sh_git(&fx.remote, &["rev-list", "--count", "HEAD"])
            .trim()
            .parse()
            .unwrap();
        assert_eq!(count, 1 + committed);
        assert!(sh_git(&fx.work, &["status", "--porcelain"]).trim().is_empty());
        sh_git(&fx.work, &["fsck", "--no-progress"]);
    }

    #[tokio::test]
    async fn test_persistence_port() {
        let fx = fixture();
        fs::write(fx.vault.join("weekly.md"), "digest\n").unwrap();
        let outcome = VaultPersistence::commit_and_push(&vault_git(&fx.vault), "chore: weekly digest").await;
        assert_eq!(outcome, CommitOutcome::Committed);
        assert_eq!(remote_head_subject(&fx.remote), "chore: weekly digest");
    }
}
