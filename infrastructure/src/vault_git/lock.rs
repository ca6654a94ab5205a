//! Advisory file lock serializing git mutations across processes.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Exclusive `flock` on a lock file, released on drop.
///
/// Acquisition blocks until the holder releases it.
#[derive(Debug)]
pub struct VaultGitLock {
    file: File,
    path: PathBuf,
}

impl VaultGitLock {
    pub fn acquire(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        lock_exclusive(&file)?;
        debug!(path = %path.display(), "Acquired vault git lock");
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }
}

impl Drop for VaultGitLock {
    fn drop(&mut self) {
        unlock(&self.file);
        debug!(path = %self.path.display(), "Released vault git lock");
    }
}

#[cfg(unix)]
fn lock_exclusive(file: &File) -> io::Result<()> {
    use std::os::unix::io::AsRawFd;
    loop {
        if unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX) } == 0 {
            return Ok(());
        }
        let err = io::Error::last_os_error();
        if err.kind() != io::ErrorKind::Interrupted {
            return Err(err);
        }
    }
}

#[cfg(unix)]
fn unlock(file: &File) {
    use std::os::unix::io::AsRawFd;
    unsafe {
        libc::flock(file.as_raw_fd(), libc::LOCK_UN);
    }
}

// No cross-process serialization off unix.
#[cfg(not(unix))]
fn lock_exclusive(_file: &File) -> io::Result<()> {
    Ok(())
}

#[cfg(not(unix))]
fn unlock(_file: &File) {}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_second_acquire_blocks_until_release() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".git/vault-git-ops.lock");

        let first = VaultGitLock::acquire(&path).unwrap();
        assert!(path.exists());

        let (tx, rx) = mpsc::channel();
        let contender = path.clone();
        let handle = std::thread::spawn(move || {
            let _lock = VaultGitLock::acquire(&contender).unwrap();
            tx.send(()).unwrap();
        });

        assert!(rx.recv_timeout(Duration::from_millis(300)).is_err());
        drop(first);
        rx.recv_timeout(Duration::from_secs(5)).unwrap();
        handle.join().unwrap();
    }
}
