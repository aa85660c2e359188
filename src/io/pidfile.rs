//! PID file management for single-instance enforcement.
//!
//! The PID file is opened without truncation and locked with `flock` (via
//! `fs2`) before anything is written, so a file left behind by a crashed
//! instance is simply taken over: the kernel drops the dead process's lock.
//! The file is removed again when the [`PidFile`] is dropped.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::utils::{is_process_running, private_path};

/// An acquired, locked PID file.
#[derive(Debug)]
pub struct PidFile {
    file: File,
    path: PathBuf,
}

fn open_pid_file(path: &Path) -> Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .with_context(|| format!("Failed to open PID file {}", private_path(path)))
}

impl PidFile {
    /// Lock `path` and write the current PID into it.
    ///
    /// Fails when another live process holds the lock.
    pub fn acquire(path: &Path) -> Result<Self> {
        let mut file = open_pid_file(path)?;

        if file.try_lock_exclusive().is_err() {
            handle_lock_conflict(path)?;

            // The holder went away between our attempts
            file = open_pid_file(path)?;
            file.try_lock_exclusive().with_context(|| {
                format!(
                    "Failed to lock PID file {} after cleanup attempt",
                    private_path(path)
                )
            })?;
        }

        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        writeln!(&file, "{}", std::process::id())?;
        file.flush()?;

        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
        let _ = FileExt::unlock(&self.file);
    }
}

/// Decide what to do when the PID file is already locked.
///
/// Returns `Ok(())` only when the recorded process is gone.
fn handle_lock_conflict(path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(path).unwrap_or_default();

    match content.trim().parse::<u32>() {
        Ok(pid) if is_process_running(pid) => {
            anyhow::bail!(
                "duskglow is already running (PID {pid}, {})",
                private_path(path)
            )
        }
        Ok(pid) => {
            log_warning!("Removing stale PID file (process {pid} no longer running)");
            let _ = std::fs::remove_file(path);
            Ok(())
        }
        Err(_) => anyhow::bail!(
            "PID file {} is locked by another process",
            private_path(path)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_acquire_writes_pid_and_removes_on_drop() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("duskglow.pid");

        let pid_file = PidFile::acquire(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim(), std::process::id().to_string());
        assert_eq!(pid_file.path(), path.as_path());

        drop(pid_file);
        assert!(!path.exists());
    }

    #[test]
    fn test_second_instance_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("duskglow.pid");

        let _held = PidFile::acquire(&path).unwrap();
        let err = PidFile::acquire(&path).unwrap_err();
        assert!(err.to_string().contains("already running"));
    }

    #[test]
    fn test_unlocked_leftover_file_is_taken_over() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("duskglow.pid");
        std::fs::write(&path, "999999999\nleftover\n").unwrap();

        let _pid_file = PidFile::acquire(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, format!("{}\n", std::process::id()));
    }

    #[test]
    fn test_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("duskglow.pid");
        assert!(PidFile::acquire(&path).is_err());
    }
}
