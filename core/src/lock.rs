//! Single-sweep lock.
//!
//! The device can only serve one benchmark at a time, and two sweeps
//! sharing a results directory would interleave their journals and result
//! files. A `flock`-based lock file in the results directory extends the
//! one-sweep-at-a-time guarantee across processes. Advisory, Unix only.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

use crate::error::SweepError;

// ---------------------------------------------------------------------------
// SweepLock
// ---------------------------------------------------------------------------

/// Exclusive lock on a results directory, released on drop.
#[derive(Debug)]
pub struct SweepLock {
    file: File,
    path: PathBuf,
}

impl SweepLock {
    /// Standard lock path inside a results directory.
    pub fn path_in(results_dir: &Path) -> PathBuf {
        results_dir.join("sweep.lock")
    }

    /// Try to take the lock without blocking. On contention the error names
    /// the holding PID when the lock file records one.
    pub fn acquire(path: &Path) -> Result<SweepLock, SweepError> {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| {
                SweepError::Lock(format!(
                    "cannot create lock file {}: {}",
                    path.display(),
                    e
                ))
            })?;

        let ret = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
        if ret != 0 {
            let mut holder = String::new();
            let _ = file.read_to_string(&mut holder);
            let holder = holder.trim();
            let held_by = if holder.is_empty() {
                String::new()
            } else {
                format!(" (held by pid {})", holder)
            };
            return Err(SweepError::Lock(format!(
                "another sweep is running{}: {}",
                held_by,
                path.display()
            )));
        }

        // Record our PID for the next contender's error message.
        let _ = file.set_len(0);
        let _ = file.seek(SeekFrom::Start(0));
        let _ = write!(file, "{}", std::process::id());

        Ok(SweepLock {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SweepLock {
    fn drop(&mut self) {
        unsafe {
            libc::flock(self.file.as_raw_fd(), libc::LOCK_UN);
        }
        // Remove the lock file (best effort).
        let _ = std::fs::remove_file(&self.path);
    }
}
