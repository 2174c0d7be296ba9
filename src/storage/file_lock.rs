use std::fs::{File, OpenOptions};
use std::thread;
use std::time::{Duration, Instant};

use crate::core::error::{Error, Result};
use crate::storage::layout::StorageLayout;

/// Cross-process exclusion for the backing file. A companion `.lock` file is
/// opened and an OS advisory lock is taken on it with a bounded, polled
/// wait -- acquiring past the budget surfaces `LockTimeout` rather than
/// blocking forever. Shared locks (for reads) may stack across processes;
/// an exclusive lock (for writes) excludes everyone else. The lock releases
/// when this guard drops; on unix that also covers release-on-process-death,
/// so a stale lockfile never blocks future acquisitions.
pub struct FileLock {
    file: File,
}

impl FileLock {
    pub fn acquire(storage: &StorageLayout, exclusive: bool, wait: Duration, poll_interval: Duration) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .open(&storage.lock_path)
            .map_err(|e| Error::io_at(&storage.lock_path, e))?;

        let deadline = Instant::now() + wait;
        loop {
            if try_lock(&file, exclusive) {
                return Ok(FileLock { file });
            }
            if Instant::now() >= deadline {
                tracing::warn!(path = %storage.lock_path.display(), exclusive, ?wait, "timed out waiting for file lock");
                return Err(Error::lock_timeout(format!(
                    "could not acquire lock on {} within {:?}",
                    storage.lock_path.display(),
                    wait
                )));
            }
            thread::sleep(poll_interval);
        }
    }

    /// Best-effort cleanup of the lockfile itself. The advisory lock is
    /// released regardless (via `Drop`); removing the file is a courtesy
    /// so a long-lived directory doesn't accumulate them.
    pub fn remove(storage: &StorageLayout) {
        let _ = std::fs::remove_file(&storage.lock_path);
    }
}

#[cfg(unix)]
fn try_lock(file: &File, exclusive: bool) -> bool {
    use libc::{flock, LOCK_EX, LOCK_NB, LOCK_SH};
    use std::os::unix::io::AsRawFd;

    let fd = file.as_raw_fd();
    let op = if exclusive { LOCK_EX } else { LOCK_SH } | LOCK_NB;
    unsafe { flock(fd, op) == 0 }
}

#[cfg(not(unix))]
fn try_lock(_file: &File, _exclusive: bool) -> bool {
    true
}

impl Drop for FileLock {
    fn drop(&mut self) {
        #[cfg(unix)]
        {
            use libc::{flock, LOCK_UN};
            use std::os::unix::io::AsRawFd;

            let fd = self.file.as_raw_fd();
            unsafe {
                flock(fd, LOCK_UN);
            }
        }
    }
}
