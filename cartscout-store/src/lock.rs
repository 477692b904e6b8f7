use cartscout_common::StoreError;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant, SystemTime};
use tracing::{debug, warn};

/// A lock file older than this belongs to a process that died holding it.
pub const STALE_AFTER: Duration = Duration::from_secs(60);

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Exclusive hold on one site document, released on drop.
#[derive(Debug)]
pub struct SiteLock {
    path: PathBuf,
}

impl SiteLock {
    /// `<document>.lock` next to the document.
    pub fn path_for(document: &Path) -> PathBuf {
        let mut name = document.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    /// Create the lock file, polling until `timeout` while another holder has it.
    pub fn acquire(document: &Path, timeout: Duration) -> Result<Self, StoreError> {
        let path = Self::path_for(document);
        let started = Instant::now();
        loop {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    let stamp = format!(
                        "pid={} at={}\n",
                        std::process::id(),
                        chrono::Utc::now().to_rfc3339()
                    );
                    if let Err(err) = file.write_all(stamp.as_bytes()) {
                        debug!(
                            target: "store.lock",
                            path = %path.display(),
                            error = %err,
                            "failed to stamp lock file"
                        );
                    }
                    debug!(target: "store.lock", path = %path.display(), "lock acquired");
                    return Ok(Self { path });
                }
                Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                    if is_stale(&path) {
                        reclaim_stale(&path)?;
                        continue;
                    }
                    if started.elapsed() >= timeout {
                        return Err(StoreError::LockTimeout {
                            path,
                            waited: started.elapsed(),
                        });
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(err) => return Err(StoreError::io(&path, err)),
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SiteLock {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_file(&self.path) {
            warn!(
                target: "store.lock",
                path = %self.path.display(),
                error = %err,
                "failed to release lock file"
            );
        }
    }
}

/// Move a stale lock aside before deleting it, so a lock freshly taken by
/// another process between the staleness check and the removal survives.
fn reclaim_stale(path: &Path) -> Result<(), StoreError> {
    let mut parked = path.as_os_str().to_owned();
    parked.push(format!(
        ".stale-{}-{}",
        std::process::id(),
        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map_or(0, |d| d.as_nanos())
    ));
    let parked = PathBuf::from(parked);

    match fs::rename(path, &parked) {
        Ok(()) => {}
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(StoreError::io(path, err)),
    }

    if is_stale(&parked) {
        warn!(
            target: "store.lock.stale_removed",
            path = %path.display(),
            "removing abandoned lock file"
        );
    } else if let Err(err) = fs::hard_link(&parked, path) {
        // Someone already holds a new lock at `path`; theirs wins.
        debug!(
            target: "store.lock",
            path = %path.display(),
            error = %err,
            "could not restore a live lock file"
        );
    }
    fs::remove_file(&parked).map_err(|err| StoreError::io(&parked, err))
}

fn is_stale(path: &Path) -> bool {
    fs::metadata(path)
        .and_then(|meta| meta.modified())
        .ok()
        .and_then(|modified| SystemTime::now().duration_since(modified).ok())
        .is_some_and(|age| age >= STALE_AFTER)
}
