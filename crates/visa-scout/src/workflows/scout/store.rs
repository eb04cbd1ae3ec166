use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use super::domain::{JobId, LastApplication};

const LAST_APPLICATION_FILE: &str = "lastApplication.json";
const APPLIED_JOBS_FILE: &str = "appliedJobs.json";

/// Storage abstraction for the last submitted application and applied job ids.
///
/// Scoring only ever reads through this trait; writes come from the
/// submission and apply actions.
pub trait ApplicationStore: Send + Sync {
    fn save_last_application(&self, application: &LastApplication) -> Result<(), StoreError>;
    fn last_application(&self) -> Result<Option<LastApplication>, StoreError>;
    fn applied_jobs(&self) -> Result<Vec<JobId>, StoreError>;
    /// Record a job id unless already present, as one atomic step.
    /// Returns `true` when the id was newly added.
    fn append_applied_job(&self, job_id: &JobId) -> Result<bool, StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// File-backed store keeping one JSON document per key inside a directory.
///
/// Unreadable documents are treated as absent, mirroring how a browser's
/// local storage entry that fails to parse is simply ignored.
#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read_document<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, StoreError> {
        let path = self.dir.join(name);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ignoring unreadable store document");
                Ok(None)
            }
        }
    }

    fn write_document<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(value)?;
        let path = self.dir.join(name);
        let staging = self.dir.join(format!("{name}.tmp"));
        fs::write(&staging, bytes)?;
        fs::rename(&staging, &path)?;
        Ok(())
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, ()>, StoreError> {
        self.lock
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
    }
}

impl ApplicationStore for JsonFileStore {
    fn save_last_application(&self, application: &LastApplication) -> Result<(), StoreError> {
        let _guard = self.guard()?;
        self.write_document(LAST_APPLICATION_FILE, application)
    }

    fn last_application(&self) -> Result<Option<LastApplication>, StoreError> {
        let _guard = self.guard()?;
        self.read_document(LAST_APPLICATION_FILE)
    }

    fn applied_jobs(&self) -> Result<Vec<JobId>, StoreError> {
        let _guard = self.guard()?;
        Ok(self
            .read_document::<Vec<JobId>>(APPLIED_JOBS_FILE)?
            .unwrap_or_default())
    }

    fn append_applied_job(&self, job_id: &JobId) -> Result<bool, StoreError> {
        let _guard = self.guard()?;
        let mut applied = self
            .read_document::<Vec<JobId>>(APPLIED_JOBS_FILE)?
            .unwrap_or_default();
        if applied.contains(job_id) {
            return Ok(false);
        }

        applied.push(job_id.clone());
        self.write_document(APPLIED_JOBS_FILE, &applied)?;
        Ok(true)
    }
}
