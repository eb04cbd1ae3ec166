use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;
use visa_scout::config::ScoutConfig;
use visa_scout::error::AppError;
use visa_scout::workflows::scout::{
    parse_timestamp, ApplicationStore, JlptLevel, JobCatalog, JobId, JsonFileStore,
    LastApplication, StoreError, VisaKind,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicationStore {
    last_application: Arc<Mutex<Option<LastApplication>>>,
    applied_jobs: Arc<Mutex<Vec<JobId>>>,
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("in-memory store mutex poisoned".to_string())
}

impl ApplicationStore for InMemoryApplicationStore {
    fn save_last_application(&self, application: &LastApplication) -> Result<(), StoreError> {
        let mut guard = self.last_application.lock().map_err(poisoned)?;
        *guard = Some(application.clone());
        Ok(())
    }

    fn last_application(&self) -> Result<Option<LastApplication>, StoreError> {
        let guard = self.last_application.lock().map_err(poisoned)?;
        Ok(guard.clone())
    }

    fn applied_jobs(&self) -> Result<Vec<JobId>, StoreError> {
        let guard = self.applied_jobs.lock().map_err(poisoned)?;
        Ok(guard.clone())
    }

    fn append_applied_job(&self, job_id: &JobId) -> Result<bool, StoreError> {
        let mut guard = self.applied_jobs.lock().map_err(poisoned)?;
        if guard.contains(job_id) {
            return Ok(false);
        }
        guard.push(job_id.clone());
        Ok(true)
    }
}

/// Store selected at startup: a directory of JSON documents when one is
/// configured, process memory otherwise.
pub(crate) enum ScoutStore {
    Memory(InMemoryApplicationStore),
    File(JsonFileStore),
}

impl ScoutStore {
    pub(crate) fn from_config(config: &ScoutConfig) -> Result<Self, AppError> {
        match &config.store_dir {
            Some(dir) => {
                let store = JsonFileStore::open(dir)?;
                info!(store_dir = %dir.display(), "using file-backed application store");
                Ok(Self::File(store))
            }
            None => {
                info!("using in-memory application store");
                Ok(Self::Memory(InMemoryApplicationStore::default()))
            }
        }
    }

    fn inner(&self) -> &dyn ApplicationStore {
        match self {
            ScoutStore::Memory(store) => store,
            ScoutStore::File(store) => store,
        }
    }
}

impl ApplicationStore for ScoutStore {
    fn save_last_application(&self, application: &LastApplication) -> Result<(), StoreError> {
        self.inner().save_last_application(application)
    }

    fn last_application(&self) -> Result<Option<LastApplication>, StoreError> {
        self.inner().last_application()
    }

    fn applied_jobs(&self) -> Result<Vec<JobId>, StoreError> {
        self.inner().applied_jobs()
    }

    fn append_applied_job(&self, job_id: &JobId) -> Result<bool, StoreError> {
        self.inner().append_applied_job(job_id)
    }
}

/// Load the configured catalog, falling back to the bundled demo postings.
pub(crate) fn load_catalog(path: Option<&Path>) -> Result<JobCatalog, AppError> {
    match path {
        Some(path) => {
            let catalog = JobCatalog::from_path(path)?;
            info!(path = %path.display(), jobs = catalog.len(), "loaded job catalog");
            Ok(catalog)
        }
        None => Ok(JobCatalog::standard()),
    }
}

pub(crate) fn parse_instant(raw: &str) -> Result<DateTime<Utc>, String> {
    parse_timestamp(raw)
        .ok_or_else(|| format!("failed to parse '{raw}' as an RFC 3339 timestamp or YYYY-MM-DD"))
}

pub(crate) fn parse_visa_kind(raw: &str) -> Result<VisaKind, String> {
    let kind = VisaKind::parse(raw);
    if kind.is_recognized() {
        Ok(kind)
    } else {
        let known: Vec<&str> = VisaKind::RECOGNIZED.iter().map(|kind| kind.key()).collect();
        Err(format!(
            "unknown visa kind '{raw}' (expected one of {})",
            known.join(", ")
        ))
    }
}

pub(crate) fn parse_jlpt(raw: &str) -> Result<JlptLevel, String> {
    match JlptLevel::parse(raw) {
        JlptLevel::Unrecognized => Err(format!(
            "unknown JLPT level '{raw}' (expected none or N1-N5)"
        )),
        level => Ok(level),
    }
}

pub(crate) fn deserialize_optional_instant<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|value| parse_instant(&value).map_err(serde::de::Error::custom))
        .transpose()
}
