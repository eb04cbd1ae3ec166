use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::scout::catalog::JobCatalog;
use crate::workflows::scout::domain::{
    ApplicationSnapshot, ApplicationSubmission, JlptLevel, JobId, JobPosting, LastApplication,
    VisaKind,
};
use crate::workflows::scout::matching::FixedClock;
use crate::workflows::scout::store::{ApplicationStore, StoreError};
use crate::workflows::scout::{scout_router, ScoutService};

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0)
        .single()
        .expect("valid instant")
}

pub(super) fn clock() -> FixedClock {
    FixedClock(now())
}

/// RFC 3339 timestamp `days` before [`now`]; negative values land in the future.
pub(super) fn days_ago(days: i64) -> String {
    (now() - Duration::days(days)).to_rfc3339()
}

pub(super) fn skilled_n2() -> ApplicationSnapshot {
    ApplicationSnapshot::new(VisaKind::SkilledWorker, JlptLevel::N2)
}

pub(super) fn posting(id: &str, visa_kind: VisaKind, jlpt: JlptLevel) -> JobPosting {
    JobPosting::new(id, format!("Title {id}"), "Sakura Systems", visa_kind, jlpt)
}

pub(super) fn submission() -> ApplicationSubmission {
    let mut submission = ApplicationSubmission::new(VisaKind::SkilledWorker, JlptLevel::N2);
    submission.name = "Nguyen Van A".to_string();
    submission.nationality = "VN".to_string();
    submission.passport_number = "C1234567".to_string();
    submission
        .dynamic_fields
        .insert("所属機関名".to_string(), "株式会社サクラペイ".to_string());
    submission
}

/// Three postings: an exact match posted today, a near match posted a week
/// ago, and a posting nobody with N2 + skilled-worker should see.
pub(super) fn catalog() -> JobCatalog {
    JobCatalog::new(vec![
        posting("job-exact", VisaKind::SkilledWorker, JlptLevel::N2).posted_on(days_ago(0)),
        posting("job-near", VisaKind::Student, JlptLevel::N3).posted_on(days_ago(7)),
        posting("job-miss", VisaKind::Student, JlptLevel::N5),
    ])
    .expect("unique ids")
}

pub(super) type TestService = ScoutService<MemoryStore, FixedClock>;

pub(super) fn build_service() -> (TestService, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let service = ScoutService::new(store.clone(), Arc::new(catalog()), clock());
    (service, store)
}

pub(super) fn scout_router_with_service(service: TestService) -> axum::Router {
    scout_router(Arc::new(service))
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    last: Arc<Mutex<Option<LastApplication>>>,
    applied: Arc<Mutex<Vec<JobId>>>,
}

impl ApplicationStore for MemoryStore {
    fn save_last_application(&self, application: &LastApplication) -> Result<(), StoreError> {
        *self.last.lock().expect("store mutex poisoned") = Some(application.clone());
        Ok(())
    }

    fn last_application(&self) -> Result<Option<LastApplication>, StoreError> {
        Ok(self.last.lock().expect("store mutex poisoned").clone())
    }

    fn applied_jobs(&self) -> Result<Vec<JobId>, StoreError> {
        Ok(self.applied.lock().expect("store mutex poisoned").clone())
    }

    fn append_applied_job(&self, job_id: &JobId) -> Result<bool, StoreError> {
        let mut applied = self.applied.lock().expect("store mutex poisoned");
        if applied.contains(job_id) {
            return Ok(false);
        }
        applied.push(job_id.clone());
        Ok(true)
    }
}

pub(super) struct UnavailableStore;

impl ApplicationStore for UnavailableStore {
    fn save_last_application(&self, _application: &LastApplication) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("storage offline".to_string()))
    }

    fn last_application(&self) -> Result<Option<LastApplication>, StoreError> {
        Err(StoreError::Unavailable("storage offline".to_string()))
    }

    fn applied_jobs(&self) -> Result<Vec<JobId>, StoreError> {
        Err(StoreError::Unavailable("storage offline".to_string()))
    }

    fn append_applied_job(&self, _job_id: &JobId) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("storage offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
