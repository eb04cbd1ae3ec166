use super::common::*;
use crate::workflows::scout::catalog::JobCatalog;
use crate::workflows::scout::domain::{ApplicationSubmission, JlptLevel, JobId, VisaKind};
use crate::workflows::scout::matching::MatchReasonKind;
use crate::workflows::scout::store::{ApplicationStore, JsonFileStore, StoreError};
use crate::workflows::scout::{ScoutOutcome, ScoutService, ScoutServiceError};
use std::sync::Arc;

#[test]
fn recommendations_without_application_report_no_application() {
    let (service, _) = build_service();

    let outcome = service.recommendations().expect("store available");

    assert_eq!(outcome, ScoutOutcome::NoApplication);
}

#[test]
fn submit_persists_the_last_application() {
    let (service, store) = build_service();

    let application = service.submit(submission()).expect("submission stored");

    assert!(application.id.0.starts_with("app-"));
    assert_eq!(application.submitted_at, now());
    let stored = store
        .last_application()
        .expect("readable")
        .expect("application stored");
    assert_eq!(stored, application);
    assert_eq!(stored.submission.passport_number, "C1234567");
}

#[test]
fn later_submissions_replace_earlier_ones() {
    let (service, _) = build_service();

    let first = service.submit(submission()).expect("first submission");
    let second = service
        .submit(ApplicationSubmission::new(VisaKind::Student, JlptLevel::N5))
        .expect("second submission");

    assert_ne!(first.id, second.id);
    match service.recommendations().expect("ranked") {
        ScoutOutcome::Matched {
            application_id,
            evaluated_at,
            jobs,
        } => {
            assert_eq!(application_id, second.id);
            assert_eq!(evaluated_at, now());
            let top = &jobs[0].scored;
            assert_eq!(top.job.id, JobId::new("job-miss"));
            assert_eq!(top.score, 90);
        }
        other => panic!("expected matches, got {other:?}"),
    }
}

#[test]
fn recommendations_rank_against_the_last_application_and_flag_applied_jobs() {
    let (service, _) = build_service();
    service.submit(submission()).expect("submitted");
    service
        .apply(&JobId::new("job-near"))
        .expect("apply succeeds");

    let ScoutOutcome::Matched { jobs, .. } = service.recommendations().expect("ranked") else {
        panic!("expected matches");
    };

    let ranked: Vec<(&str, u8, bool)> = jobs
        .iter()
        .map(|job| (job.scored.job.id.0.as_str(), job.scored.score, job.applied))
        .collect();
    assert_eq!(
        ranked,
        vec![("job-exact", 100, false), ("job-near", 35, true)]
    );
}

#[test]
fn submitted_application_with_no_matches_is_distinct_from_no_application() {
    let store = Arc::new(MemoryStore::default());
    let service = ScoutService::new(store, Arc::new(JobCatalog::default()), clock());
    service.submit(submission()).expect("submitted");

    match service.recommendations().expect("ranked") {
        ScoutOutcome::Matched { jobs, .. } => assert!(jobs.is_empty()),
        other => panic!("expected empty matches, got {other:?}"),
    }
}

#[test]
fn apply_is_idempotent() {
    let (service, store) = build_service();

    let first = service.apply(&JobId::new("job-exact")).expect("first apply");
    let second = service.apply(&JobId::new("job-exact")).expect("second apply");

    assert!(!first.already_applied);
    assert!(second.already_applied);
    assert_eq!(
        store.applied_jobs().expect("readable"),
        vec![JobId::new("job-exact")]
    );
}

#[test]
fn apply_rejects_unknown_jobs() {
    let (service, store) = build_service();

    match service.apply(&JobId::new("job-404")) {
        Err(ScoutServiceError::UnknownJob(id)) => assert_eq!(id, JobId::new("job-404")),
        other => panic!("expected unknown job, got {other:?}"),
    }
    assert!(store.applied_jobs().expect("readable").is_empty());
}

#[test]
fn job_detail_includes_score_once_an_application_exists() {
    let (service, _) = build_service();

    let before = service
        .job_detail(&JobId::new("job-exact"))
        .expect("detail available");
    assert!(before.score.is_none());
    assert!(before.reasons.is_empty());

    service.submit(submission()).expect("submitted");
    service.apply(&JobId::new("job-exact")).expect("applied");
    let after = service
        .job_detail(&JobId::new("job-exact"))
        .expect("detail available");

    assert_eq!(after.score, Some(100));
    assert_eq!(after.reasons[0].kind, MatchReasonKind::JlptExact);
    assert!(after.applied);
}

#[test]
fn store_failures_propagate() {
    let service = ScoutService::new(Arc::new(UnavailableStore), Arc::new(catalog()), clock());

    assert!(matches!(
        service.submit(submission()),
        Err(ScoutServiceError::Store(StoreError::Unavailable(_)))
    ));
    assert!(matches!(
        service.recommendations(),
        Err(ScoutServiceError::Store(_))
    ));
    assert!(matches!(
        service.apply(&JobId::new("job-exact")),
        Err(ScoutServiceError::Store(_))
    ));
}

#[test]
fn concurrent_applies_to_every_standard_job_are_all_persisted() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(JsonFileStore::open(dir.path()).expect("store opens"));
    let catalog = Arc::new(JobCatalog::standard());
    let service = ScoutService::new(store.clone(), catalog.clone(), clock());

    std::thread::scope(|scope| {
        for job in catalog.iter() {
            let service = &service;
            scope.spawn(move || service.apply(&job.id).expect("applies"));
        }
    });

    let persisted = JsonFileStore::open(dir.path())
        .expect("store reopens")
        .applied_jobs()
        .expect("readable");
    assert_eq!(persisted.len(), catalog.len());
    assert!(catalog.iter().all(|job| persisted.contains(&job.id)));
}

#[test]
fn application_ids_continue_after_a_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let catalog = Arc::new(catalog());

    let first = {
        let store = Arc::new(JsonFileStore::open(dir.path()).expect("store opens"));
        let service = ScoutService::new(store, catalog.clone(), clock());
        service.submit(submission()).expect("first submission");
        service.submit(submission()).expect("second submission")
    };

    let store = Arc::new(JsonFileStore::open(dir.path()).expect("store reopens"));
    let service = ScoutService::new(store, catalog, clock());
    let next = service.submit(submission()).expect("submission after restart");

    assert_eq!(first.id.0, "app-000002");
    assert_eq!(next.id.0, "app-000003");
}

#[test]
fn job_detail_reports_the_instant_it_was_scored_at() {
    let (service, _) = build_service();
    service.submit(submission()).expect("submitted");

    let detail = service
        .job_detail(&JobId::new("job-near"))
        .expect("detail available");

    assert_eq!(detail.evaluated_at, now());
    assert_eq!(detail.score, Some(35));
}
