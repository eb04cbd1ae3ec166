use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use super::domain::{ApplicationId, ApplicationSubmission, JobId};
use super::matching::Clock;
use super::service::{ScoutOutcome, ScoutService, ScoutServiceError};
use super::store::ApplicationStore;
use super::views::{ApplicationView, JobCardView, JobDetailView, Language};

/// Router builder exposing the submission, ranking and apply endpoints.
pub fn scout_router<S, C>(service: Arc<ScoutService<S, C>>) -> Router
where
    S: ApplicationStore + 'static,
    C: Clock + 'static,
{
    Router::new()
        .route("/api/v1/scout/applications", post(submit_handler::<S, C>))
        .route(
            "/api/v1/scout/applications/latest",
            get(latest_application_handler::<S, C>),
        )
        .route("/api/v1/scout/jobs", get(jobs_handler::<S, C>))
        .route("/api/v1/scout/jobs/:job_id", get(job_detail_handler::<S, C>))
        .route(
            "/api/v1/scout/jobs/:job_id/apply",
            post(apply_handler::<S, C>),
        )
        .route("/api/v1/scout/applied", get(applied_handler::<S, C>))
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LanguageQuery {
    #[serde(default)]
    lang: Option<String>,
}

impl LanguageQuery {
    fn language(&self) -> Language {
        self.lang
            .as_deref()
            .and_then(Language::from_code)
            .unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ScoutJobsResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    application_id: Option<ApplicationId>,
    language: &'static str,
    jobs: Vec<JobCardView>,
}

pub(crate) async fn submit_handler<S, C>(
    State(service): State<Arc<ScoutService<S, C>>>,
    axum::Json(submission): axum::Json<ApplicationSubmission>,
) -> Response
where
    S: ApplicationStore + 'static,
    C: Clock + 'static,
{
    match service.submit(submission) {
        Ok(application) => {
            let view = ApplicationView::from(&application);
            (StatusCode::ACCEPTED, axum::Json(view)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn latest_application_handler<S, C>(
    State(service): State<Arc<ScoutService<S, C>>>,
) -> Response
where
    S: ApplicationStore + 'static,
    C: Clock + 'static,
{
    match service.last_application() {
        Ok(Some(application)) => {
            (StatusCode::OK, axum::Json(ApplicationView::from(&application))).into_response()
        }
        Ok(None) => {
            let payload = json!({ "error": "no application has been submitted" });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn jobs_handler<S, C>(
    State(service): State<Arc<ScoutService<S, C>>>,
    Query(query): Query<LanguageQuery>,
) -> Response
where
    S: ApplicationStore + 'static,
    C: Clock + 'static,
{
    let language = query.language();

    let response = match service.recommendations() {
        Ok(ScoutOutcome::NoApplication) => ScoutJobsResponse {
            status: "no_application",
            application_id: None,
            language: language.code(),
            jobs: Vec::new(),
        },
        Ok(ScoutOutcome::Matched {
            application_id,
            evaluated_at,
            jobs,
        }) => ScoutJobsResponse {
            status: "matched",
            application_id: Some(application_id),
            language: language.code(),
            jobs: jobs
                .iter()
                .map(|job| JobCardView::from_recommended(job, evaluated_at, language))
                .collect(),
        },
        Err(err) => return error_response(err),
    };

    (StatusCode::OK, axum::Json(response)).into_response()
}

pub(crate) async fn job_detail_handler<S, C>(
    State(service): State<Arc<ScoutService<S, C>>>,
    Path(job_id): Path<String>,
    Query(query): Query<LanguageQuery>,
) -> Response
where
    S: ApplicationStore + 'static,
    C: Clock + 'static,
{
    match service.job_detail(&JobId(job_id)) {
        Ok(detail) => {
            let evaluated_at = detail.evaluated_at;
            let view = JobDetailView::new(detail, evaluated_at, query.language());
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn apply_handler<S, C>(
    State(service): State<Arc<ScoutService<S, C>>>,
    Path(job_id): Path<String>,
) -> Response
where
    S: ApplicationStore + 'static,
    C: Clock + 'static,
{
    match service.apply(&JobId(job_id)) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn applied_handler<S, C>(
    State(service): State<Arc<ScoutService<S, C>>>,
) -> Response
where
    S: ApplicationStore + 'static,
    C: Clock + 'static,
{
    match service.applied_jobs() {
        Ok(job_ids) => (StatusCode::OK, axum::Json(json!({ "job_ids": job_ids }))).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: ScoutServiceError) -> Response {
    match err {
        ScoutServiceError::UnknownJob(job_id) => {
            let payload = json!({
                "error": "job not found",
                "job_id": job_id.0,
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        other => {
            error!(error = %other, "scout request failed");
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
