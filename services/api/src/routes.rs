use crate::infra::{deserialize_optional_instant, AppState};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use visa_scout::error::AppError;
use visa_scout::workflows::scout::{
    rank_jobs, scout_router, ApplicationSnapshot, ApplicationStore, Clock, JobCardView,
    JobCatalog, JobPosting, Language, RecommendedJob, ScoutService,
};

/// Stateless ranking request: score an arbitrary application against either
/// the supplied postings or the bundled catalog.
#[derive(Debug, Deserialize)]
pub(crate) struct RankRequest {
    pub(crate) application: ApplicationSnapshot,
    #[serde(default, deserialize_with = "deserialize_optional_instant")]
    pub(crate) now: Option<DateTime<Utc>>,
    #[serde(default)]
    pub(crate) lang: Option<String>,
    #[serde(default)]
    pub(crate) catalog: Option<Vec<JobPosting>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RankResponse {
    pub(crate) now: DateTime<Utc>,
    pub(crate) language: Language,
    pub(crate) data_source: CatalogSource,
    pub(crate) candidates: usize,
    pub(crate) jobs: Vec<JobCardView>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum CatalogSource {
    Request,
    Standard,
}

pub(crate) fn with_scout_routes<S, C>(service: Arc<ScoutService<S, C>>) -> axum::Router
where
    S: ApplicationStore + 'static,
    C: Clock + 'static,
{
    scout_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/api/v1/scout/rank", axum::routing::post(rank_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn rank_endpoint(
    Json(payload): Json<RankRequest>,
) -> Result<Json<RankResponse>, AppError> {
    let RankRequest {
        application,
        now,
        lang,
        catalog,
    } = payload;

    let (catalog, data_source) = match catalog {
        Some(jobs) => (JobCatalog::new(jobs)?, CatalogSource::Request),
        None => (JobCatalog::standard(), CatalogSource::Standard),
    };
    let now = now.unwrap_or_else(Utc::now);
    let language = lang
        .as_deref()
        .and_then(Language::from_code)
        .unwrap_or_default();

    let jobs = rank_jobs(&application, &catalog, now)
        .into_iter()
        .map(|scored| {
            let recommended = RecommendedJob {
                scored,
                applied: false,
            };
            JobCardView::from_recommended(&recommended, now, language)
        })
        .collect();

    Ok(Json(RankResponse {
        now,
        language,
        data_source,
        candidates: catalog.len(),
        jobs,
    }))
}
