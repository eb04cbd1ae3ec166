use crate::cli::ServeArgs;
use crate::infra::{load_catalog, AppState, ScoutStore};
use crate::routes::with_scout_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;
use visa_scout::config::AppConfig;
use visa_scout::error::AppError;
use visa_scout::telemetry;
use visa_scout::workflows::scout::{ScoutService, SystemClock};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(ScoutStore::from_config(&config.scout)?);
    let catalog = Arc::new(load_catalog(config.scout.catalog_path.as_deref())?);
    let jobs = catalog.len();
    let scout_service = Arc::new(ScoutService::new(store, catalog, SystemClock));

    let app = with_scout_routes(scout_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, jobs, "visa scout ready");

    axum::serve(listener, app).await?;
    Ok(())
}
