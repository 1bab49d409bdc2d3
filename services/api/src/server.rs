use crate::cli::ServeArgs;
use crate::infra::{build_appcenter, AppState, InProcessWorkflowEngine};
use crate::routes::with_appcenter_routes;
use appcenter::config::AppConfig;
use appcenter::error::AppError;
use appcenter::rbac::InMemoryResourceTypeRegistry;
use appcenter::telemetry;
use appcenter::Database;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

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

    let db = Database::from_config(&config.database)?;
    let registry = InMemoryResourceTypeRegistry::default();
    let appcenter = build_appcenter(
        &db,
        Arc::new(InProcessWorkflowEngine::default()),
        &registry,
    );

    let app = with_appcenter_routes(Arc::new(appcenter))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        resource_types = ?registry.keys(),
        "application center ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
