use crate::cli::ServeArgs;
use crate::infra::{demo_store, AppState, LoggingNotificationPublisher};
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use drive_engine::config::AppConfig;
use drive_engine::error::AppError;
use drive_engine::telemetry;
use drive_engine::workflows::drive::{DriveWorkflowService, MemoryEntityStore};
use std::sync::atomic::{AtomicBool, Ordering};
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
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = if args.seed_demo {
        demo_store()
    } else {
        MemoryEntityStore::with_standard_roles()
    };
    let service = Arc::new(DriveWorkflowService::new(
        Arc::new(store),
        Arc::new(LoggingNotificationPublisher),
        config.workflow,
    ));

    let app = with_service_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        auto_assign = config.workflow.auto_assign.label(),
        seeded = args.seed_demo,
        "drive engine ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
