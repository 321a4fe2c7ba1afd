use crate::cli::ServeArgs;
use crate::infra::{local_store, AppState};
use crate::routes::with_registry_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use lealtad::config::AppConfig;
use lealtad::error::AppError;
use lealtad::registry::{HolidayCalendar, RecordService, RecordStore, SheetsStore};
use lealtad::telemetry;
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

    match config.store.sheets_url.clone() {
        Some(url) => {
            info!(%url, "records backed by spreadsheet endpoint");
            let store = Arc::new(SheetsStore::new(url));
            serve(config, store).await
        }
        None => {
            info!(dir = %config.store.data_dir.display(), "records backed by local store");
            let store = local_store(&config.store)?;
            serve(config, store).await
        }
    }
}

async fn serve<S>(config: AppConfig, store: Arc<S>) -> Result<(), AppError>
where
    S: RecordStore + 'static,
{
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let service = Arc::new(RecordService::new(store, HolidayCalendar::argentine()));

    let app = with_registry_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "record registry ready");

    axum::serve(listener, app).await?;
    Ok(())
}
