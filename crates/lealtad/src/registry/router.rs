use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;

use super::domain::{
    InfractionDraft, InspectionDraft, NotificationDraft, NotificationRecord, RecordId,
};
use super::report::ReportRange;
use super::service::{RecordService, ServiceError};
use super::store::{RecordStore, StoreError};

/// Router builder exposing the record, dashboard, and report endpoints.
pub fn registry_router<S>(service: Arc<RecordService<S>>) -> Router
where
    S: RecordStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/records/notifications",
            get(list_notifications::<S>).post(create_notification::<S>),
        )
        .route(
            "/api/v1/records/notifications/:id",
            axum::routing::put(update_notification::<S>).delete(delete_notification::<S>),
        )
        .route(
            "/api/v1/records/infractions",
            get(list_infractions::<S>).post(create_infraction::<S>),
        )
        .route(
            "/api/v1/records/inspections",
            get(list_inspections::<S>).post(create_inspection::<S>),
        )
        .route("/api/v1/records/companies", get(list_companies::<S>))
        .route("/api/v1/records/laws", get(law_catalog::<S>))
        .route("/api/v1/dashboard", get(dashboard::<S>))
        .route("/api/v1/reports/management", post(management_report::<S>))
        .route(
            "/api/v1/reports/management/print",
            get(management_report_print::<S>),
        )
        .with_state(service)
}

fn error_response(err: ServiceError) -> Response {
    let status = match &err {
        ServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ServiceError::Store(StoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
        ServiceError::Store(StoreError::Http(_) | StoreError::Remote { .. }) => {
            StatusCode::BAD_GATEWAY
        }
        ServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": err.to_string() });
    (status, axum::Json(payload)).into_response()
}

async fn list_notifications<S: RecordStore + 'static>(
    State(service): State<Arc<RecordService<S>>>,
) -> Response {
    match service.refresh().await {
        Ok(()) => axum::Json(service.snapshot().notifications).into_response(),
        Err(err) => error_response(err),
    }
}

async fn create_notification<S: RecordStore + 'static>(
    State(service): State<Arc<RecordService<S>>>,
    axum::Json(draft): axum::Json<NotificationDraft>,
) -> Response {
    match service.submit_notification(draft).await {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn update_notification<S: RecordStore + 'static>(
    State(service): State<Arc<RecordService<S>>>,
    Path(id): Path<u32>,
    axum::Json(mut record): axum::Json<NotificationRecord>,
) -> Response {
    record.id = RecordId(id);
    match service.amend_notification(record.clone()).await {
        Ok(()) => axum::Json(record).into_response(),
        Err(err) => error_response(err),
    }
}

async fn delete_notification<S: RecordStore + 'static>(
    State(service): State<Arc<RecordService<S>>>,
    Path(id): Path<u32>,
) -> Response {
    match service.remove_notification(RecordId(id)).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

async fn list_infractions<S: RecordStore + 'static>(
    State(service): State<Arc<RecordService<S>>>,
) -> Response {
    match service.refresh().await {
        Ok(()) => axum::Json(service.snapshot().infractions).into_response(),
        Err(err) => error_response(err),
    }
}

async fn create_infraction<S: RecordStore + 'static>(
    State(service): State<Arc<RecordService<S>>>,
    axum::Json(draft): axum::Json<InfractionDraft>,
) -> Response {
    let today = Local::now().date_naive();
    match service.submit_infraction(draft, today).await {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn list_inspections<S: RecordStore + 'static>(
    State(service): State<Arc<RecordService<S>>>,
) -> Response {
    match service.refresh().await {
        Ok(()) => axum::Json(service.snapshot().inspections).into_response(),
        Err(err) => error_response(err),
    }
}

async fn create_inspection<S: RecordStore + 'static>(
    State(service): State<Arc<RecordService<S>>>,
    axum::Json(draft): axum::Json<InspectionDraft>,
) -> Response {
    match service.submit_inspection(draft).await {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn list_companies<S: RecordStore + 'static>(
    State(service): State<Arc<RecordService<S>>>,
) -> Response {
    match service.companies().await {
        Ok(companies) => axum::Json(companies).into_response(),
        Err(err) => error_response(err),
    }
}

async fn law_catalog<S: RecordStore + 'static>(
    State(service): State<Arc<RecordService<S>>>,
) -> Response {
    match service.refresh().await {
        Ok(()) => axum::Json(service.law_catalog()).into_response(),
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Deserialize)]
struct DashboardQuery {
    today: Option<NaiveDate>,
}

async fn dashboard<S: RecordStore + 'static>(
    State(service): State<Arc<RecordService<S>>>,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let today = query.today.unwrap_or_else(|| Local::now().date_naive());
    match service.refresh().await {
        Ok(()) => axum::Json(service.dashboard(today)).into_response(),
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Deserialize)]
struct ReportRequest {
    from: NaiveDate,
    to: NaiveDate,
}

async fn management_report<S: RecordStore + 'static>(
    State(service): State<Arc<RecordService<S>>>,
    axum::Json(request): axum::Json<ReportRequest>,
) -> Response {
    let range = ReportRange {
        from: request.from,
        to: request.to,
    };
    match service.refresh().await {
        Ok(()) => axum::Json(service.management_report(range)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn management_report_print<S: RecordStore + 'static>(
    State(service): State<Arc<RecordService<S>>>,
    Query(request): Query<ReportRequest>,
) -> Response {
    let range = ReportRange {
        from: request.from,
        to: request.to,
    };
    match service.refresh().await {
        Ok(()) => {
            let html = service
                .management_report(range)
                .render_html(Local::now().date_naive());
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, mime::TEXT_HTML_UTF_8.as_ref())],
                html,
            )
                .into_response()
        }
        Err(err) => error_response(err),
    }
}
