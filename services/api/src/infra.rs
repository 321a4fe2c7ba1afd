use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate};
use lealtad::config::StoreConfig;
use lealtad::registry::{
    Area, InfractionDraft, InspectionDraft, LocalStore, NotificationDraft, NotificationKind,
    RecordService, RecordStore, ServiceError, DEPARTMENTS, INSPECTORS, LAW_OPTIONS,
};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn local_store(config: &StoreConfig) -> Result<Arc<LocalStore>, ServiceError> {
    Ok(Arc::new(
        LocalStore::new(&config.data_dir).map_err(ServiceError::from)?,
    ))
}

/// Fill an empty store with a handful of records so the demo and a first
/// `serve` against a fresh data directory have something to show.
pub(crate) async fn seed_records<S>(
    service: &RecordService<S>,
    today: NaiveDate,
) -> Result<bool, ServiceError>
where
    S: RecordStore + 'static,
{
    service.refresh().await?;
    let snapshot = service.snapshot();
    if !snapshot.notifications.is_empty()
        || !snapshot.infractions.is_empty()
        || !snapshot.inspections.is_empty()
    {
        return Ok(false);
    }

    service
        .submit_notification(NotificationDraft {
            reference: "EXP-001".to_string(),
            year: today.year(),
            area: Area::CommercialLoyalty,
            department: DEPARTMENTS[0].to_string(),
            kind: NotificationKind::Audience,
            company: "Supermercado X".to_string(),
            against: "Juan Perez".to_string(),
            hearing_date: Some(today + Duration::days(5)),
            notifier: INSPECTORS[5].to_string(),
            notified_on: None,
        })
        .await?;

    service
        .submit_notification(NotificationDraft {
            reference: "EXP-002".to_string(),
            year: today.year(),
            area: Area::ConsumerDefense,
            department: DEPARTMENTS[1].to_string(),
            kind: NotificationKind::Imputation,
            company: "Almacén Y".to_string(),
            against: "Comercio Y SRL".to_string(),
            hearing_date: None,
            notifier: INSPECTORS[1].to_string(),
            notified_on: Some(today),
        })
        .await?;

    service
        .submit_infraction(
            InfractionDraft {
                digital_number: "DIG-0001".to_string(),
                act_number: "12345".to_string(),
                act_date: Some(today),
                inspector: INSPECTORS[0].to_string(),
                second_inspector: Some(INSPECTORS[4].to_string()),
                locality: DEPARTMENTS[0].to_string(),
                legal_name: "Comercial SRL".to_string(),
                trade_name: "La Esquina".to_string(),
                tax_id: "20123456789".to_string(),
                laws: vec![LAW_OPTIONS[0].to_string(), LAW_OPTIONS[9].to_string()],
                expired_products: 4,
                seized_products: 2,
                status: "Pendiente".to_string(),
                rebuttal_filed: false,
                rebuttal_date: None,
            },
            today,
        )
        .await?;

    service
        .submit_inspection(InspectionDraft {
            date: today,
            act_number: "556".to_string(),
            inspector: INSPECTORS[4].to_string(),
            second_inspector: None,
            locality: DEPARTMENTS[4].to_string(),
            legal_name: "Almacén Y".to_string(),
            trade_name: String::new(),
            tax_id: String::new(),
            laws: vec![LAW_OPTIONS[9].to_string()],
            ex_officio: true,
        })
        .await?;

    Ok(true)
}
