use super::common::*;
use crate::registry::domain::{NotificationKind, RecordId, ValidationError};
use crate::registry::service::ServiceError;
use crate::registry::store::RecordStore;

#[tokio::test]
async fn submitted_notifications_get_sequential_ids_and_join_the_snapshot() {
    let (service, _) = build_service();

    let first = service
        .submit_notification(notification_draft("Supermercado X"))
        .await
        .expect("first submit");
    let second = service
        .submit_notification(notification_draft("Almacén Y"))
        .await
        .expect("second submit");

    assert_eq!(first.id, RecordId(1));
    assert_eq!(second.id, RecordId(2));
    assert_eq!(service.snapshot().notifications.len(), 2);
}

#[tokio::test]
async fn invalid_drafts_never_reach_the_store() {
    let (service, store) = build_service();
    let mut draft = notification_draft("Supermercado X");
    draft.against.clear();

    let err = service
        .submit_notification(draft)
        .await
        .expect_err("missing field");
    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::MissingField { field: "against" })
    ));
    assert!(store.notifications.lock().expect("lock").is_empty());
    assert!(service.snapshot().notifications.is_empty());
}

#[tokio::test]
async fn refresh_replaces_the_snapshot() {
    let (service, store) = build_service();
    store
        .save_notification(notification_draft("Supermercado X"))
        .await
        .expect("seed");

    assert!(service.snapshot().notifications.is_empty());
    service.refresh().await.expect("refresh");
    assert_eq!(service.snapshot().notifications.len(), 1);
}

#[tokio::test]
async fn amend_updates_the_store_and_snapshot() {
    let (service, store) = build_service();
    let mut record = service
        .submit_notification(notification_draft("Supermercado X"))
        .await
        .expect("submit");

    record.notified_on = Some(date(2025, 7, 10));
    service
        .amend_notification(record.clone())
        .await
        .expect("amend");

    assert_eq!(
        service.snapshot().notifications[0].notified_on,
        record.notified_on
    );
    assert_eq!(
        store.notifications.lock().expect("lock")[0].notified_on,
        record.notified_on
    );
}

#[tokio::test]
async fn failed_amend_restores_the_prior_list_unchanged() {
    let seed = vec![
        notification_draft("Supermercado X").into_record(RecordId(1), date(2025, 7, 1)),
        notification_draft("Almacén Y").into_record(RecordId(2), date(2025, 7, 2)),
    ];
    let service = build_offline_service(seed.clone());
    service.refresh().await.expect("refresh");

    let mut edited = seed[0].clone();
    edited.notified_on = Some(date(2025, 7, 10));
    let err = service
        .amend_notification(edited)
        .await
        .expect_err("store offline");
    assert!(matches!(err, ServiceError::Store(_)));
    assert_eq!(service.snapshot().notifications, seed);
}

#[tokio::test]
async fn remove_deletes_exactly_the_matching_id() {
    let (service, _) = build_service();
    service
        .submit_notification(notification_draft("Supermercado X"))
        .await
        .expect("submit");
    service
        .submit_notification(notification_draft("Almacén Y"))
        .await
        .expect("submit");

    service
        .remove_notification(RecordId(1))
        .await
        .expect("remove");

    let remaining = service.snapshot().notifications;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, RecordId(2));
}

#[tokio::test]
async fn failed_remove_rolls_the_snapshot_back() {
    let seed = vec![
        notification_draft("Supermercado X").into_record(RecordId(1), date(2025, 7, 1)),
        notification_draft("Almacén Y").into_record(RecordId(2), date(2025, 7, 2)),
    ];
    let service = build_offline_service(seed.clone());
    service.refresh().await.expect("refresh");

    let err = service
        .remove_notification(RecordId(1))
        .await
        .expect_err("store offline");
    assert!(matches!(err, ServiceError::Store(_)));
    assert_eq!(service.snapshot().notifications, seed);
}

#[tokio::test]
async fn infraction_submission_computes_the_standard_term() {
    let (service, _) = build_service();
    let record = service
        .submit_infraction(infraction_draft(&["LEY 24240"]), date(2025, 7, 7))
        .await
        .expect("submit");

    assert_eq!(record.rebuttal_days, 10);
    assert_eq!(record.rebuttal_due, date(2025, 7, 22));
}

#[tokio::test]
async fn short_statute_laws_shrink_the_term() {
    let (service, _) = build_service();
    let record = service
        .submit_infraction(
            infraction_draft(&["ART. N° 5 LEY 24240"]),
            date(2025, 7, 7),
        )
        .await
        .expect("submit");

    assert_eq!(record.rebuttal_days, 5);
    assert_eq!(record.rebuttal_due, date(2025, 7, 15));
}

#[tokio::test]
async fn infraction_without_act_date_starts_from_today() {
    let (service, _) = build_service();
    let mut draft = infraction_draft(&["LEY 24240"]);
    draft.act_date = None;

    let record = service
        .submit_infraction(draft, date(2025, 7, 7))
        .await
        .expect("submit");
    assert_eq!(record.rebuttal_due, date(2025, 7, 22));
}

#[tokio::test]
async fn malformed_tax_id_is_rejected_before_persistence() {
    let (service, store) = build_service();
    let mut draft = infraction_draft(&["LEY 24240"]);
    draft.tax_id = "20-1234567".to_string();

    let err = service
        .submit_infraction(draft, date(2025, 7, 7))
        .await
        .expect_err("invalid tax id");
    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::InvalidTaxId { .. })
    ));
    assert!(store.infractions.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn dashboard_reflects_the_snapshot() {
    let (service, _) = build_service();
    service
        .submit_notification(notification_draft("Supermercado X"))
        .await
        .expect("submit");
    service
        .submit_inspection(inspection_draft(true))
        .await
        .expect("submit inspection");

    let stats = service.dashboard(date(2025, 7, 7));
    assert_eq!(stats.total_notifications, 1);
    assert_eq!(stats.total_inspections, 1);
    assert_eq!(stats.ex_officio_inspections, 1);
    // Hearing on 2025-07-14 is seven days out, inside the alert window.
    assert_eq!(stats.upcoming_hearings.len(), 1);
    assert_eq!(stats.upcoming_hearings[0].days_until, 7);
}

#[tokio::test]
async fn law_catalog_merges_stored_labels_with_the_builtins() {
    let (service, _) = build_service();
    let mut draft = infraction_draft(&["ART. 10 LEY 24240 "]);
    draft.laws.push("LEY 24240".to_string());
    service
        .submit_infraction(draft, date(2025, 7, 7))
        .await
        .expect("submit");

    let catalog = service.law_catalog();
    assert!(catalog.contains(&"ART. 10 LEY 24240".to_string()));
    assert!(catalog.contains(&"LEY 24240".to_string()));
    assert_eq!(
        catalog.iter().filter(|l| l.as_str() == "LEY 24240").count(),
        1
    );
    let mut sorted = catalog.clone();
    sorted.sort();
    assert_eq!(catalog, sorted);
}

#[tokio::test]
async fn company_registry_accumulates_across_record_kinds() {
    let (service, _) = build_service();
    service
        .submit_notification(notification_draft("Zeta SA"))
        .await
        .expect("submit");
    service
        .submit_infraction(infraction_draft(&["LEY 24240"]), date(2025, 7, 7))
        .await
        .expect("submit");

    let companies = service.companies().await.expect("companies");
    assert_eq!(companies, vec!["Comercial SRL", "Zeta SA"]);
}

#[tokio::test]
async fn notified_hearings_leave_the_alert_list() {
    let (service, _) = build_service();
    let mut record = service
        .submit_notification(notification_draft("Supermercado X"))
        .await
        .expect("submit");
    assert_eq!(service.dashboard(date(2025, 7, 7)).upcoming_hearings.len(), 1);

    record.notified_on = Some(date(2025, 7, 8));
    service.amend_notification(record).await.expect("amend");
    assert!(service
        .dashboard(date(2025, 7, 7))
        .upcoming_hearings
        .is_empty());
}

#[tokio::test]
async fn stats_count_notifications_by_kind() {
    let (service, _) = build_service();
    let mut transfer = notification_draft("Supermercado X");
    transfer.kind = NotificationKind::Transfer;
    service
        .submit_notification(notification_draft("Supermercado X"))
        .await
        .expect("submit");
    service
        .submit_notification(transfer)
        .await
        .expect("submit");

    let stats = service.dashboard(date(2025, 7, 7));
    let audience = stats
        .notifications_by_kind
        .iter()
        .find(|entry| entry.kind == NotificationKind::Audience)
        .expect("audience bucket");
    assert_eq!(audience.count, 1);
}
