use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use super::deadline::{rebuttal_term, uses_short_term, HolidayCalendar};
use super::domain::{
    InfractionDraft, InfractionRecord, InspectionDraft, InspectionRecord, NotificationDraft,
    NotificationRecord, RecordId, ValidationError, LAW_OPTIONS,
};
use super::report::{ManagementReport, ReportRange};
use super::stats::{self, DashboardStats};
use super::store::{InfractionSubmission, RecordStore, StoreError};

/// In-memory view of the three record collections.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Snapshot {
    pub notifications: Vec<NotificationRecord>,
    pub infractions: Vec<InfractionRecord>,
    pub inspections: Vec<InspectionRecord>,
}

/// Error raised by the record service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Owns the record snapshot and composes the store, the deadline calculator,
/// and the aggregators. Mutations are optimistic: the snapshot changes
/// first and is rolled back to the pre-operation state when the store call
/// fails.
pub struct RecordService<S> {
    store: Arc<S>,
    calendar: HolidayCalendar,
    snapshot: Mutex<Snapshot>,
}

impl<S> RecordService<S>
where
    S: RecordStore + 'static,
{
    pub fn new(store: Arc<S>, calendar: HolidayCalendar) -> Self {
        Self {
            store,
            calendar,
            snapshot: Mutex::new(Snapshot::default()),
        }
    }

    /// Replace the snapshot with a fresh read of all three collections.
    pub async fn refresh(&self) -> Result<(), ServiceError> {
        let notifications = self.store.notifications().await?;
        let infractions = self.store.infractions().await?;
        let inspections = self.store.inspections().await?;

        let mut snapshot = self.lock();
        snapshot.notifications = notifications;
        snapshot.infractions = infractions;
        snapshot.inspections = inspections;
        Ok(())
    }

    pub fn snapshot(&self) -> Snapshot {
        self.lock().clone()
    }

    pub async fn submit_notification(
        &self,
        draft: NotificationDraft,
    ) -> Result<NotificationRecord, ServiceError> {
        draft.validate()?;
        let record = self.store.save_notification(draft).await?;
        self.lock().notifications.push(record.clone());
        Ok(record)
    }

    /// Optimistically replace the record in the snapshot, then persist; the
    /// prior list is restored unchanged when the store rejects the update.
    pub async fn amend_notification(
        &self,
        record: NotificationRecord,
    ) -> Result<(), ServiceError> {
        validate_notification(&record)?;

        let previous = {
            let mut snapshot = self.lock();
            let previous = snapshot.notifications.clone();
            if let Some(slot) = snapshot
                .notifications
                .iter_mut()
                .find(|existing| existing.id == record.id)
            {
                *slot = record.clone();
            }
            previous
        };

        match self.store.update_notification(record).await {
            Ok(()) => Ok(()),
            Err(err) => {
                self.lock().notifications = previous;
                Err(err.into())
            }
        }
    }

    /// Optimistically drop the record from the snapshot, then persist; same
    /// rollback contract as [`Self::amend_notification`].
    pub async fn remove_notification(&self, id: RecordId) -> Result<(), ServiceError> {
        let previous = {
            let mut snapshot = self.lock();
            let previous = snapshot.notifications.clone();
            snapshot.notifications.retain(|existing| existing.id != id);
            previous
        };

        match self.store.delete_notification(id).await {
            Ok(()) => Ok(()),
            Err(err) => {
                self.lock().notifications = previous;
                Err(err.into())
            }
        }
    }

    /// Validate the draft, compute the rebuttal term from the act date (or
    /// `today` when absent) and the selected laws, and persist.
    pub async fn submit_infraction(
        &self,
        draft: InfractionDraft,
        today: NaiveDate,
    ) -> Result<InfractionRecord, ServiceError> {
        let tax_id = draft.validate()?;
        let start = draft.act_date.unwrap_or(today);
        let term = rebuttal_term(start, uses_short_term(&draft.laws), &self.calendar);

        let record = self
            .store
            .save_infraction(InfractionSubmission {
                draft,
                tax_id,
                term,
            })
            .await?;
        self.lock().infractions.push(record.clone());
        Ok(record)
    }

    pub async fn submit_inspection(
        &self,
        draft: InspectionDraft,
    ) -> Result<InspectionRecord, ServiceError> {
        draft.validate()?;
        let record = self.store.save_inspection(draft).await?;
        self.lock().inspections.push(record.clone());
        Ok(record)
    }

    /// Dashboard aggregate of the current snapshot.
    pub fn dashboard(&self, today: NaiveDate) -> DashboardStats {
        let snapshot = self.lock();
        stats::dashboard(
            &snapshot.notifications,
            &snapshot.infractions,
            &snapshot.inspections,
            today,
        )
    }

    /// Date-range management report over the current snapshot.
    pub fn management_report(&self, range: ReportRange) -> ManagementReport {
        let snapshot = self.lock();
        ManagementReport::build(
            range,
            &snapshot.notifications,
            &snapshot.infractions,
            &snapshot.inspections,
        )
    }

    pub async fn companies(&self) -> Result<Vec<String>, ServiceError> {
        Ok(self.store.companies().await?)
    }

    /// Built-in law options merged with every label already present on
    /// stored records.
    pub fn law_catalog(&self) -> Vec<String> {
        let snapshot = self.lock();
        let mut labels: BTreeSet<String> =
            LAW_OPTIONS.iter().map(|label| label.to_string()).collect();
        let stored = snapshot
            .infractions
            .iter()
            .flat_map(|record| record.laws.iter())
            .chain(snapshot.inspections.iter().flat_map(|record| record.laws.iter()));
        for label in stored {
            let trimmed = label.trim();
            if !trimmed.is_empty() {
                labels.insert(trimmed.to_string());
            }
        }
        labels.into_iter().collect()
    }

    pub fn calendar(&self) -> &HolidayCalendar {
        &self.calendar
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Snapshot> {
        self.snapshot.lock().expect("snapshot mutex poisoned")
    }
}

fn validate_notification(record: &NotificationRecord) -> Result<(), ValidationError> {
    let checks = [
        (record.reference.as_str(), "reference"),
        (record.company.as_str(), "company"),
        (record.against.as_str(), "against"),
    ];
    for (value, field) in checks {
        if value.trim().is_empty() {
            return Err(ValidationError::MissingField { field });
        }
    }
    Ok(())
}
