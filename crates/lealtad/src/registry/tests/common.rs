use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::registry::deadline::HolidayCalendar;
use crate::registry::domain::{
    Area, InfractionDraft, InfractionRecord, InspectionDraft, InspectionRecord, NotificationDraft,
    NotificationKind, NotificationRecord, RecordId,
};
use crate::registry::service::RecordService;
use crate::registry::store::{InfractionSubmission, RecordStore, StoreError};

pub(super) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Entry date the memory store stamps on new records, fixed for determinism.
pub(super) const ENTRY_DATE: (i32, u32, u32) = (2025, 7, 1);

pub(super) fn notification_draft(company: &str) -> NotificationDraft {
    NotificationDraft {
        reference: "EXP-001".to_string(),
        year: 2025,
        area: Area::CommercialLoyalty,
        department: "Capital".to_string(),
        kind: NotificationKind::Audience,
        company: company.to_string(),
        against: "Juan Perez".to_string(),
        hearing_date: Some(date(2025, 7, 14)),
        notifier: "Ponce".to_string(),
        notified_on: None,
    }
}

pub(super) fn infraction_draft(laws: &[&str]) -> InfractionDraft {
    InfractionDraft {
        digital_number: "DIG-1".to_string(),
        act_number: "12345".to_string(),
        act_date: Some(date(2025, 7, 7)),
        inspector: "Nieva".to_string(),
        second_inspector: None,
        locality: "Capital".to_string(),
        legal_name: "Comercial SRL".to_string(),
        trade_name: "La Esquina".to_string(),
        tax_id: "20123456789".to_string(),
        laws: laws.iter().map(|l| l.to_string()).collect(),
        expired_products: 2,
        seized_products: 1,
        status: "Pendiente".to_string(),
        rebuttal_filed: false,
        rebuttal_date: None,
    }
}

pub(super) fn inspection_draft(ex_officio: bool) -> InspectionDraft {
    InspectionDraft {
        date: date(2025, 7, 3),
        act_number: "556".to_string(),
        inspector: "Molina".to_string(),
        second_inspector: None,
        locality: "Belén".to_string(),
        legal_name: "Almacén Y".to_string(),
        trade_name: String::new(),
        tax_id: String::new(),
        laws: vec!["LEY 24240".to_string()],
        ex_officio,
    }
}

#[derive(Default)]
pub(super) struct MemoryStore {
    pub(super) notifications: Mutex<Vec<NotificationRecord>>,
    pub(super) infractions: Mutex<Vec<InfractionRecord>>,
    pub(super) inspections: Mutex<Vec<InspectionRecord>>,
    pub(super) companies: Mutex<Vec<String>>,
}

impl MemoryStore {
    fn register_company(&self, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        let mut companies = self.companies.lock().expect("companies mutex poisoned");
        if !companies.iter().any(|existing| existing == name) {
            companies.push(name.to_string());
            companies.sort();
        }
    }

    fn entry_date() -> NaiveDate {
        let (y, m, d) = ENTRY_DATE;
        date(y, m, d)
    }
}

fn next_id<I: Iterator<Item = RecordId>>(ids: I) -> RecordId {
    RecordId(ids.map(|id| id.0).max().unwrap_or(0) + 1)
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn notifications(&self) -> Result<Vec<NotificationRecord>, StoreError> {
        Ok(self.notifications.lock().expect("lock").clone())
    }

    async fn save_notification(
        &self,
        draft: NotificationDraft,
    ) -> Result<NotificationRecord, StoreError> {
        let mut records = self.notifications.lock().expect("lock");
        let id = next_id(records.iter().map(|r| r.id));
        let record = draft.into_record(id, Self::entry_date());
        records.push(record.clone());
        drop(records);
        self.register_company(&record.company);
        Ok(record)
    }

    async fn update_notification(&self, record: NotificationRecord) -> Result<(), StoreError> {
        let mut records = self.notifications.lock().expect("lock");
        let slot = records
            .iter_mut()
            .find(|existing| existing.id == record.id)
            .ok_or(StoreError::NotFound { id: record.id })?;
        *slot = record;
        Ok(())
    }

    async fn delete_notification(&self, id: RecordId) -> Result<(), StoreError> {
        let mut records = self.notifications.lock().expect("lock");
        let before = records.len();
        records.retain(|existing| existing.id != id);
        if records.len() == before {
            return Err(StoreError::NotFound { id });
        }
        Ok(())
    }

    async fn infractions(&self) -> Result<Vec<InfractionRecord>, StoreError> {
        Ok(self.infractions.lock().expect("lock").clone())
    }

    async fn save_infraction(
        &self,
        submission: InfractionSubmission,
    ) -> Result<InfractionRecord, StoreError> {
        let mut records = self.infractions.lock().expect("lock");
        let id = next_id(records.iter().map(|r| r.id));
        let record = submission.draft.into_record(
            id,
            Self::entry_date(),
            submission.tax_id,
            submission.term,
        );
        records.push(record.clone());
        drop(records);
        self.register_company(&record.legal_name);
        Ok(record)
    }

    async fn inspections(&self) -> Result<Vec<InspectionRecord>, StoreError> {
        Ok(self.inspections.lock().expect("lock").clone())
    }

    async fn save_inspection(
        &self,
        draft: InspectionDraft,
    ) -> Result<InspectionRecord, StoreError> {
        let mut records = self.inspections.lock().expect("lock");
        let id = next_id(records.iter().map(|r| r.id));
        let record = draft.into_record(id);
        records.push(record.clone());
        drop(records);
        self.register_company(&record.legal_name);
        Ok(record)
    }

    async fn companies(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.companies.lock().expect("lock").clone())
    }
}

/// Reads succeed with the seeded list; every write fails as if the remote
/// endpoint rejected it.
pub(super) struct OfflineStore {
    pub(super) seed: Vec<NotificationRecord>,
}

fn offline() -> StoreError {
    StoreError::Remote {
        message: "spreadsheet endpoint offline".to_string(),
    }
}

#[async_trait]
impl RecordStore for OfflineStore {
    async fn notifications(&self) -> Result<Vec<NotificationRecord>, StoreError> {
        Ok(self.seed.clone())
    }

    async fn save_notification(
        &self,
        _draft: NotificationDraft,
    ) -> Result<NotificationRecord, StoreError> {
        Err(offline())
    }

    async fn update_notification(&self, _record: NotificationRecord) -> Result<(), StoreError> {
        Err(offline())
    }

    async fn delete_notification(&self, _id: RecordId) -> Result<(), StoreError> {
        Err(offline())
    }

    async fn infractions(&self) -> Result<Vec<InfractionRecord>, StoreError> {
        Ok(Vec::new())
    }

    async fn save_infraction(
        &self,
        _submission: InfractionSubmission,
    ) -> Result<InfractionRecord, StoreError> {
        Err(offline())
    }

    async fn inspections(&self) -> Result<Vec<InspectionRecord>, StoreError> {
        Ok(Vec::new())
    }

    async fn save_inspection(
        &self,
        _draft: InspectionDraft,
    ) -> Result<InspectionRecord, StoreError> {
        Err(offline())
    }

    async fn companies(&self) -> Result<Vec<String>, StoreError> {
        Ok(Vec::new())
    }
}

pub(super) fn build_service() -> (Arc<RecordService<MemoryStore>>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let service = Arc::new(RecordService::new(
        store.clone(),
        HolidayCalendar::argentine(),
    ));
    (service, store)
}

pub(super) fn build_offline_service(
    seed: Vec<NotificationRecord>,
) -> Arc<RecordService<OfflineStore>> {
    Arc::new(RecordService::new(
        Arc::new(OfflineStore { seed }),
        HolidayCalendar::argentine(),
    ))
}
