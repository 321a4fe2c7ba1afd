//! JSON-file fallback store, used when no spreadsheet endpoint is
//! configured. One file per record kind under the data directory, using the
//! same fixed keys the browser demo used for local storage.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Local;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{InfractionSubmission, RecordStore, StoreError};
use crate::registry::domain::{
    InfractionRecord, InspectionDraft, InspectionRecord, NotificationDraft, NotificationRecord,
    RecordId,
};

const NOTIFICATIONS_KEY: &str = "db_notifications";
const INFRACTIONS_KEY: &str = "db_infractions";
const INSPECTIONS_KEY: &str = "db_inspections";
const COMPANIES_KEY: &str = "db_companies";

/// File-backed store. The mutex serializes identifier assignment and the
/// company-registry side effect.
pub struct LocalStore {
    dir: PathBuf,
    guard: Mutex<()>,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            guard: Mutex::new(()),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, StoreError> {
        let path = self.path(key);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn persist<T: Serialize>(&self, key: &str, records: &[T]) -> Result<(), StoreError> {
        let raw = serde_json::to_string_pretty(records)?;
        fs::write(self.path(key), raw)?;
        Ok(())
    }

    fn register_company(&self, name: &str) -> Result<(), StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(());
        }
        let mut companies: Vec<String> = self.load(COMPANIES_KEY)?;
        if !companies.iter().any(|existing| existing == name) {
            companies.push(name.to_string());
            companies.sort();
            self.persist(COMPANIES_KEY, &companies)?;
        }
        Ok(())
    }
}

fn next_id(ids: impl Iterator<Item = RecordId>) -> RecordId {
    RecordId(ids.map(|id| id.0).max().unwrap_or(0) + 1)
}

#[async_trait]
impl RecordStore for LocalStore {
    async fn notifications(&self) -> Result<Vec<NotificationRecord>, StoreError> {
        self.load(NOTIFICATIONS_KEY)
    }

    async fn save_notification(
        &self,
        draft: NotificationDraft,
    ) -> Result<NotificationRecord, StoreError> {
        let _lock = self.guard.lock().expect("store mutex poisoned");
        let mut records: Vec<NotificationRecord> = self.load(NOTIFICATIONS_KEY)?;
        let id = next_id(records.iter().map(|r| r.id));
        let record = draft.into_record(id, Local::now().date_naive());
        records.push(record.clone());
        self.persist(NOTIFICATIONS_KEY, &records)?;
        self.register_company(&record.company)?;
        Ok(record)
    }

    async fn update_notification(&self, record: NotificationRecord) -> Result<(), StoreError> {
        let _lock = self.guard.lock().expect("store mutex poisoned");
        let mut records: Vec<NotificationRecord> = self.load(NOTIFICATIONS_KEY)?;
        let slot = records
            .iter_mut()
            .find(|existing| existing.id == record.id)
            .ok_or(StoreError::NotFound { id: record.id })?;
        *slot = record;
        self.persist(NOTIFICATIONS_KEY, &records)
    }

    async fn delete_notification(&self, id: RecordId) -> Result<(), StoreError> {
        let _lock = self.guard.lock().expect("store mutex poisoned");
        let mut records: Vec<NotificationRecord> = self.load(NOTIFICATIONS_KEY)?;
        let before = records.len();
        records.retain(|existing| existing.id != id);
        if records.len() == before {
            return Err(StoreError::NotFound { id });
        }
        self.persist(NOTIFICATIONS_KEY, &records)
    }

    async fn infractions(&self) -> Result<Vec<InfractionRecord>, StoreError> {
        self.load(INFRACTIONS_KEY)
    }

    async fn save_infraction(
        &self,
        submission: InfractionSubmission,
    ) -> Result<InfractionRecord, StoreError> {
        let _lock = self.guard.lock().expect("store mutex poisoned");
        let mut records: Vec<InfractionRecord> = self.load(INFRACTIONS_KEY)?;
        let id = next_id(records.iter().map(|r| r.id));
        let record = submission.draft.into_record(
            id,
            Local::now().date_naive(),
            submission.tax_id,
            submission.term,
        );
        records.push(record.clone());
        self.persist(INFRACTIONS_KEY, &records)?;
        self.register_company(&record.legal_name)?;
        Ok(record)
    }

    async fn inspections(&self) -> Result<Vec<InspectionRecord>, StoreError> {
        self.load(INSPECTIONS_KEY)
    }

    async fn save_inspection(
        &self,
        draft: InspectionDraft,
    ) -> Result<InspectionRecord, StoreError> {
        let _lock = self.guard.lock().expect("store mutex poisoned");
        let mut records: Vec<InspectionRecord> = self.load(INSPECTIONS_KEY)?;
        let id = next_id(records.iter().map(|r| r.id));
        let record = draft.into_record(id);
        records.push(record.clone());
        self.persist(INSPECTIONS_KEY, &records)?;
        self.register_company(&record.legal_name)?;
        Ok(record)
    }

    async fn companies(&self) -> Result<Vec<String>, StoreError> {
        self.load(COMPANIES_KEY)
    }
}
