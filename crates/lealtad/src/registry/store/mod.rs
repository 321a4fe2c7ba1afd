//! Storage backends for the record collections.
//!
//! `SheetsStore` talks to the spreadsheet web endpoint; `LocalStore` keeps
//! JSON files under a data directory when no endpoint is configured.

mod local;
mod sheets;

use async_trait::async_trait;

use super::deadline::RebuttalTerm;
use super::domain::{
    InfractionDraft, InfractionRecord, InspectionDraft, InspectionRecord, NotificationDraft,
    NotificationRecord, RecordId, TaxId,
};

pub use local::LocalStore;
pub use sheets::SheetsStore;

/// Storage failures. Remote-reported errors keep the server's message.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("request to record store failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("record store rejected the operation: {message}")]
    Remote { message: String },
    #[error("no record with id {id}")]
    NotFound { id: RecordId },
    #[error("record store io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("record store returned malformed data: {0}")]
    Json(#[from] serde_json::Error),
}

/// Validated infraction payload plus its computed rebuttal term, ready for
/// persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct InfractionSubmission {
    pub draft: InfractionDraft,
    pub tax_id: TaxId,
    pub term: RebuttalTerm,
}

/// Storage abstraction so the record service can be exercised in isolation.
///
/// Stores assign identifiers (max existing id + 1) and, where applicable,
/// entry dates. Saving any record that names a company also feeds the
/// autocomplete registry.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn notifications(&self) -> Result<Vec<NotificationRecord>, StoreError>;
    async fn save_notification(
        &self,
        draft: NotificationDraft,
    ) -> Result<NotificationRecord, StoreError>;
    async fn update_notification(&self, record: NotificationRecord) -> Result<(), StoreError>;
    async fn delete_notification(&self, id: RecordId) -> Result<(), StoreError>;

    async fn infractions(&self) -> Result<Vec<InfractionRecord>, StoreError>;
    async fn save_infraction(
        &self,
        submission: InfractionSubmission,
    ) -> Result<InfractionRecord, StoreError>;

    async fn inspections(&self) -> Result<Vec<InspectionRecord>, StoreError>;
    async fn save_inspection(
        &self,
        draft: InspectionDraft,
    ) -> Result<InspectionRecord, StoreError>;

    async fn companies(&self) -> Result<Vec<String>, StoreError>;
}
