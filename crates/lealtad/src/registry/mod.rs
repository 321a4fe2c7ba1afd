//! Record registry: domain model, deadline calculation, statistics,
//! storage backends, the record service, and its HTTP router.

pub mod deadline;
pub mod domain;
pub mod report;
pub mod router;
pub mod service;
pub mod stats;
pub mod store;

#[cfg(test)]
mod tests;

pub use deadline::{days_until, rebuttal_term, uses_short_term, HolidayCalendar, RebuttalTerm};
pub use domain::{
    Area, InfractionDraft, InfractionRecord, InspectionDraft, InspectionRecord, NotificationDraft,
    NotificationKind, NotificationRecord, RecordId, TaxId, ValidationError, DEPARTMENTS,
    INSPECTORS, LAW_OPTIONS,
};
pub use report::{ManagementReport, ReportRange};
pub use router::registry_router;
pub use service::{RecordService, ServiceError, Snapshot};
pub use stats::{DashboardStats, HearingAlert, KindCount, LabelCount};
pub use store::{InfractionSubmission, LocalStore, RecordStore, SheetsStore, StoreError};
