//! Core library for the Lealtad Comercial record-keeping service.
//!
//! Staff of the provincial consumer-protection office register notifications,
//! infraction acts, and inspection acts; the dashboard aggregates them and a
//! date-range management report can be rendered for printing. Persistence is
//! delegated to a spreadsheet-backed web endpoint or, without one, to a local
//! JSON-file store.

pub mod config;
pub mod error;
pub mod registry;
pub mod telemetry;
