//! Leadflow Leads: lead store operations with per-field change
//! auditing, the per-lead chat log, the dashboard aggregator and the
//! bulk spreadsheet importer.
//!
//! Every service is generic over the repository traits in
//! `leadflow-core`.

pub mod audit;
pub mod chat;
pub mod dashboard;
pub mod import;
pub mod service;

pub use chat::ChatService;
pub use dashboard::{DashboardService, DashboardStats, FunnelCounts};
pub use import::{ImportReport, LeadImporter, SheetCell};
pub use service::LeadService;
