//! Model consumers for the startup analyzer.
//!
//! This crate provides:
//! - Output directory layout and preparation
//! - Summary counts
//! - CSV exports
//! - HTML dashboard
//! - JSON analysis and parsed-bundle dumps

pub mod csv_export;
pub mod dashboard;
pub mod json_export;
pub mod layout;
pub mod summary;

pub use csv_export::CsvExporter;
pub use dashboard::Dashboard;
pub use layout::OutputLayout;
pub use summary::ModelSummary;
