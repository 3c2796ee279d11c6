//! Report rendering and table export.

pub mod currency;
pub mod export;
pub mod generator;

pub use currency::format_currency;
pub use export::export_tables;
pub use generator::{generate_json_report, generate_markdown_report, ReportOptions};
