//! Storage layer for benchmark results.

pub mod csv;

// Re-export key types
pub use csv::{CSV_HEADERS, CsvReportWriter};
