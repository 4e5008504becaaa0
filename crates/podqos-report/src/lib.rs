//! Report assembly and rendering for kubectl-podqos
//!
//! This crate flattens pod reports into one row per container and renders
//! the rows as an aligned table or as JSON.

mod output;
mod rows;

pub use output::{OutputFormat, render};
pub use rows::{ReportRow, assemble_rows};

// Re-export types used in our public API
pub use podqos_types::{PodResourceReport, QosClass};
