//! File input and output for selection runs.
//!
//! Loads candidate pools and the reference history, and writes selection
//! reports as JSON or YAML.

pub mod input;
pub mod report;

pub use input::{load_candidates, load_reference_buffer, save_reference_buffer};
pub use report::{ReportFormat, SelectionReport};
