//! Pipeline entry points.
//!
//! - `Pipeline`: long-lived assembly used by the CLI and the HTTP handler
//! - `run_pipeline`: one bounded fetch → group pass over explicit parts

pub mod ingest;

pub use ingest::{Pipeline, process_item, run_pipeline};
