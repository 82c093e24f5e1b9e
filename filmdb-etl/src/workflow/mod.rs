//! ETL workflow
//!
//! Sequential pipeline over the local movie rows:
//! 1. Normalize the title and look it up (retrying once without a year)
//! 2. Reconcile the row with the lookup result
//! 3. Persist the movie and its links in a per-row transaction
//! 4. Load ratings once every movie has been processed

pub mod pipeline;
pub mod statistics;

pub use pipeline::{Pipeline, PipelineConfig};
pub use statistics::RunSummary;
