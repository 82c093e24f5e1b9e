//! filmdb-etl library interface
//!
//! Exposes the pipeline pieces for the binary and for integration testing.

pub mod db;
pub mod error;
pub mod input;
pub mod services;
pub mod types;
pub mod workflow;

pub use crate::error::{EtlError, EtlResult};
