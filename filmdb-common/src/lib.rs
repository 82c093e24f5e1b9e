//! # filmdb common library
//!
//! Shared code for the filmdb crates:
//! - Error and result types
//! - Bootstrap configuration (TOML file, environment, built-in defaults)
//! - Database initialization and the relational schema

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
