//! # hibi-core
//!
//! Core crate for the Hibi diary backend. Contains traits, configuration
//! schemas, typed identifiers, and the unified error system used by the
//! reminder dispatch pipeline.
//!
//! This crate has **no** internal dependencies on other Hibi crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
