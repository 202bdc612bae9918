//! # hibi-index
//!
//! Time-index providers for the reminder pipeline. Supports two modes:
//!
//! - **memory**: in-process sorted index (per-process, test-friendly)
//! - **redis**: Redis sorted set shared across instances
//!
//! The provider is selected at runtime based on configuration and exposed
//! behind the [`hibi_core::traits::time_index::TimeIndex`] trait, never as
//! ambient/static state.

pub mod manager;
#[cfg(feature = "memory")]
pub mod memory;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use manager::TimeIndexManager;
