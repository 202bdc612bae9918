//! # hibi-api
//!
//! Thin axum surface over the reminder pipeline: reminder settings,
//! device registration, and health. Authentication terminates upstream;
//! the caller identity arrives as an `X-User-Id` header.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
