//! Shared type definitions.

pub mod id;
pub mod time;
