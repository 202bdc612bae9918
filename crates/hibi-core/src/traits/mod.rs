//! Trait seams implemented by provider crates.

pub mod push;
pub mod time_index;
