//! Redis-backed time index (sorted set).

pub mod client;
pub mod index;

pub use client::RedisClient;
pub use index::RedisTimeIndex;
