//! Cache module for persisting fetched data to disk
//!
//! Each remote data source gets one independent store, backed by one JSON
//! file. Stores are read-through: a lookup either replays a previously
//! fetched value or performs the fetch itself and persists the result.
//! Entries are never invalidated — what was fetched once is served forever.

mod store;

pub use store::{CacheStore, LoadError};
