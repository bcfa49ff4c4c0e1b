//! # subspace-store
//!
//! Local entity cache for the Subspace client.
//!
//! The remote service is slow and rate-sensitive, so the client never
//! re-fetches on render. This crate owns the cached copy of every entity,
//! the merge policy that folds remote responses in without dropping
//! locally-known substructure, the in-flight guard registry, and the
//! partial persistence of the cache to a local SQLite document store.

pub mod cache;
pub mod guards;
pub mod migrations;
pub mod models;
pub mod persist;
pub mod storage;

mod error;

pub use cache::CacheStore;
pub use error::StoreError;
pub use guards::{GuardKind, GuardRegistry, LoadGuard};
pub use models::*;
pub use persist::{PersistedCache, UiState};
pub use storage::LocalStore;
