//! # subspace-client
//!
//! The cache/synchronization coordinator of the Subspace chat client.
//!
//! The [`Client`] context owns the local copy of every remote entity and
//! keeps it synchronized: it decides fetch-versus-cache, collapses duplicate
//! in-flight fetches, merges remote responses without discarding
//! locally-known substructure, paces a sequential background walk over the
//! user's joined servers, and binds the whole cache to the active wallet
//! identity.
//!
//! [`Client`]: crate::client::Client

pub mod actions;
pub mod binding;
pub mod client;
pub mod config;
pub mod events;
pub mod loader;
pub mod poll;

#[cfg(test)]
pub(crate) mod test_util;

pub use binding::WalletBinding;
pub use client::Client;
pub use config::ClientConfig;
pub use events::ClientEvent;

use tracing_subscriber::{fmt, EnvFilter};

/// Install the default tracing subscriber for an embedding binary.
///
/// Honors `RUST_LOG` when set; otherwise the workspace crates log at debug
/// and everything else at warn. Safe to call more than once.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("subspace_client=debug,subspace_store=info,subspace_remote=info,warn")
    });

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}
