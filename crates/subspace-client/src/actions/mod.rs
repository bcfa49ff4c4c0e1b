//! Fetch actions and the optimistic mutation pipeline.
//!
//! Every fetch follows cache-or-skip: acquire the in-flight guard or fall
//! back to whatever the cache holds. Every mutation follows
//! write-then-refetch: perform the remote write, then schedule a delayed
//! forced refetch of the owning entity instead of trusting the write's own
//! return value; the remote service is eventually consistent and needs the
//! settle delay before the refetch observes the write.
//!
//! Failures never propagate: they are logged and surfaced as `false` /
//! `None` / empty, with the cache left at its last known-good state.

pub mod dms;
pub mod friends;
pub mod messages;
pub mod profile;
pub mod servers;

pub use servers::CreateServerOutcome;
