//! # subspace-remote
//!
//! The remote-service capability consumed by the cache coordinator.
//!
//! Durable chat state lives in an append-only, eventually-consistent
//! backend reachable only through an opaque protocol client. This crate
//! defines that client's shape -- an abstract asynchronous trait with
//! `get` / `create` / `update` / `delete` / `list` operations per entity
//! kind, keyed by stable string identifiers -- without implementing any
//! transport. Concrete implementations (and the test mock) live with
//! their consumers.

pub mod client;
pub mod requests;

mod error;

pub use client::RemoteService;
pub use error::{RemoteError, Result};
pub use requests::*;
