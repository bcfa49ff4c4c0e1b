//! # subspace-shared
//!
//! Identifier newtypes, wallet-connection types and operational constants
//! shared by every crate in the Subspace workspace.

pub mod constants;
pub mod types;
pub mod wallet;

pub use types::{CategoryId, ChannelId, MessageId, RoleId, ServerId, WalletAddress};
pub use wallet::{ConnectionStrategy, WalletConnection, WalletIdentity};
