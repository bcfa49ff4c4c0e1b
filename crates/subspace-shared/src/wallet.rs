//! Wallet connection state.
//!
//! The [`WalletConnection`] document is persisted verbatim across sessions so
//! the client can offer a reconnect on startup. The signing key (`jwk`) is an
//! opaque JSON document owned by the wallet layer; nothing in this workspace
//! interprets it.

use serde::{Deserialize, Serialize};

use crate::types::WalletAddress;

/// How the wallet was connected.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStrategy {
    /// Browser-extension / injected provider. No key material is held locally.
    Injected,
    /// Imported keyfile. The `jwk` field carries the key document.
    Keyfile,
}

/// Persisted `wallet-connection` document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WalletConnection {
    /// Active account address, if any.
    pub address: Option<WalletAddress>,
    /// Whether the wallet is currently connected.
    pub connected: bool,
    /// Strategy used for the last successful connection.
    pub connection_strategy: Option<ConnectionStrategy>,
    /// Provider name as reported by the wallet (informational).
    pub provider: Option<String>,
    /// Opaque signing key document, present only for keyfile connections.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwk: Option<serde_json::Value>,
}

impl WalletConnection {
    pub fn disconnected() -> Self {
        Self {
            address: None,
            connected: false,
            connection_strategy: None,
            provider: None,
            jwk: None,
        }
    }

    pub fn connected(address: WalletAddress, strategy: ConnectionStrategy) -> Self {
        Self {
            address: Some(address),
            connected: true,
            connection_strategy: Some(strategy),
            provider: None,
            jwk: None,
        }
    }
}

impl Default for WalletConnection {
    fn default() -> Self {
        Self::disconnected()
    }
}

/// The bound identity: an account address plus an optional signing capability.
#[derive(Debug, Clone, PartialEq)]
pub struct WalletIdentity {
    pub address: WalletAddress,
    /// Opaque signing key document, absent for injected-provider connections.
    pub jwk: Option<serde_json::Value>,
}

impl WalletIdentity {
    pub fn new(address: WalletAddress) -> Self {
        Self { address, jwk: None }
    }

    pub fn with_jwk(address: WalletAddress, jwk: serde_json::Value) -> Self {
        Self {
            address,
            jwk: Some(jwk),
        }
    }

    pub fn can_sign(&self) -> bool {
        self.jwk.is_some()
    }
}
