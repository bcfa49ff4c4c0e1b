//! Identity binding and cache lifecycle.
//!
//! The cache is bound to at most one wallet identity at a time. Transitions:
//!
//! - `Unbound -> Bound(a)`: persist the connection, announce the identity,
//!   fetch the profile and start the background loader + pollers.
//! - `Bound(a) -> Bound(b)` with `a != b`: identity-scoped entities
//!   (friends, DM conversations, their in-flight guards) are cleared before
//!   rebinding; server and profile caches survive, they are not identity
//!   secrets.
//! - `Bound(_) -> Unbound`: the acting principal is gone, so the whole
//!   cache is cleared, including identity-agnostic entries.

use subspace_shared::wallet::{ConnectionStrategy, WalletConnection, WalletIdentity};

use crate::client::Client;
use crate::events::{emit, ClientEvent};

/// Identity binding state.
#[derive(Debug, Clone, Default)]
pub enum WalletBinding {
    #[default]
    Unbound,
    Bound(WalletIdentity),
}

impl WalletBinding {
    pub fn identity(&self) -> Option<&WalletIdentity> {
        match self {
            WalletBinding::Unbound => None,
            WalletBinding::Bound(identity) => Some(identity),
        }
    }
}

impl Client {
    /// Bind the cache to a wallet identity.
    ///
    /// Returns the freshly fetched profile's presence: `false` means the
    /// binding itself succeeded but the initial profile fetch did not (the
    /// profile may not exist yet; see `create_profile`).
    pub async fn bind_wallet(
        &self,
        identity: WalletIdentity,
        strategy: ConnectionStrategy,
    ) -> bool {
        {
            let mut binding = self.binding();
            match binding.identity().map(|id| id.address.clone()) {
                Some(prev) if prev != identity.address => {
                    tracing::info!(
                        from = prev.short(),
                        to = identity.address.short(),
                        "switching wallet identity"
                    );
                    // Scoped entities of the previous identity go before the
                    // new binding takes effect.
                    self.cache().clear_identity_scoped();
                }
                Some(_) => {
                    tracing::debug!(address = identity.address.short(), "rebinding same wallet");
                }
                None => {
                    tracing::info!(address = identity.address.short(), "binding wallet");
                }
            }
            *binding = WalletBinding::Bound(identity.clone());
        }

        // Stop any loader/poller still running for the previous binding.
        self.advance_generation();

        if let Some(storage) = self.storage() {
            let mut connection =
                WalletConnection::connected(identity.address.clone(), strategy);
            connection.jwk = identity.jwk.clone();
            if let Err(e) = storage.save_wallet_connection(&connection) {
                tracing::warn!(error = %e, "failed to persist wallet connection");
            }
        }

        emit(
            self.event_sender(),
            ClientEvent::IdentityChanged {
                address: identity.address.clone(),
            },
        );

        // Freshly fetch the profile; on success this also kicks off the
        // sequential joined-server walk.
        let profile = self.fetch_own_profile().await;

        self.spawn_profile_poll();

        profile.is_some()
    }

    /// Drop the bound identity and clear the entire cache.
    pub fn unbind_wallet(&self) {
        let had_identity = {
            let mut binding = self.binding();
            let had = binding.identity().is_some();
            *binding = WalletBinding::Unbound;
            had
        };

        if !had_identity {
            return;
        }

        // Loaders and pollers observe the new generation at their next tick.
        self.advance_generation();
        self.advance_poll_epoch();

        self.cache().clear_all();

        if let Some(storage) = self.storage() {
            if let Err(e) = storage.save_wallet_connection(&WalletConnection::disconnected()) {
                tracing::warn!(error = %e, "failed to persist wallet disconnect");
            }
        }

        emit(self.event_sender(), ClientEvent::CacheCleared);
        tracing::info!("wallet unbound, cache cleared");
    }

    /// Rebind from the persisted `wallet-connection` document, if it records
    /// a live connection. Returns whether a binding was restored.
    pub async fn restore_session(&self) -> bool {
        let Some(storage) = self.storage() else {
            return false;
        };

        let connection = match storage.wallet_connection() {
            Ok(Some(connection)) => connection,
            Ok(None) => return false,
            Err(e) => {
                tracing::warn!(error = %e, "persisted wallet connection unreadable");
                return false;
            }
        };

        if !connection.connected {
            return false;
        }
        let (Some(address), Some(strategy)) =
            (connection.address, connection.connection_strategy)
        else {
            return false;
        };

        let identity = WalletIdentity {
            address,
            jwk: connection.jwk,
        };

        tracing::info!(address = identity.address.short(), "restoring wallet session");
        self.bind_wallet(identity, strategy).await;
        true
    }
}
