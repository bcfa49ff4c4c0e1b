//! Persistence partializer.
//!
//! Selects the subset of the cache that is written to durable storage and
//! rehydrates it at startup. Loading guards, the bound identity marker and
//! in-flight flags are process-lifetime-only and never appear here.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use subspace_shared::constants::{DOC_CACHE, DOC_UI_STATE, DOC_WALLET_CONNECTION};
use subspace_shared::types::{ChannelId, MessageId, ServerId, WalletAddress};
use subspace_shared::wallet::WalletConnection;

use crate::cache::CacheStore;
use crate::error::Result;
use crate::models::{DmConversation, Friend, MemberLoadState, Message, Profile, Server};
use crate::storage::LocalStore;

/// Shape of the persisted `subspace-cache` document.
///
/// Server entries stay as raw JSON values until rehydration so that one
/// malformed entry can be skipped without aborting the whole load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedCache {
    pub servers: HashMap<ServerId, serde_json::Value>,
    pub messages: HashMap<ChannelId, HashMap<MessageId, Message>>,
    pub profile: Option<Profile>,
    pub profiles: HashMap<WalletAddress, Profile>,
    pub friends: HashMap<WalletAddress, Friend>,
    pub dm_conversations: HashMap<WalletAddress, DmConversation>,
}

/// Shape of the persisted `global-ui-state` document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct UiState {
    pub active_server_id: Option<ServerId>,
    pub active_channel_id: Option<ChannelId>,
    pub active_friend_id: Option<WalletAddress>,
    pub last_channel_by_server: HashMap<ServerId, ChannelId>,
}

impl CacheStore {
    /// Extract the persisted subset of the cache.
    pub fn to_persisted(&self) -> Result<PersistedCache> {
        let inner = self.lock();

        let mut servers = HashMap::new();
        for (id, server) in &inner.servers {
            // A member fetch may be mid-flight; the flag is transient.
            let mut server = server.clone();
            if server.member_state == MemberLoadState::Loading {
                server.member_state = MemberLoadState::NotLoaded;
            }
            servers.insert(id.clone(), serde_json::to_value(&server)?);
        }

        Ok(PersistedCache {
            servers,
            messages: inner.messages.clone(),
            profile: inner.profile.clone(),
            profiles: inner.profiles.clone(),
            friends: inner.friends.clone(),
            dm_conversations: inner.dm_conversations.clone(),
        })
    }

    /// Populate the cache from a persisted document without contacting the
    /// remote service. Replaces the current contents.
    pub fn hydrate(&self, persisted: PersistedCache) {
        let servers = rehydrate_servers(persisted.servers);

        let mut inner = self.lock();
        inner.servers = servers;
        inner.messages = persisted.messages;
        inner.profile = persisted.profile;
        inner.profiles = persisted.profiles;
        inner.friends = persisted.friends;
        inner.dm_conversations = persisted.dm_conversations;
    }

    /// Serialize the persisted subset into the `subspace-cache` document.
    pub fn save(&self, store: &LocalStore) -> Result<()> {
        let persisted = self.to_persisted()?;
        let json = serde_json::to_string(&persisted)?;
        store.put_document(DOC_CACHE, &json)?;
        tracing::debug!(bytes = json.len(), "saved cache document");
        Ok(())
    }

    /// Load the `subspace-cache` document, if present. A document that does
    /// not parse at the top level is treated as absent (the cache starts
    /// empty); individual malformed server entries are skipped.
    ///
    /// Returns whether anything was loaded.
    pub fn load(&self, store: &LocalStore) -> Result<bool> {
        let Some(json) = store.document(DOC_CACHE)? else {
            return Ok(false);
        };

        match serde_json::from_str::<PersistedCache>(&json) {
            Ok(persisted) => {
                self.hydrate(persisted);
                Ok(true)
            }
            Err(e) => {
                tracing::warn!(error = %e, "persisted cache document unreadable, starting empty");
                Ok(false)
            }
        }
    }
}

/// Re-derive the working server mapping from whatever was persisted.
/// Malformed entries are logged and skipped; the rest of the rehydration
/// proceeds.
pub fn rehydrate_servers(
    raw: HashMap<ServerId, serde_json::Value>,
) -> HashMap<ServerId, Server> {
    let mut servers = HashMap::with_capacity(raw.len());
    for (id, value) in raw {
        match serde_json::from_value::<Server>(value) {
            Ok(mut server) => {
                if server.member_state == MemberLoadState::Loading {
                    server.member_state = MemberLoadState::NotLoaded;
                }
                servers.insert(id, server);
            }
            Err(e) => {
                tracing::warn!(server = %id, error = %e, "skipping malformed persisted server");
            }
        }
    }
    servers
}

impl LocalStore {
    /// Read the persisted `wallet-connection` document.
    pub fn wallet_connection(&self) -> Result<Option<WalletConnection>> {
        match self.document(DOC_WALLET_CONNECTION)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Write the `wallet-connection` document.
    pub fn save_wallet_connection(&self, connection: &WalletConnection) -> Result<()> {
        let json = serde_json::to_string(connection)?;
        self.put_document(DOC_WALLET_CONNECTION, &json)
    }

    /// Read the persisted `global-ui-state` document, defaulting when absent
    /// or unreadable.
    pub fn ui_state(&self) -> Result<UiState> {
        match self.document(DOC_UI_STATE)? {
            Some(json) => match serde_json::from_str(&json) {
                Ok(state) => Ok(state),
                Err(e) => {
                    tracing::warn!(error = %e, "persisted UI state unreadable, using defaults");
                    Ok(UiState::default())
                }
            },
            None => Ok(UiState::default()),
        }
    }

    /// Write the `global-ui-state` document.
    pub fn save_ui_state(&self, state: &UiState) -> Result<()> {
        let json = serde_json::to_string(state)?;
        self.put_document(DOC_UI_STATE, &json)
    }
}
