//! Entity models held in the client cache.
//!
//! Every struct derives `Serialize` and `Deserialize` with camelCase field
//! names so it can be written verbatim into the persisted cache document and
//! handed to the UI layer.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use subspace_shared::types::{CategoryId, ChannelId, MessageId, RoleId, ServerId, WalletAddress};

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// A user profile, self or other. Keyed by wallet address in the cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Wallet address this profile belongs to.
    pub address: WalletAddress,
    /// Display name.
    pub username: Option<String>,
    /// Avatar reference (opaque remote handle).
    pub pfp: Option<String>,
    /// Free-form bio text.
    pub bio: Option<String>,
    /// Handle of this profile's own DM process on the remote service.
    pub dm_process: Option<String>,
    /// Servers the user has joined. Entries come in two remote formats, see
    /// [`ServerRef`].
    #[serde(default)]
    pub joined_servers: Vec<ServerRef>,
    /// Friend relationship graph.
    #[serde(default)]
    pub friends: FriendGraph,
}

impl Profile {
    pub fn new(address: WalletAddress) -> Self {
        Self {
            address,
            username: None,
            pfp: None,
            bio: None,
            dm_process: None,
            joined_servers: Vec::new(),
            friends: FriendGraph::default(),
        }
    }
}

/// One entry of a profile's joined-server list.
///
/// Older remote records are bare server ids; newer ones are small objects
/// whose id field may be absent. Consumers resolve through
/// [`ServerRef::server_id`] and skip entries that resolve to `None`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ServerRef {
    Id(ServerId),
    Entry(ServerEntry),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServerEntry {
    pub server_id: Option<ServerId>,
    /// Sort position within the user's server list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

impl ServerRef {
    pub fn server_id(&self) -> Option<&ServerId> {
        match self {
            ServerRef::Id(id) => Some(id),
            ServerRef::Entry(entry) => entry.server_id.as_ref(),
        }
    }
}

/// Friend relationships attached to a profile, as three address sets.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FriendGraph {
    #[serde(default)]
    pub accepted: Vec<WalletAddress>,
    #[serde(default)]
    pub sent: Vec<WalletAddress>,
    #[serde(default)]
    pub received: Vec<WalletAddress>,
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// Member-list loading state of a [`Server`].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum MemberLoadState {
    #[default]
    NotLoaded,
    Loading,
    Loaded,
}

/// A server (guild) grouping channels, categories, roles and members.
///
/// The member list is loaded out-of-band from the rest of the entity, so it
/// is optional and carries its own loading state. Once loaded it survives
/// unrelated server refreshes (the cache merge re-attaches it).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    pub id: ServerId,
    pub name: String,
    pub description: Option<String>,
    /// Icon reference (opaque remote handle).
    pub icon: Option<String>,
    /// Wallet address of the owner.
    pub owner: WalletAddress,
    #[serde(default)]
    pub channels: Vec<Channel>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<Member>>,
    #[serde(default)]
    pub member_state: MemberLoadState,
}

/// A text channel. Ordered within its server by `order`; `category_id` of
/// `None` means uncategorized.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub id: ChannelId,
    pub name: String,
    pub order: i64,
    pub category_id: Option<CategoryId>,
}

/// A channel category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub order: i64,
}

/// A role. Permission bits are carried verbatim; evaluation happens in the
/// UI layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub color: Option<String>,
    pub position: i64,
    #[serde(default)]
    pub permissions: u64,
}

/// A server member.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub address: WalletAddress,
    pub nickname: Option<String>,
    #[serde(default)]
    pub roles: Vec<RoleId>,
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A chat message, server channel or DM. Stored unordered per channel;
/// ordering is reconstructed from `timestamp` at read time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub author: WalletAddress,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub edited: bool,
    pub reply_to: Option<MessageId>,
}

// ---------------------------------------------------------------------------
// Friend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FriendStatus {
    Accepted,
    Sent,
    Received,
}

/// A friend relationship with another wallet, optionally carrying a
/// denormalized copy of that wallet's profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Friend {
    pub address: WalletAddress,
    pub status: FriendStatus,
    pub profile: Option<Profile>,
}

// ---------------------------------------------------------------------------
// DM conversation
// ---------------------------------------------------------------------------

/// A direct-message thread with one counterpart.
///
/// `dm_process` is always the *current* identity's own DM process handle,
/// never the counterpart's. A rehydrated conversation may carry a handle
/// from a previous session; it is overwritten on every message fetch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DmConversation {
    pub counterpart: WalletAddress,
    pub dm_process: String,
    #[serde(default)]
    pub messages: HashMap<MessageId, Message>,
}

impl DmConversation {
    pub fn new(counterpart: WalletAddress, dm_process: impl Into<String>) -> Self {
        Self {
            counterpart,
            dm_process: dm_process.into(),
            messages: HashMap::new(),
        }
    }
}

/// Order a message mapping by timestamp, oldest first.
pub fn sorted_by_timestamp(messages: &HashMap<MessageId, Message>) -> Vec<Message> {
    let mut out: Vec<Message> = messages.values().cloned().collect();
    out.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));
    out
}
