//! The entity cache.
//!
//! [`CacheStore`] owns the local copy of every remote entity, plus the
//! in-flight guard registry as a side table. It is constructed once at
//! process start and shared via `Arc`; all mutation goes through its typed
//! operations so the merge policy is always applied.
//!
//! Reads never block and never trigger fetches. Absence returns `None`;
//! fetching is the action layer's job.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use subspace_shared::types::{ChannelId, MessageId, ServerId, WalletAddress};

use crate::guards::{GuardKind, GuardRegistry};
use crate::models::{
    sorted_by_timestamp, DmConversation, Friend, Member, MemberLoadState, Message, Profile, Server,
};

#[derive(Default)]
pub(crate) struct CacheInner {
    pub(crate) servers: HashMap<ServerId, Server>,
    pub(crate) messages: HashMap<ChannelId, HashMap<MessageId, Message>>,
    /// The bound identity's own profile.
    pub(crate) profile: Option<Profile>,
    pub(crate) profiles: HashMap<WalletAddress, Profile>,
    pub(crate) friends: HashMap<WalletAddress, Friend>,
    pub(crate) dm_conversations: HashMap<WalletAddress, DmConversation>,
}

pub struct CacheStore {
    inner: Mutex<CacheInner>,
    guards: GuardRegistry,
}

impl CacheStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(CacheInner::default()),
            guards: GuardRegistry::new(),
        }
    }

    /// The in-flight guard registry owned by this store.
    pub fn guards(&self) -> &GuardRegistry {
        &self.guards
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, CacheInner> {
        self.inner.lock().expect("cache store poisoned")
    }

    // -- Servers ------------------------------------------------------------

    pub fn server(&self, id: &ServerId) -> Option<Server> {
        self.lock().servers.get(id).cloned()
    }

    pub fn server_count(&self) -> usize {
        self.lock().servers.len()
    }

    /// Replace a server entry wholesale, bypassing the merge policy. Only
    /// correct when the caller knows `server` carries every preservable
    /// substructure (e.g. after `attach_members`).
    pub fn put_server(&self, server: Server) {
        self.lock().servers.insert(server.id.clone(), server);
    }

    /// Merge a freshly fetched server into the cache.
    ///
    /// A fetched entry usually carries no member list (members load
    /// out-of-band). If the cached entry already has members, the merged
    /// result keeps them and their loading state; every other field takes
    /// the incoming value.
    pub fn merge_server(&self, mut incoming: Server) {
        let mut inner = self.lock();
        if incoming.members.is_some() {
            incoming.member_state = MemberLoadState::Loaded;
        } else if let Some(existing) = inner.servers.get(&incoming.id) {
            if existing.members.is_some() {
                incoming.members = existing.members.clone();
                incoming.member_state = existing.member_state;
            }
        }
        inner.servers.insert(incoming.id.clone(), incoming);
    }

    pub fn remove_server(&self, id: &ServerId) {
        self.lock().servers.remove(id);
    }

    pub fn set_member_state(&self, id: &ServerId, state: MemberLoadState) {
        if let Some(server) = self.lock().servers.get_mut(id) {
            server.member_state = state;
        }
    }

    /// Attach an out-of-band loaded member list to a cached server.
    pub fn attach_members(&self, id: &ServerId, members: Vec<Member>) {
        if let Some(server) = self.lock().servers.get_mut(id) {
            server.members = Some(members);
            server.member_state = MemberLoadState::Loaded;
        }
    }

    // -- Messages -----------------------------------------------------------

    pub fn channel_messages(&self, channel: &ChannelId) -> HashMap<MessageId, Message> {
        self.lock().messages.get(channel).cloned().unwrap_or_default()
    }

    /// Messages of one channel ordered oldest-first.
    pub fn channel_messages_sorted(&self, channel: &ChannelId) -> Vec<Message> {
        self.lock()
            .messages
            .get(channel)
            .map(sorted_by_timestamp)
            .unwrap_or_default()
    }

    pub fn message(&self, channel: &ChannelId, id: &MessageId) -> Option<Message> {
        self.lock()
            .messages
            .get(channel)
            .and_then(|m| m.get(id))
            .cloned()
    }

    /// Upsert fetched messages into a channel's mapping by message id.
    ///
    /// The mapping is never replaced wholesale, so concurrent fetches of
    /// overlapping ranges are idempotent.
    pub fn upsert_messages(&self, channel: &ChannelId, incoming: Vec<Message>) {
        let mut inner = self.lock();
        let map = inner.messages.entry(channel.clone()).or_default();
        for message in incoming {
            map.insert(message.id.clone(), message);
        }
    }

    /// Optimistic local patch applied before an edit's authoritative
    /// refetch lands. Returns false if the message is not cached.
    pub fn patch_message_edited(&self, channel: &ChannelId, id: &MessageId, content: &str) -> bool {
        let mut inner = self.lock();
        match inner.messages.get_mut(channel).and_then(|m| m.get_mut(id)) {
            Some(message) => {
                message.content = content.to_string();
                message.edited = true;
                true
            }
            None => false,
        }
    }

    /// Optimistic local removal applied before a delete's authoritative
    /// refetch lands. Returns false if the message is not cached.
    pub fn remove_message(&self, channel: &ChannelId, id: &MessageId) -> bool {
        let mut inner = self.lock();
        inner
            .messages
            .get_mut(channel)
            .is_some_and(|m| m.remove(id).is_some())
    }

    // -- Profiles -----------------------------------------------------------

    pub fn own_profile(&self) -> Option<Profile> {
        self.lock().profile.clone()
    }

    /// Store the bound identity's own profile. Also mirrored into the
    /// by-address profile mapping.
    pub fn set_own_profile(&self, profile: Profile) {
        let mut inner = self.lock();
        inner
            .profiles
            .insert(profile.address.clone(), profile.clone());
        inner.profile = Some(profile);
    }

    pub fn profile(&self, address: &WalletAddress) -> Option<Profile> {
        self.lock().profiles.get(address).cloned()
    }

    pub fn put_profile(&self, profile: Profile) {
        let mut inner = self.lock();
        // Keep the own-profile pointer coherent with the mapping.
        if inner
            .profile
            .as_ref()
            .is_some_and(|own| own.address == profile.address)
        {
            inner.profile = Some(profile.clone());
        }
        inner.profiles.insert(profile.address.clone(), profile);
    }

    // -- Friends ------------------------------------------------------------

    pub fn friend(&self, address: &WalletAddress) -> Option<Friend> {
        self.lock().friends.get(address).cloned()
    }

    pub fn friends(&self) -> Vec<Friend> {
        self.lock().friends.values().cloned().collect()
    }

    pub fn put_friend(&self, friend: Friend) {
        self.lock().friends.insert(friend.address.clone(), friend);
    }

    pub fn remove_friend(&self, address: &WalletAddress) {
        self.lock().friends.remove(address);
    }

    /// Replace the whole friend mapping with one derived from a fresh
    /// profile fetch. Friends carry no preservable substructure.
    pub fn set_friends(&self, friends: Vec<Friend>) {
        let mut inner = self.lock();
        inner.friends = friends
            .into_iter()
            .map(|f| (f.address.clone(), f))
            .collect();
    }

    // -- DM conversations ---------------------------------------------------

    pub fn dm_conversation(&self, counterpart: &WalletAddress) -> Option<DmConversation> {
        self.lock().dm_conversations.get(counterpart).cloned()
    }

    pub fn dm_conversations(&self) -> Vec<DmConversation> {
        self.lock().dm_conversations.values().cloned().collect()
    }

    pub fn put_dm_conversation(&self, conversation: DmConversation) {
        self.lock()
            .dm_conversations
            .insert(conversation.counterpart.clone(), conversation);
    }

    /// Upsert fetched DM messages for one counterpart.
    ///
    /// `own_process` is the current identity's DM process handle. It is
    /// written unconditionally: a rehydrated conversation may still carry a
    /// previous identity's handle, which must never be used for sends.
    pub fn merge_dm_messages(
        &self,
        counterpart: &WalletAddress,
        own_process: &str,
        incoming: Vec<Message>,
    ) {
        let mut inner = self.lock();
        let conversation = inner
            .dm_conversations
            .entry(counterpart.clone())
            .or_insert_with(|| DmConversation::new(counterpart.clone(), own_process));
        conversation.dm_process = own_process.to_string();
        for message in incoming {
            conversation.messages.insert(message.id.clone(), message);
        }
    }

    // -- Lifecycle ----------------------------------------------------------

    /// Clear everything scoped to the bound identity: friends, DM
    /// conversations, the own-profile pointer, and the in-flight guards of
    /// those kinds. Server and by-address profile caches survive; they are
    /// not identity secrets.
    pub fn clear_identity_scoped(&self) {
        {
            let mut inner = self.lock();
            inner.friends.clear();
            inner.dm_conversations.clear();
            inner.profile = None;
        }
        self.guards.clear_kind(GuardKind::Friend);
        self.guards.clear_kind(GuardKind::Dm);
        tracing::debug!("cleared identity-scoped cache entries");
    }

    /// Empty every mapping and every guard set.
    pub fn clear_all(&self) {
        {
            let mut inner = self.lock();
            *inner = CacheInner::default();
        }
        self.guards.clear_all();
        tracing::debug!("cleared entire cache");
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new()
    }
}
