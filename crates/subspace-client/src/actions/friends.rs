//! Friend graph derivation and friend mutations.
//!
//! The friend list is not a first-class remote collection; it is derived
//! from the own profile's relationship graph, with each counterpart's
//! profile fetched for denormalized display data. Friend mutations edit the
//! graph remotely and settle through a delayed own-profile refetch.

use subspace_shared::types::WalletAddress;
use subspace_store::models::{Friend, FriendStatus, Profile};
use subspace_store::GuardKind;

use crate::client::Client;

impl Client {
    /// Rebuild the friend mapping from the cached own profile's graph.
    ///
    /// Counterpart profiles already in cache are reused; missing ones are
    /// fetched (guarded per counterpart, cache-or-skip). Returns the
    /// rebuilt list.
    pub async fn fetch_friends(&self) -> Vec<Friend> {
        if !self.is_bound() {
            return Vec::new();
        }
        let Some(profile) = self.cache().own_profile() else {
            return Vec::new();
        };

        let graph = profile.friends;
        let mut friends = Vec::new();
        for (status, addresses) in [
            (FriendStatus::Accepted, graph.accepted),
            (FriendStatus::Sent, graph.sent),
            (FriendStatus::Received, graph.received),
        ] {
            for address in addresses {
                let profile = self.fetch_counterpart_profile(&address).await;
                friends.push(Friend {
                    address,
                    status,
                    profile,
                });
            }
        }

        self.cache().set_friends(friends.clone());
        friends
    }

    async fn fetch_counterpart_profile(&self, address: &WalletAddress) -> Option<Profile> {
        if let Some(profile) = self.cache().profile(address) {
            return Some(profile);
        }

        let Some(_guard) = self
            .cache()
            .guards()
            .try_acquire(GuardKind::Friend, address.as_str())
        else {
            return self
                .cache()
                .friend(address)
                .and_then(|friend| friend.profile);
        };

        match self.remote().get_profile(address).await {
            Ok(profile) => {
                self.cache().put_profile(profile.clone());
                Some(profile)
            }
            Err(e) => {
                tracing::debug!(address = address.short(), error = %e, "counterpart profile fetch failed");
                None
            }
        }
    }

    /// Send a friend request. The graph change appears with the delayed
    /// own-profile refetch.
    pub async fn send_friend_request(&self, to: &WalletAddress) -> bool {
        if !self.is_bound() {
            return false;
        }
        match self.remote().send_friend_request(to).await {
            Ok(()) => {
                self.schedule_profile_refetch();
                true
            }
            Err(e) => {
                tracing::warn!(to = to.short(), error = %e, "friend request failed");
                false
            }
        }
    }

    /// Accept a received friend request.
    pub async fn accept_friend_request(&self, from: &WalletAddress) -> bool {
        if !self.is_bound() {
            return false;
        }
        match self.remote().accept_friend_request(from).await {
            Ok(()) => {
                self.schedule_profile_refetch();
                true
            }
            Err(e) => {
                tracing::warn!(from = from.short(), error = %e, "friend accept failed");
                false
            }
        }
    }

    /// Remove a friend (or withdraw/decline a pending request).
    pub async fn remove_friend(&self, address: &WalletAddress) -> bool {
        if !self.is_bound() {
            return false;
        }
        match self.remote().remove_friend(address).await {
            Ok(()) => {
                self.schedule_profile_refetch();
                true
            }
            Err(e) => {
                tracing::warn!(address = address.short(), error = %e, "friend removal failed");
                false
            }
        }
    }
}
