//! Background pollers and active-selection tracking.
//!
//! Two pollers keep the view fresh while the app is idle: a slow self-profile
//! poll while a wallet is bound, and a fast message poll for the active
//! channel. Cancellation is cooperative: each task captures the liveness
//! generation (and, for the message poll, the poll epoch) at spawn and
//! exits at the first tick where either has moved on.

use subspace_shared::types::{ChannelId, ServerId, WalletAddress};

use crate::client::Client;

impl Client {
    /// Start the self-profile poller for the current binding.
    pub(crate) fn spawn_profile_poll(&self) {
        let client = self.clone();
        let generation = self.generation();
        let interval = self.config().profile_poll_interval;
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                if !client.generation_is(generation) {
                    tracing::debug!("profile poll stopped");
                    return;
                }
                if client.fetch_own_profile().await.is_none() {
                    tracing::debug!("profile poll tick failed");
                }
            }
        });
    }

    /// Select the active channel, persist the selection, and restart the
    /// message poller on it. `None` stops the poller.
    pub fn set_active_channel(&self, server: Option<ServerId>, channel: Option<ChannelId>) {
        // Retire whatever poller is currently running.
        self.advance_poll_epoch();

        self.update_ui_state(|ui| {
            ui.active_server_id = server.clone();
            ui.active_channel_id = channel.clone();
            if let (Some(server), Some(channel)) = (&server, &channel) {
                ui.last_channel_by_server
                    .insert(server.clone(), channel.clone());
            }
        });

        if let (Some(server), Some(channel)) = (server, channel) {
            self.spawn_message_poll(server, channel);
        }
    }

    /// Select the active friend (DM view), persisting the selection.
    pub fn set_active_friend(&self, friend: Option<WalletAddress>) {
        self.update_ui_state(|ui| {
            ui.active_friend_id = friend;
        });
    }

    /// The last channel the user had open on `server`, if any.
    pub fn last_channel_for(&self, server: &ServerId) -> Option<ChannelId> {
        self.ui_state().last_channel_by_server.get(server).cloned()
    }

    fn spawn_message_poll(&self, server: ServerId, channel: ChannelId) {
        let client = self.clone();
        let generation = self.generation();
        let epoch = self.poll_epoch();
        let interval = self.config().message_poll_interval;
        tokio::spawn(async move {
            tracing::debug!(channel = %channel, "message poll started");
            loop {
                tokio::time::sleep(interval).await;
                if !client.generation_is(generation) || client.poll_epoch() != epoch {
                    tracing::debug!(channel = %channel, "message poll stopped");
                    return;
                }
                client.fetch_messages(&server, &channel).await;
            }
        });
    }
}
