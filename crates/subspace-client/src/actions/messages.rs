//! Channel message fetches and mutations.
//!
//! Message writes use the longer settle delay: message propagation inside
//! the remote service is slower than structural metadata. Edits and
//! deletions additionally patch the cache synchronously so the UI reflects
//! the change before the authoritative refetch lands; the refetch may
//! overwrite the patch.

use subspace_remote::SendMessage;
use subspace_shared::types::{ChannelId, MessageId, ServerId};
use subspace_store::models::Message;
use subspace_store::GuardKind;

use crate::client::Client;

impl Client {
    /// Fetch a channel's messages and upsert them into the cache.
    ///
    /// Returns the channel's cached messages ordered oldest-first, whether
    /// or not this call reached the remote service (cache-or-skip; channel
    /// keys share the server guard set, the id spaces are disjoint).
    pub async fn fetch_messages(&self, server: &ServerId, channel: &ChannelId) -> Vec<Message> {
        let Some(_guard) = self
            .cache()
            .guards()
            .try_acquire(GuardKind::Server, channel.as_str())
        else {
            return self.cache().channel_messages_sorted(channel);
        };

        match self.remote().list_messages(server, channel).await {
            Ok(incoming) => self.cache().upsert_messages(channel, incoming),
            Err(e) => {
                tracing::warn!(channel = %channel, error = %e, "message fetch failed");
            }
        }

        self.cache().channel_messages_sorted(channel)
    }

    /// Send a message. No optimistic insert: the remote service assigns the
    /// id, so the message appears with the settle refetch.
    pub async fn send_message(
        &self,
        server: &ServerId,
        channel: &ChannelId,
        content: impl Into<String>,
        reply_to: Option<MessageId>,
    ) -> bool {
        if !self.is_bound() {
            return false;
        }

        let send = SendMessage {
            content: content.into(),
            reply_to,
        };
        match self.remote().send_message(server, channel, send).await {
            Ok(()) => {
                self.schedule_messages_refetch(server, channel);
                true
            }
            Err(e) => {
                tracing::warn!(channel = %channel, error = %e, "message send failed");
                false
            }
        }
    }

    /// Edit a message. On success the cached copy is patched immediately
    /// (`edited` flag + new content) and the authoritative refetch is
    /// scheduled.
    pub async fn edit_message(
        &self,
        server: &ServerId,
        channel: &ChannelId,
        message: &MessageId,
        content: &str,
    ) -> bool {
        if !self.is_bound() {
            return false;
        }

        match self
            .remote()
            .edit_message(server, channel, message, content)
            .await
        {
            Ok(()) => {
                self.cache().patch_message_edited(channel, message, content);
                self.schedule_messages_refetch(server, channel);
                true
            }
            Err(e) => {
                tracing::warn!(channel = %channel, message = %message, error = %e, "message edit failed");
                false
            }
        }
    }

    /// Delete a message. On success the cached copy is removed immediately
    /// and the authoritative refetch is scheduled.
    pub async fn delete_message(
        &self,
        server: &ServerId,
        channel: &ChannelId,
        message: &MessageId,
    ) -> bool {
        if !self.is_bound() {
            return false;
        }

        match self.remote().delete_message(server, channel, message).await {
            Ok(()) => {
                self.cache().remove_message(channel, message);
                self.schedule_messages_refetch(server, channel);
                true
            }
            Err(e) => {
                tracing::warn!(channel = %channel, message = %message, error = %e, "message deletion failed");
                false
            }
        }
    }

    /// Schedule a delayed forced refetch of a channel's messages.
    pub(crate) fn schedule_messages_refetch(&self, server: &ServerId, channel: &ChannelId) {
        let client = self.clone();
        let server = server.clone();
        let channel = channel.clone();
        let generation = self.generation();
        let delay = self.config().message_refetch_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if !client.generation_is(generation) {
                return;
            }
            client.fetch_messages(&server, &channel).await;
        });
    }
}
