//! Direct-message fetches and sends.
//!
//! Every DM read and write goes through the bound identity's *own* DM
//! process handle, taken from the own profile. Cached conversations may
//! carry a stale handle (rehydrated from a previous session or identity);
//! it is corrected in place on every fetch, never raised as an error.

use subspace_shared::types::WalletAddress;
use subspace_store::models::Message;
use subspace_store::GuardKind;

use crate::client::Client;

impl Client {
    /// Fetch the conversation with `counterpart` and upsert its messages.
    ///
    /// Returns the conversation's cached messages ordered oldest-first,
    /// whether or not this call reached the remote service (cache-or-skip).
    pub async fn fetch_dm_messages(&self, counterpart: &WalletAddress) -> Vec<Message> {
        if !self.is_bound() {
            return Vec::new();
        }
        let Some(own_process) = self.own_dm_process() else {
            tracing::debug!("own profile has no DM process yet, skipping DM fetch");
            return self.cached_dm_messages(counterpart);
        };

        let Some(_guard) = self
            .cache()
            .guards()
            .try_acquire(GuardKind::Dm, counterpart.as_str())
        else {
            return self.cached_dm_messages(counterpart);
        };

        match self
            .remote()
            .list_dm_messages(&own_process, counterpart)
            .await
        {
            Ok(incoming) => {
                self.cache()
                    .merge_dm_messages(counterpart, &own_process, incoming);
            }
            Err(e) => {
                tracing::warn!(counterpart = counterpart.short(), error = %e, "DM fetch failed");
            }
        }

        self.cached_dm_messages(counterpart)
    }

    /// Send a direct message. The message appears with the settle refetch.
    pub async fn send_dm(&self, counterpart: &WalletAddress, content: impl Into<String>) -> bool {
        if !self.is_bound() {
            return false;
        }
        let Some(own_process) = self.own_dm_process() else {
            tracing::warn!("cannot send DM without an own DM process");
            return false;
        };

        match self
            .remote()
            .send_dm(&own_process, counterpart, &content.into())
            .await
        {
            Ok(()) => {
                self.schedule_dm_refetch(counterpart);
                true
            }
            Err(e) => {
                tracing::warn!(counterpart = counterpart.short(), error = %e, "DM send failed");
                false
            }
        }
    }

    fn own_dm_process(&self) -> Option<String> {
        self.cache().own_profile()?.dm_process
    }

    fn cached_dm_messages(&self, counterpart: &WalletAddress) -> Vec<Message> {
        self.cache()
            .dm_conversation(counterpart)
            .map(|conversation| subspace_store::models::sorted_by_timestamp(&conversation.messages))
            .unwrap_or_default()
    }

    fn schedule_dm_refetch(&self, counterpart: &WalletAddress) {
        let client = self.clone();
        let counterpart = counterpart.clone();
        let generation = self.generation();
        let delay = self.config().message_refetch_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if !client.generation_is(generation) {
                return;
            }
            client.fetch_dm_messages(&counterpart).await;
        });
    }
}
