//! Sequential joined-server background loader.
//!
//! Bursting N concurrent server fetches against the rate-sensitive remote
//! service gets the client throttled, so the walk goes one server at a
//! time with a pause between items, trading latency for reliability.
//!
//! The walk runs over a snapshot of the joined-server list and is restarted
//! by any later profile refresh. Overlapping walks are tolerated rather
//! than deduplicated; the per-server fetches inside are already collapsed
//! by the guard registry.

use subspace_store::models::{Profile, ServerRef};

use crate::client::Client;

impl Client {
    /// Start a background walk over `profile`'s joined-server list.
    pub(crate) fn spawn_server_walk(&self, profile: &Profile) {
        let refs = profile.joined_servers.clone();
        if refs.is_empty() {
            return;
        }

        let client = self.clone();
        let generation = self.generation();
        tokio::spawn(async move {
            client.walk_joined_servers(refs, generation).await;
        });
    }

    /// Force-refresh every resolvable entry of a joined-server snapshot,
    /// one at a time. Stops early only when `generation` is superseded
    /// (unbind or rebind); individual failures are logged and skipped.
    pub(crate) async fn walk_joined_servers(&self, refs: Vec<ServerRef>, generation: u64) {
        tracing::debug!(count = refs.len(), "starting joined-server walk");

        for (index, server_ref) in refs.iter().enumerate() {
            if !self.generation_is(generation) {
                tracing::debug!(index, "joined-server walk cancelled");
                return;
            }

            let Some(id) = server_ref.server_id() else {
                tracing::debug!(index, "skipping joined-server entry without id");
                continue;
            };

            if self.fetch_server(id, true).await.is_none() {
                tracing::warn!(server = %id, index, "joined-server fetch failed, continuing walk");
            }

            tokio::time::sleep(self.config().server_walk_delay).await;
        }

        tracing::debug!(count = refs.len(), "joined-server walk complete");
    }
}
