//! Client events broadcast to external subscribers (UI, analytics).
//!
//! The coordinator never consumes its own events; it is fine for nobody to
//! be listening.

use tokio::sync::broadcast;

use subspace_shared::types::WalletAddress;

/// Broadcast channel capacity. Subscribers that fall further behind than
/// this lose the oldest events.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// Fired with the new address whenever identity binding completes.
    IdentityChanged { address: WalletAddress },
    /// Fired after the cache has been fully cleared on disconnect.
    CacheCleared,
}

pub(crate) fn emit(sender: &broadcast::Sender<ClientEvent>, event: ClientEvent) {
    // Err means there are currently no subscribers, which is fine.
    if sender.send(event.clone()).is_err() {
        tracing::trace!(?event, "no subscribers for client event");
    }
}
