/// Application name
pub const APP_NAME: &str = "Subspace";

/// Key of the persisted wallet-connection document
pub const DOC_WALLET_CONNECTION: &str = "wallet-connection";

/// Key of the persisted entity-cache document
pub const DOC_CACHE: &str = "subspace-cache";

/// Key of the persisted UI-state document
pub const DOC_UI_STATE: &str = "global-ui-state";

/// Delay between items of the joined-server background walk, in milliseconds.
/// Keeps the walk from bursting the remote service.
pub const SERVER_WALK_DELAY_MS: u64 = 100;

/// Settle delay before refetching a server after a structural write
/// (channel / category / role / member mutations), in milliseconds.
pub const STRUCTURAL_REFETCH_DELAY_MS: u64 = 200;

/// Settle delay before refetching a channel's messages after a message
/// write, in milliseconds.
pub const MESSAGE_REFETCH_DELAY_MS: u64 = 500;

/// Self-profile poll interval while a wallet is bound, in seconds.
pub const PROFILE_POLL_INTERVAL_SECS: u64 = 20;

/// Active-channel message poll interval, in milliseconds.
pub const MESSAGE_POLL_INTERVAL_MS: u64 = 1_000;
