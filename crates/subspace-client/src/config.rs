//! Client configuration loaded from environment variables.
//!
//! All settings have defaults from [`subspace_shared::constants`], so the
//! client starts with zero configuration. The refetch settle delays are
//! empirically chosen workarounds for the remote service's propagation lag;
//! they are tunables, not guarantees.

use std::time::Duration;

use subspace_shared::constants;

/// Timing configuration for the coordinator.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Settle delay before refetching a server after a structural write
    /// (channel / category / role / member mutations).
    /// Env: `SUBSPACE_STRUCTURAL_REFETCH_MS`
    /// Default: 200 ms
    pub structural_refetch_delay: Duration,

    /// Settle delay before refetching a channel's messages after a message
    /// write.
    /// Env: `SUBSPACE_MESSAGE_REFETCH_MS`
    /// Default: 500 ms
    pub message_refetch_delay: Duration,

    /// Pause between items of the joined-server background walk.
    /// Env: `SUBSPACE_WALK_DELAY_MS`
    /// Default: 100 ms
    pub server_walk_delay: Duration,

    /// Self-profile poll interval while a wallet is bound.
    /// Env: `SUBSPACE_PROFILE_POLL_SECS`
    /// Default: 20 s
    pub profile_poll_interval: Duration,

    /// Active-channel message poll interval.
    /// Env: `SUBSPACE_MESSAGE_POLL_MS`
    /// Default: 1 s
    pub message_poll_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            structural_refetch_delay: Duration::from_millis(
                constants::STRUCTURAL_REFETCH_DELAY_MS,
            ),
            message_refetch_delay: Duration::from_millis(constants::MESSAGE_REFETCH_DELAY_MS),
            server_walk_delay: Duration::from_millis(constants::SERVER_WALK_DELAY_MS),
            profile_poll_interval: Duration::from_secs(constants::PROFILE_POLL_INTERVAL_SECS),
            message_poll_interval: Duration::from_millis(constants::MESSAGE_POLL_INTERVAL_MS),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(ms) = env_u64("SUBSPACE_STRUCTURAL_REFETCH_MS") {
            config.structural_refetch_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = env_u64("SUBSPACE_MESSAGE_REFETCH_MS") {
            config.message_refetch_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = env_u64("SUBSPACE_WALK_DELAY_MS") {
            config.server_walk_delay = Duration::from_millis(ms);
        }
        if let Some(secs) = env_u64("SUBSPACE_PROFILE_POLL_SECS") {
            config.profile_poll_interval = Duration::from_secs(secs);
        }
        if let Some(ms) = env_u64("SUBSPACE_MESSAGE_POLL_MS") {
            config.message_poll_interval = Duration::from_millis(ms);
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }
}

fn env_u64(name: &str) -> Option<u64> {
    let value = std::env::var(name).ok()?;
    match value.parse::<u64>() {
        Ok(n) => Some(n),
        Err(_) => {
            tracing::warn!(var = name, value = %value, "ignoring non-numeric override");
            None
        }
    }
}
