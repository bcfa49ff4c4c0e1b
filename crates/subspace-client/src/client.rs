//! The client context shared across all coordinator operations.
//!
//! [`Client`] is constructed once at process start and cloned freely; all
//! clones share the same cache, binding and event channel. Nothing here is
//! a process-wide global, so every test builds its own instance.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;

use subspace_remote::RemoteService;
use subspace_shared::types::WalletAddress;
use subspace_shared::wallet::WalletIdentity;
use subspace_store::{CacheStore, LocalStore, StoreError, UiState};

use crate::binding::WalletBinding;
use crate::config::ClientConfig;
use crate::events::{ClientEvent, EVENT_CHANNEL_CAPACITY};

/// Central coordinator context.
///
/// Cheap to clone; background tasks capture a clone and check the liveness
/// generation at every tick so unbinding cancels them cooperatively.
#[derive(Clone)]
pub struct Client {
    remote: Arc<dyn RemoteService>,
    cache: Arc<CacheStore>,
    storage: Option<Arc<LocalStore>>,
    config: Arc<ClientConfig>,
    binding: Arc<Mutex<WalletBinding>>,
    ui: Arc<Mutex<UiState>>,
    events: broadcast::Sender<ClientEvent>,
    /// Bumped on every bind/unbind; background tasks stop when it moves.
    generation: Arc<AtomicU64>,
    /// Bumped when the active channel changes; restarts the message poll.
    poll_epoch: Arc<AtomicU64>,
}

impl Client {
    /// Create a client without durable storage (nothing persists across
    /// restarts).
    pub fn new(remote: Arc<dyn RemoteService>, config: ClientConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            remote,
            cache: Arc::new(CacheStore::new()),
            storage: None,
            config: Arc::new(config),
            binding: Arc::new(Mutex::new(WalletBinding::Unbound)),
            ui: Arc::new(Mutex::new(UiState::default())),
            events,
            generation: Arc::new(AtomicU64::new(0)),
            poll_epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Create a client backed by a local document store.
    pub fn with_storage(
        remote: Arc<dyn RemoteService>,
        storage: Arc<LocalStore>,
        config: ClientConfig,
    ) -> Self {
        let mut client = Self::new(remote, config);
        client.storage = Some(storage);
        client
    }

    // -- Accessors ----------------------------------------------------------

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub fn remote(&self) -> &dyn RemoteService {
        self.remote.as_ref()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn storage(&self) -> Option<&LocalStore> {
        self.storage.as_deref()
    }

    /// Subscribe to client events.
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    pub(crate) fn event_sender(&self) -> &broadcast::Sender<ClientEvent> {
        &self.events
    }

    // -- Identity -----------------------------------------------------------

    pub(crate) fn binding(&self) -> std::sync::MutexGuard<'_, WalletBinding> {
        self.binding.lock().expect("wallet binding poisoned")
    }

    /// The bound identity, if any.
    pub fn identity(&self) -> Option<WalletIdentity> {
        self.binding().identity().cloned()
    }

    /// The bound account address, if any.
    pub fn current_address(&self) -> Option<WalletAddress> {
        self.identity().map(|identity| identity.address)
    }

    pub fn is_bound(&self) -> bool {
        self.identity().is_some()
    }

    // -- Liveness -----------------------------------------------------------

    pub(crate) fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub(crate) fn generation_is(&self, generation: u64) -> bool {
        self.generation() == generation
    }

    pub(crate) fn advance_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) fn poll_epoch(&self) -> u64 {
        self.poll_epoch.load(Ordering::SeqCst)
    }

    pub(crate) fn advance_poll_epoch(&self) -> u64 {
        self.poll_epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    // -- UI state -----------------------------------------------------------

    pub fn ui_state(&self) -> UiState {
        self.ui.lock().expect("ui state poisoned").clone()
    }

    pub(crate) fn update_ui_state(&self, apply: impl FnOnce(&mut UiState)) {
        let snapshot = {
            let mut ui = self.ui.lock().expect("ui state poisoned");
            apply(&mut ui);
            ui.clone()
        };
        if let Some(storage) = self.storage() {
            if let Err(e) = storage.save_ui_state(&snapshot) {
                tracing::warn!(error = %e, "failed to persist UI state");
            }
        }
    }

    // -- Persistence --------------------------------------------------------

    /// Populate cache and UI state from durable storage without contacting
    /// the remote service. Returns whether a cache document was loaded.
    pub fn hydrate(&self) -> Result<bool, StoreError> {
        let Some(storage) = self.storage() else {
            return Ok(false);
        };

        let loaded = self.cache.load(storage)?;
        let ui = storage.ui_state()?;
        *self.ui.lock().expect("ui state poisoned") = ui;

        tracing::info!(
            loaded,
            servers = self.cache.server_count(),
            "hydrated from local storage"
        );
        Ok(loaded)
    }

    /// Write the persisted subset of the cache to durable storage. A no-op
    /// without storage.
    pub fn save(&self) -> Result<(), StoreError> {
        match self.storage() {
            Some(storage) => self.cache.save(storage),
            None => Ok(()),
        }
    }
}
