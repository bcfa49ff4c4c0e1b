//! In-flight fetch deduplication.
//!
//! The [`GuardRegistry`] records which entity keys currently have a fetch in
//! flight. A caller that fails to acquire a guard does not wait for the other
//! fetch; it falls back to whatever the cache holds (cache-or-skip). Guards
//! release themselves on drop, so release is guaranteed on success, failure
//! and panic paths alike.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Entity kinds tracked by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuardKind {
    Profile,
    Server,
    Friend,
    Dm,
}

/// Registry of in-flight fetch keys, one set per [`GuardKind`].
///
/// Cheap to clone; all clones share the same key sets.
#[derive(Clone, Default)]
pub struct GuardRegistry {
    inflight: Arc<Mutex<HashMap<GuardKind, HashSet<String>>>>,
}

impl GuardRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `key` as in flight and return a guard that releases it on drop.
    /// Returns `None` if a fetch for the same key is already in flight.
    pub fn try_acquire(&self, kind: GuardKind, key: impl Into<String>) -> Option<LoadGuard> {
        let key = key.into();
        let mut inflight = self.inflight.lock().expect("guard registry poisoned");
        let set = inflight.entry(kind).or_default();
        if !set.insert(key.clone()) {
            return None;
        }
        Some(LoadGuard {
            registry: self.clone(),
            kind,
            key,
        })
    }

    /// Whether a fetch for `key` is currently in flight.
    pub fn is_inflight(&self, kind: GuardKind, key: &str) -> bool {
        let inflight = self.inflight.lock().expect("guard registry poisoned");
        inflight.get(&kind).is_some_and(|set| set.contains(key))
    }

    /// Drop every in-flight record of one kind. Any outstanding [`LoadGuard`]
    /// of that kind becomes a no-op on drop.
    pub fn clear_kind(&self, kind: GuardKind) {
        let mut inflight = self.inflight.lock().expect("guard registry poisoned");
        inflight.remove(&kind);
    }

    /// Drop every in-flight record.
    pub fn clear_all(&self) {
        let mut inflight = self.inflight.lock().expect("guard registry poisoned");
        inflight.clear();
    }

    fn release(&self, kind: GuardKind, key: &str) {
        let mut inflight = self.inflight.lock().expect("guard registry poisoned");
        if let Some(set) = inflight.get_mut(&kind) {
            set.remove(key);
        }
    }
}

/// Scoped in-flight token returned by [`GuardRegistry::try_acquire`].
pub struct LoadGuard {
    registry: GuardRegistry,
    kind: GuardKind,
    key: String,
}

impl Drop for LoadGuard {
    fn drop(&mut self) {
        self.registry.release(self.kind, &self.key);
    }
}
