use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dashmap::DashMap;
use tokio::task::AbortHandle;

use liftcast_core::Platform;

/// Whether resolving an unknown platform name should remember it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retention {
    /// Store the new platform; used by controller events.
    Persist,
    /// Hand out a throwaway default platform; used by display reads so
    /// arbitrary names never end up in the registry.
    Ephemeral,
}

/// A platform plus the bookkeeping that guards it.
pub struct PlatformSlot {
    name: String,
    platform: Mutex<Platform>,
    jury_timer: Mutex<Option<AbortHandle>>,
}

impl PlatformSlot {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            platform: Mutex::new(Platform::new(name)),
            jury_timer: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lock the platform. Mutators never leave it half-updated, so a
    /// poisoned lock is still safe to use.
    pub(crate) fn lock(&self) -> MutexGuard<'_, Platform> {
        self.platform.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Install the pending jury expiry, cancelling the previous one.
    pub(crate) fn replace_jury_timer(&self, handle: AbortHandle) {
        let mut timer = self
            .jury_timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = timer.replace(handle) {
            previous.abort();
        }
    }
}

/// Platforms known to this process, keyed by case-sensitive name.
#[derive(Default)]
pub struct PlatformRegistry {
    platforms: DashMap<String, Arc<PlatformSlot>>,
}

impl PlatformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a platform, creating a default one when the name is unknown.
    /// Only [`Retention::Persist`] stores the new platform.
    pub fn resolve(&self, name: &str, retention: Retention) -> Arc<PlatformSlot> {
        if let Some(slot) = self.get(name) {
            return slot;
        }

        match retention {
            Retention::Persist => {
                let entry = self.platforms.entry(name.to_string()).or_insert_with(|| {
                    tracing::info!(platform = name, "Registered new platform");
                    Arc::new(PlatformSlot::new(name))
                });
                Arc::clone(entry.value())
            }
            Retention::Ephemeral => Arc::new(PlatformSlot::new(name)),
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<PlatformSlot>> {
        self.platforms.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// Names of persisted platforms, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .platforms
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }
}
