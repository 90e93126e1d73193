//! Access to the per-target configuration cache.
//!
//! The cache owns its entries; the handler only borrows an `Arc` for the
//! duration of one request. Serialising concurrent writers to the same
//! entry is the cache's job, not the caller's.

mod memory;

pub use memory::{ConfigEntry, InMemoryCache};

use crate::key::NamespacedName;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("no cache entry for '{0}'")]
    NotFound(NamespacedName),

    #[error("Lock poisoned")]
    LockPoisoned,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EntryError {
    #[error("cache entry '{0}' is frozen by reconciliation")]
    Frozen(NamespacedName),

    #[error("Lock poisoned")]
    LockPoisoned,
}

/// One cached configuration entry (one device, one origin).
pub trait CacheEntry: Send + Sync {
    fn name(&self) -> &NamespacedName;

    /// JSON schema the entry's configuration must satisfy, if any.
    fn schema(&self) -> Option<&Value>;

    /// Snapshot of the current running configuration.
    fn running_config(&self) -> Value;

    /// True when cached state has diverged from the last device-applied state.
    fn system_cache_status(&self) -> bool;

    fn set_system_cache_status(&self, dirty: bool) -> Result<(), EntryError>;

    /// Fail early if a following [`commit`](Self::commit) would be refused.
    fn check_writable(&self) -> Result<(), EntryError> {
        Ok(())
    }

    /// Store a validated candidate as the running config and mark the entry
    /// dirty, as one step. Either both happen or neither does.
    fn commit(&self, config: Value) -> Result<(), EntryError>;

    /// Put back a config and status captured before a commit.
    fn restore(&self, config: Value, dirty: bool) -> Result<(), EntryError>;
}

/// Lookup capability injected into the handler.
pub trait CacheEntryGateway: Send + Sync {
    fn get_entry(&self, key: &NamespacedName) -> Result<Arc<dyn CacheEntry>, CacheError>;
}
