use super::{CacheEntry, CacheEntryGateway, CacheError, EntryError};
use crate::key::NamespacedName;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

/// In-process cache entry.
pub struct ConfigEntry {
    name: NamespacedName,
    schema: Option<Value>,
    config: RwLock<Value>,
    dirty: AtomicBool,
    frozen: AtomicBool,
}

impl ConfigEntry {
    pub fn new(name: NamespacedName, config: Value) -> Self {
        Self {
            name,
            schema: None,
            config: RwLock::new(config),
            dirty: AtomicBool::new(false),
            frozen: AtomicBool::new(false),
        }
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Replace the running configuration (reconciler side).
    pub fn set_running_config(&self, config: Value) -> Result<(), EntryError> {
        let mut guard = self.config.write().map_err(|_| EntryError::LockPoisoned)?;
        *guard = config;
        Ok(())
    }

    /// Mark the entry in sync again. Only reconciliation calls this.
    pub fn clear_system_cache_status(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }

    /// While frozen, commits and status changes are refused.
    pub fn freeze(&self) {
        self.frozen.store(true, Ordering::SeqCst);
    }

    pub fn thaw(&self) {
        self.frozen.store(false, Ordering::SeqCst);
    }
}

impl CacheEntry for ConfigEntry {
    fn name(&self) -> &NamespacedName {
        &self.name
    }

    fn schema(&self) -> Option<&Value> {
        self.schema.as_ref()
    }

    fn running_config(&self) -> Value {
        // A poisoned lock still holds the last written document.
        match self.config.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn system_cache_status(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    fn set_system_cache_status(&self, dirty: bool) -> Result<(), EntryError> {
        self.check_writable()?;
        self.dirty.store(dirty, Ordering::SeqCst);
        Ok(())
    }

    fn check_writable(&self) -> Result<(), EntryError> {
        if self.frozen.load(Ordering::SeqCst) {
            return Err(EntryError::Frozen(self.name.clone()));
        }
        Ok(())
    }

    fn commit(&self, config: Value) -> Result<(), EntryError> {
        let mut guard = self.config.write().map_err(|_| EntryError::LockPoisoned)?;
        self.check_writable()?;
        *guard = config;
        self.dirty.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn restore(&self, config: Value, dirty: bool) -> Result<(), EntryError> {
        let mut guard = match self.config.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = config;
        self.dirty.store(dirty, Ordering::SeqCst);
        Ok(())
    }
}

/// Thread-safe map of entries keyed by [`NamespacedName`].
#[derive(Default)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<NamespacedName, Arc<ConfigEntry>>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry, returning the shared handle.
    pub fn insert(&self, entry: ConfigEntry) -> Result<Arc<ConfigEntry>, CacheError> {
        let entry = Arc::new(entry);
        let mut entries = self.entries.write().map_err(|_| CacheError::LockPoisoned)?;
        entries.insert(entry.name.clone(), entry.clone());
        Ok(entry)
    }

    pub fn remove(&self, key: &NamespacedName) -> Result<Option<Arc<ConfigEntry>>, CacheError> {
        let mut entries = self.entries.write().map_err(|_| CacheError::LockPoisoned)?;
        Ok(entries.remove(key))
    }

    /// Typed lookup, for callers that need the concrete entry.
    pub fn entry(&self, key: &NamespacedName) -> Result<Arc<ConfigEntry>, CacheError> {
        let entries = self.entries.read().map_err(|_| CacheError::LockPoisoned)?;
        entries
            .get(key)
            .cloned()
            .ok_or_else(|| CacheError::NotFound(key.clone()))
    }

    pub fn len(&self) -> usize {
        // A poisoned map is still intact; writers never leave it half-updated.
        match self.entries.read() {
            Ok(entries) => entries.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheEntryGateway for InMemoryCache {
    fn get_entry(&self, key: &NamespacedName) -> Result<Arc<dyn CacheEntry>, CacheError> {
        let entry: Arc<dyn CacheEntry> = self.entry(key)?;
        Ok(entry)
    }
}
