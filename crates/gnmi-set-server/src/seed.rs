//! Startup cache contents.
//!
//! ```yaml
//! entries:
//!   - target: dev1
//!     origin: openconfig
//!     config: { system: { config: { hostname: r1 } } }
//!     schema: { type: object }
//! ```

use anyhow::{bail, Context};
use gnmi_set_core::{CacheEntry, ConfigEntry, InMemoryCache, NamespacedName};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SeedFile {
    pub entries: Vec<SeedEntry>,
}

#[derive(Debug, Deserialize)]
pub struct SeedEntry {
    pub target: String,
    #[serde(default)]
    pub origin: String,
    #[serde(default = "empty_object")]
    pub config: Value,
    #[serde(default)]
    pub schema: Option<Value>,
    /// Start already diverged from the device.
    #[serde(default)]
    pub dirty: bool,
    /// Start locked by reconciliation.
    #[serde(default)]
    pub frozen: bool,
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

impl SeedFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read seed {}", path.display()))?;
        Self::from_yaml_str(&raw).with_context(|| format!("invalid seed {}", path.display()))
    }

    pub fn from_yaml_str(raw: &str) -> anyhow::Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Insert every entry into `cache`. Duplicate `(target, origin)` pairs are rejected
    /// before anything is inserted.
    pub fn apply(self, cache: &InMemoryCache) -> anyhow::Result<usize> {
        let mut seen = BTreeSet::new();
        for e in &self.entries {
            let key = NamespacedName::from_target_and_origin(e.target.as_str(), e.origin.as_str());
            if !seen.insert(key.clone()) {
                bail!("duplicate seed entry for '{key}'");
            }
        }

        let count = self.entries.len();
        for e in self.entries {
            let name = NamespacedName::from_target_and_origin(e.target, e.origin);
            let mut entry = ConfigEntry::new(name.clone(), e.config);
            if let Some(schema) = e.schema {
                entry = entry.with_schema(schema);
            }
            let entry = cache
                .insert(entry)
                .with_context(|| format!("failed to seed '{name}'"))?;
            if e.dirty {
                entry
                    .set_system_cache_status(true)
                    .with_context(|| format!("failed to mark '{name}' dirty"))?;
            }
            if e.frozen {
                entry.freeze();
            }
            tracing::debug!(cache_key = %name, dirty = e.dirty, frozen = e.frozen, "seeded entry");
        }
        Ok(count)
    }
}

/// Load `path` into `cache`, returning the number of entries.
pub fn load_into(cache: &InMemoryCache, path: &Path) -> anyhow::Result<usize> {
    SeedFile::load(path)?.apply(cache)
}
