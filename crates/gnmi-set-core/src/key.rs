use crate::origin::resolve_origin;
use crate::path::Path;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cache key of one configuration entry: one per device per origin.
///
/// Equality and hashing are over the `(target, origin)` pair, so two names
/// are equal exactly when both components are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NamespacedName {
    pub target: String,
    #[serde(default)]
    pub origin: String,
}

impl NamespacedName {
    pub fn from_target_and_origin(target: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            origin: origin.into(),
        }
    }

    /// Derive the key for one operation from its prefix and update/delete path.
    ///
    /// The target always comes from the prefix; the origin is resolved with
    /// [`resolve_origin`].
    pub fn for_request(prefix: Option<&Path>, path: Option<&Path>) -> Self {
        let target = prefix.map(|p| p.target.as_str()).unwrap_or_default();
        Self::from_target_and_origin(target, resolve_origin(prefix, path))
    }

    /// Flat string form, injective over `(target, origin)`.
    ///
    /// The target is length-prefixed so no choice of characters in either
    /// component can make two distinct pairs encode the same.
    pub fn encode(&self) -> String {
        format!("{}:{}{}", self.target.len(), self.target, self.origin)
    }
}

impl fmt::Display for NamespacedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.origin.is_empty() {
            f.write_str(&self.target)
        } else {
            write!(f, "{}.{}", self.origin, self.target)
        }
    }
}
