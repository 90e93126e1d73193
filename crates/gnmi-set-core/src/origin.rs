//! Origin disambiguation.
//!
//! gNMI lets a request carry the origin on the prefix, on the individual
//! update/delete path, or nowhere. The prefix wins, then the path, then the
//! empty (default) origin.

use crate::path::Path;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Resolve the effective origin for one operation.
///
/// Absent paths behave like [`Path::default`]. Total: never fails.
pub fn resolve_origin<'a>(prefix: Option<&'a Path>, path: Option<&'a Path>) -> &'a str {
    let from_prefix = prefix.map(|p| p.origin.as_str()).unwrap_or_default();
    if !from_prefix.is_empty() {
        return from_prefix;
    }
    path.map(|p| p.origin.as_str()).unwrap_or_default()
}

/// Which component produced an update. Validators may apply per-source policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UpdateSource {
    /// An external gNMI Set/Delete received by this server.
    #[default]
    GnmiServer,
    /// Reconciliation of desired vs. device-applied state.
    Reconciler,
    /// Telemetry from a device subscription.
    Subscription,
}

impl UpdateSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GnmiServer => "gnmi_server",
            Self::Reconciler => "reconciler",
            Self::Subscription => "subscription",
        }
    }
}

impl fmt::Display for UpdateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
