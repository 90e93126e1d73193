//! Validation of proposed updates against a cache entry.
//!
//! The handler only depends on [`UpdateValidator`]. [`SchemaValidator`] is a
//! reference implementation: it builds the candidate configuration the
//! edits would produce and checks it against the entry's JSON schema.

mod candidate;
mod schema;

pub use candidate::{apply_update, remove_path, CandidateError};
pub use schema::SchemaValidator;

use crate::cache::CacheEntry;
use crate::origin::UpdateSource;
use crate::path::{Path, Update, ValueDecodeError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// How an update's value is combined with the existing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ValidateMode {
    /// Merge into the existing subtree.
    #[default]
    Update,
    /// Replace the subtree wholesale.
    Replace,
}

/// One step of a Set against a single entry, applied in order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Edit<'a> {
    /// Remove the subtree at the path.
    Delete(&'a Path),
    Replace(&'a Update),
    Update(&'a Update),
}

impl<'a> Edit<'a> {
    /// The addressed path, if the edit carries one.
    pub fn path(&self) -> Option<&'a Path> {
        match *self {
            Self::Delete(path) => Some(path),
            Self::Replace(update) | Self::Update(update) => update.path.as_ref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Reject edits whose own origin disagrees with the entry's origin.
    pub strict_origin: bool,
    pub source: UpdateSource,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            strict_origin: true,
            source: UpdateSource::GnmiServer,
        }
    }
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("update {index} has no value")]
    MissingValue { index: usize },

    #[error("update {index}: {source}")]
    Decode {
        index: usize,
        #[source]
        source: ValueDecodeError,
    },

    #[error("update {index}: origin '{update_origin}' does not match entry origin '{entry_origin}'")]
    OriginMismatch {
        index: usize,
        update_origin: String,
        entry_origin: String,
    },

    #[error("update {index}: {source}")]
    Candidate {
        index: usize,
        #[source]
        source: CandidateError,
    },

    #[error("schema validation failed: {}", violations.join("; "))]
    Schema { violations: Vec<String> },

    #[error("invalid schema on entry: {0}")]
    InvalidSchema(String),

    #[error("{0}")]
    Rejected(String),
}

pub trait UpdateValidator: Send + Sync {
    /// Validate `edits`, applied in order to the entry's running config, as one
    /// unit. Returns the resulting candidate config. Must not mutate the entry.
    fn validate_edits(
        &self,
        entry: &dyn CacheEntry,
        edits: &[Edit<'_>],
        options: &ValidateOptions,
    ) -> Result<Value, ValidationError>;

    /// Validate merge updates only.
    fn validate_update(
        &self,
        entry: &dyn CacheEntry,
        updates: &[Update],
        options: &ValidateOptions,
    ) -> Result<Value, ValidationError> {
        let edits: Vec<Edit<'_>> = updates.iter().map(Edit::Update).collect();
        self.validate_edits(entry, &edits, options)
    }
}
