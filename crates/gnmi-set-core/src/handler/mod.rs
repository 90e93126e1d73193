//! Set/Delete request handling.
//!
//! Each call runs the same sequence against exactly one cache entry:
//!
//! ```text
//! prefix + path ──▶ resolve origin ──▶ NamespacedName ──▶ get_entry
//!                                                           │
//!   SetResponse ◀── store candidate + mark dirty ◀── validate ◀─┘
//! ```
//!
//! A failure at any step returns immediately; the entry is never touched
//! before validation has passed. The handler keeps no state between calls.

mod batch;
mod delete;
mod set;


pub use batch::SetRequest;

use crate::cache::{CacheEntry, CacheEntryGateway};
use crate::config::HandlerConfig;
use crate::key::NamespacedName;
use crate::origin::UpdateSource;
use crate::status::{SetError, Status};
use crate::validate::{Edit, UpdateValidator, ValidateOptions};
use serde_json::Value;
use std::sync::Arc;
use tracing::Span;

pub struct SetHandler {
    cache: Arc<dyn CacheEntryGateway>,
    validator: Arc<dyn UpdateValidator>,
    config: HandlerConfig,
}

impl SetHandler {
    pub fn new(
        cache: Arc<dyn CacheEntryGateway>,
        validator: Arc<dyn UpdateValidator>,
        config: HandlerConfig,
    ) -> Self {
        Self {
            cache,
            validator,
            config,
        }
    }

    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    /// Span carrying the diagnostic context for one operation.
    fn op_span(&self, op: &'static str, key: &NamespacedName) -> Span {
        tracing::debug_span!(
            "gnmi.set",
            op,
            origin = %key.origin,
            target = %key.target,
            cache_key = %key,
            request_id = %uuid::Uuid::new_v4(),
        )
    }

    fn fetch(&self, key: &NamespacedName) -> Result<Arc<dyn CacheEntry>, SetError> {
        self.cache
            .get_entry(key)
            .map_err(|source| SetError::EntryNotFound {
                key: key.clone(),
                source,
            })
    }

    /// Validate `edits` against the entry and return the candidate config.
    fn validate(
        &self,
        entry: &dyn CacheEntry,
        key: &NamespacedName,
        edits: &[Edit<'_>],
    ) -> Result<Value, SetError> {
        let options = ValidateOptions {
            strict_origin: self.config.strict_origin,
            source: UpdateSource::GnmiServer,
        };
        self.validator
            .validate_edits(entry, edits, &options)
            .map_err(|source| SetError::ValidationFailed {
                key: key.clone(),
                source,
            })
    }

    /// Store the candidate and flag the entry as diverged from the device.
    /// Never clears the flag.
    fn commit(
        &self,
        entry: &dyn CacheEntry,
        key: &NamespacedName,
        candidate: Value,
    ) -> Result<(), SetError> {
        entry
            .commit(candidate)
            .map_err(|source| SetError::MutationFailed {
                key: key.clone(),
                source,
            })
    }

    /// Map an internal failure onto the wire status, logging it with its reason code.
    pub fn map_error(&self, err: &SetError) -> Status {
        let status = err.to_status(self.config.validation_failure_code);
        tracing::debug!(
            reason = err.reason_code(),
            code = %status.code,
            error = %err,
            "set failed"
        );
        status
    }
}
