use super::{
    apply_update, remove_path, Edit, UpdateValidator, ValidateMode, ValidateOptions,
    ValidationError,
};
use crate::cache::CacheEntry;
use crate::key::NamespacedName;
use crate::path::Path;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Upper bound on schema violations carried in one error.
const MAX_VIOLATIONS: usize = 10;

struct Compiled {
    schema: Value,
    validator: Arc<jsonschema::Validator>,
}

/// Reference validator backed by the entry's JSON schema.
///
/// Edits in one call are applied cumulatively to a copy of the running
/// config; the resulting candidate is checked once. Entries without a schema
/// only get the structural checks. Compiled schemas are kept per entry and
/// recompiled only when the entry's schema changes.
#[derive(Default)]
pub struct SchemaValidator {
    compiled: RwLock<HashMap<NamespacedName, Compiled>>,
}

impl SchemaValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries with a compiled schema on hand.
    pub fn cached_schemas(&self) -> usize {
        match self.compiled.read() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    fn compiled(
        &self,
        name: &NamespacedName,
        schema: &Value,
    ) -> Result<Arc<jsonschema::Validator>, ValidationError> {
        if let Ok(cache) = self.compiled.read() {
            if let Some(hit) = cache.get(name).filter(|c| &c.schema == schema) {
                return Ok(hit.validator.clone());
            }
        }

        let validator = Arc::new(
            jsonschema::validator_for(schema)
                .map_err(|e| ValidationError::InvalidSchema(e.to_string()))?,
        );
        tracing::debug!(cache_key = %name, "compiled entry schema");
        // A poisoned map only costs a recompile next time.
        if let Ok(mut cache) = self.compiled.write() {
            cache.insert(
                name.clone(),
                Compiled {
                    schema: schema.clone(),
                    validator: validator.clone(),
                },
            );
        }
        Ok(validator)
    }
}

impl UpdateValidator for SchemaValidator {
    fn validate_edits(
        &self,
        entry: &dyn CacheEntry,
        edits: &[Edit<'_>],
        options: &ValidateOptions,
    ) -> Result<Value, ValidationError> {
        let root = Path::default();
        let mut candidate = entry.running_config();

        for (index, edit) in edits.iter().enumerate() {
            let path = edit.path().unwrap_or(&root);

            if options.strict_origin
                && !path.origin.is_empty()
                && path.origin != entry.name().origin
            {
                return Err(ValidationError::OriginMismatch {
                    index,
                    update_origin: path.origin.clone(),
                    entry_origin: entry.name().origin.clone(),
                });
            }

            let (update, mode) = match *edit {
                Edit::Delete(_) => {
                    remove_path(&mut candidate, path);
                    continue;
                }
                Edit::Replace(update) => (update, ValidateMode::Replace),
                Edit::Update(update) => (update, ValidateMode::Update),
            };

            let value = update
                .val
                .as_ref()
                .ok_or(ValidationError::MissingValue { index })?
                .to_json()
                .map_err(|source| ValidationError::Decode { index, source })?;

            apply_update(&mut candidate, path, value, mode)
                .map_err(|source| ValidationError::Candidate { index, source })?;
        }

        let Some(schema) = entry.schema() else {
            return Ok(candidate);
        };
        let validator = self.compiled(entry.name(), schema)?;
        if validator.is_valid(&candidate) {
            return Ok(candidate);
        }

        let violations = validator
            .iter_errors(&candidate)
            .take(MAX_VIOLATIONS)
            .map(|e| e.to_string())
            .collect();
        tracing::trace!(
            target_name = %entry.name(),
            source = %options.source,
            "candidate config rejected by schema"
        );
        Err(ValidationError::Schema { violations })
    }
}
