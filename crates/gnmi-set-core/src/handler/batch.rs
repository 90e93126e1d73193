use super::SetHandler;
use crate::cache::CacheEntry;
use crate::config::DeleteMode;
use crate::key::NamespacedName;
use crate::path::{Path, Update};
use crate::response::{Operation, ResponseBuilder, SetResponse};
use crate::status::{SetError, Status};
use crate::validate::Edit;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A full gNMI SetRequest: deletes, then replaces, then updates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetRequest {
    #[serde(default)]
    pub prefix: Option<Path>,
    #[serde(default)]
    pub delete: Vec<Path>,
    #[serde(default)]
    pub replace: Vec<Update>,
    #[serde(default)]
    pub update: Vec<Update>,
}

impl SetRequest {
    pub fn operation_count(&self) -> usize {
        self.delete.len() + self.replace.len() + self.update.len()
    }
}

struct PlannedOp<'a> {
    key: NamespacedName,
    path: &'a Path,
    edit: Edit<'a>,
    op: Operation,
}

impl SetHandler {
    /// Apply a whole SetRequest atomically with respect to validation.
    ///
    /// Every referenced entry is fetched and its deletes, replaces and updates
    /// validated in request order as one candidate before anything is stored.
    /// Each distinct entry is committed once; if a commit still fails, entries
    /// committed earlier in the request are restored.
    pub fn handle(&self, req: &SetRequest) -> Result<SetResponse, Status> {
        let target = req
            .prefix
            .as_ref()
            .map(|p| p.target.as_str())
            .unwrap_or_default();
        let span = tracing::debug_span!(
            "gnmi.set_request",
            target,
            deletes = req.delete.len(),
            replaces = req.replace.len(),
            updates = req.update.len(),
            request_id = %uuid::Uuid::new_v4(),
        );
        let _enter = span.enter();

        self.handle_inner(req).map_err(|e| self.map_error(&e))
    }

    fn handle_inner(&self, req: &SetRequest) -> Result<SetResponse, SetError> {
        let count = req.operation_count();
        if count == 0 {
            return Err(SetError::EmptyRequest);
        }
        if count > self.config.max_operations {
            return Err(SetError::TooManyOperations {
                count,
                max: self.config.max_operations,
            });
        }
        if !req.delete.is_empty() && self.config.delete_mode == DeleteMode::Unimplemented {
            return Err(SetError::Unimplemented);
        }

        let ops = plan(req);

        // 1. Fetch every entry once.
        let mut entries: BTreeMap<NamespacedName, Arc<dyn CacheEntry>> = BTreeMap::new();
        for op in &ops {
            if !entries.contains_key(&op.key) {
                let entry = self.fetch(&op.key)?;
                entries.insert(op.key.clone(), entry);
            }
        }

        // 2. Validate each entry's edits as one ordered sequence.
        let mut staged = Vec::with_capacity(entries.len());
        for (key, entry) in &entries {
            let edits: Vec<Edit<'_>> = ops
                .iter()
                .filter(|op| &op.key == key)
                .map(|op| op.edit)
                .collect();
            tracing::debug!(cache_key = %key, count = edits.len(), "validate");
            let candidate = self.validate(entry.as_ref(), key, &edits)?;
            staged.push((key, entry, candidate));
        }

        // 3. Commit all or nothing.
        for (key, entry, _) in &staged {
            entry
                .check_writable()
                .map_err(|source| SetError::MutationFailed {
                    key: (*key).clone(),
                    source,
                })?;
        }
        let mut committed: Vec<Snapshot<'_>> = Vec::with_capacity(staged.len());
        for (key, entry, candidate) in staged {
            let before = (entry.running_config(), entry.system_cache_status());
            if let Err(e) = self.commit(entry.as_ref(), key, candidate) {
                rollback(committed);
                return Err(e);
            }
            committed.push((key, entry, before.0, before.1));
        }

        let response = ops
            .iter()
            .fold(ResponseBuilder::new(req.prefix.as_ref()), |b, op| {
                b.record(op.path.clone(), op.op)
            })
            .build();
        Ok(response)
    }
}

/// An entry's config and dirty flag as they were before its commit.
type Snapshot<'a> = (&'a NamespacedName, &'a Arc<dyn CacheEntry>, Value, bool);

/// Undo commits made earlier in a request that then failed.
fn rollback(committed: Vec<Snapshot<'_>>) {
    for (key, entry, config, dirty) in committed.into_iter().rev() {
        if let Err(e) = entry.restore(config, dirty) {
            tracing::warn!(cache_key = %key, error = %e, "rollback failed");
        }
    }
}

fn plan(req: &SetRequest) -> Vec<PlannedOp<'_>> {
    static ROOT: Path = Path {
        origin: String::new(),
        elem: Vec::new(),
        target: String::new(),
    };
    let prefix = req.prefix.as_ref();

    let deletes = req.delete.iter().map(|path| PlannedOp {
        key: NamespacedName::for_request(prefix, Some(path)),
        path,
        edit: Edit::Delete(path),
        op: Operation::Delete,
    });
    let writes = req
        .replace
        .iter()
        .map(|u| (Edit::Replace(u), Operation::Replace))
        .chain(req.update.iter().map(|u| (Edit::Update(u), Operation::Update)))
        .map(|(edit, op)| {
            let path = edit.path().unwrap_or(&ROOT);
            PlannedOp {
                key: NamespacedName::for_request(prefix, Some(path)),
                path,
                edit,
                op,
            }
        });
    deletes.chain(writes).collect()
}
