use super::SetHandler;
use crate::key::NamespacedName;
use crate::path::{Path, Update};
use crate::response::{Operation, ResponseBuilder, SetResponse};
use crate::status::{SetError, Status};
use crate::validate::Edit;

impl SetHandler {
    /// Apply one update.
    ///
    /// A missing prefix or update path is treated as the empty path, so the
    /// key becomes `(prefix target, "")` unless an origin is found elsewhere.
    pub fn set(&self, prefix: Option<&Path>, update: &Update) -> Result<SetResponse, Status> {
        let root = Path::default();
        let path = update.path.as_ref().unwrap_or(&root);
        let key = NamespacedName::for_request(prefix, Some(path));

        let span = self.op_span("update", &key);
        let _enter = span.enter();
        tracing::debug!(path = %path, "set update");

        self.apply_update(prefix, &key, path, update)
            .map_err(|e| self.map_error(&e))
    }

    fn apply_update(
        &self,
        prefix: Option<&Path>,
        key: &NamespacedName,
        path: &Path,
        update: &Update,
    ) -> Result<SetResponse, SetError> {
        let entry = self.fetch(key)?;
        let candidate = self.validate(entry.as_ref(), key, &[Edit::Update(update)])?;
        self.commit(entry.as_ref(), key, candidate)?;

        Ok(ResponseBuilder::new(prefix)
            .record(path.clone(), Operation::Update)
            .build())
    }
}
