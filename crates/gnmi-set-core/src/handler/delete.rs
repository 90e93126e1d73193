use super::SetHandler;
use crate::config::DeleteMode;
use crate::key::NamespacedName;
use crate::path::Path;
use crate::response::{Operation, ResponseBuilder, SetResponse};
use crate::status::{SetError, Status};
use crate::validate::Edit;

impl SetHandler {
    /// Delete the subtree at `path`.
    ///
    /// With [`DeleteMode::Unimplemented`] (the default) every call fails with
    /// `Unimplemented` and the cache is not consulted. With
    /// [`DeleteMode::MarkDirty`] the subtree is removed from the entry's
    /// running config, the result validated, stored and marked dirty.
    pub fn delete(&self, prefix: Option<&Path>, path: Option<&Path>) -> Result<SetResponse, Status> {
        let root = Path::default();
        let path = path.unwrap_or(&root);
        let key = NamespacedName::for_request(prefix, Some(path));

        let span = self.op_span("delete", &key);
        let _enter = span.enter();
        tracing::debug!(path = %path.to_xpath(), "set delete");

        let result = match self.config.delete_mode {
            DeleteMode::Unimplemented => Err(SetError::Unimplemented),
            DeleteMode::MarkDirty => self.apply_delete(prefix, &key, path),
        };
        result.map_err(|e| self.map_error(&e))
    }

    fn apply_delete(
        &self,
        prefix: Option<&Path>,
        key: &NamespacedName,
        path: &Path,
    ) -> Result<SetResponse, SetError> {
        let entry = self.fetch(key)?;
        let candidate = self.validate(entry.as_ref(), key, &[Edit::Delete(path)])?;
        self.commit(entry.as_ref(), key, candidate)?;

        Ok(ResponseBuilder::new(prefix)
            .record(path.clone(), Operation::Delete)
            .build())
    }
}
