//! gNMI Set/Delete handling against a per-target configuration cache.
//!
//! A request is resolved to one cache entry by `(target, origin)`, its
//! updates are validated by an injected [`UpdateValidator`], and on success
//! the entry is flagged as diverged from the device. Reconciliation of the
//! flag back to the device happens elsewhere.

pub mod cache;
pub mod config;
pub mod handler;
pub mod key;
pub mod origin;
pub mod path;
pub mod response;
pub mod status;
pub mod validate;

// Convenience re-exports
pub use cache::{
    CacheEntry, CacheEntryGateway, CacheError, ConfigEntry, EntryError, InMemoryCache,
};
pub use config::{DeleteMode, HandlerConfig};
pub use handler::{SetHandler, SetRequest};
pub use key::NamespacedName;
pub use origin::{resolve_origin, UpdateSource};
pub use path::{Path, PathElem, PathParseError, TypedValue, Update};
pub use response::{Operation, SetResponse, UpdateResult};
pub use status::{reason_codes, Code, SetError, Status};
pub use validate::{
    Edit, SchemaValidator, UpdateValidator, ValidateMode, ValidateOptions, ValidationError,
};
