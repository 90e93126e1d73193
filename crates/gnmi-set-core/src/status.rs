//! Wire-level status codes and the request error taxonomy.

use crate::cache::{CacheError, EntryError};
use crate::key::NamespacedName;
use crate::validate::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Stable reason codes attached to diagnostics for each failure kind.
pub mod reason_codes {
    pub const E_TARGET_NOT_FOUND: &str = "E_TARGET_NOT_FOUND";
    pub const E_VALIDATION: &str = "E_VALIDATION";
    pub const E_SYSTEM_CACHE_STATUS: &str = "E_SYSTEM_CACHE_STATUS";
    pub const E_UNIMPLEMENTED: &str = "E_UNIMPLEMENTED";
    pub const E_EMPTY_REQUEST: &str = "E_EMPTY_REQUEST";
    pub const E_TOO_MANY_OPERATIONS: &str = "E_TOO_MANY_OPERATIONS";
}

/// gRPC status codes, numbered as on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Code {
    Ok = 0,
    Cancelled = 1,
    Unknown = 2,
    InvalidArgument = 3,
    DeadlineExceeded = 4,
    NotFound = 5,
    AlreadyExists = 6,
    PermissionDenied = 7,
    ResourceExhausted = 8,
    FailedPrecondition = 9,
    Aborted = 10,
    OutOfRange = 11,
    Unimplemented = 12,
    Internal = 13,
    Unavailable = 14,
    DataLoss = 15,
    Unauthenticated = 16,
}

impl Code {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Cancelled => "Canceled",
            Self::Unknown => "Unknown",
            Self::InvalidArgument => "InvalidArgument",
            Self::DeadlineExceeded => "DeadlineExceeded",
            Self::NotFound => "NotFound",
            Self::AlreadyExists => "AlreadyExists",
            Self::PermissionDenied => "PermissionDenied",
            Self::ResourceExhausted => "ResourceExhausted",
            Self::FailedPrecondition => "FailedPrecondition",
            Self::Aborted => "Aborted",
            Self::OutOfRange => "OutOfRange",
            Self::Unimplemented => "Unimplemented",
            Self::Internal => "Internal",
            Self::Unavailable => "Unavailable",
            Self::DataLoss => "DataLoss",
            Self::Unauthenticated => "Unauthenticated",
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status returned to the RPC caller: a code plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("rpc error: code = {code} desc = {message}")]
pub struct Status {
    pub code: Code,
    pub message: String,
}

impl Status {
    pub fn new(code: Code, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Every way a Set/Delete can fail.
#[derive(Debug, Error)]
pub enum SetError {
    /// No cached state for the target/origin; the caller should provision it first.
    #[error("could not find target in cache")]
    EntryNotFound {
        key: NamespacedName,
        #[source]
        source: CacheError,
    },

    /// The update payload was rejected; nothing was mutated.
    #[error("{source}")]
    ValidationFailed {
        key: NamespacedName,
        #[source]
        source: ValidationError,
    },

    #[error("{source}")]
    MutationFailed {
        key: NamespacedName,
        #[source]
        source: EntryError,
    },

    #[error("not implemented")]
    Unimplemented,

    #[error("set request carries no operations")]
    EmptyRequest,

    #[error("set request carries {count} operations, limit is {max}")]
    TooManyOperations { count: usize, max: usize },
}

impl SetError {
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::EntryNotFound { .. } => reason_codes::E_TARGET_NOT_FOUND,
            Self::ValidationFailed { .. } => reason_codes::E_VALIDATION,
            Self::MutationFailed { .. } => reason_codes::E_SYSTEM_CACHE_STATUS,
            Self::Unimplemented => reason_codes::E_UNIMPLEMENTED,
            Self::EmptyRequest => reason_codes::E_EMPTY_REQUEST,
            Self::TooManyOperations { .. } => reason_codes::E_TOO_MANY_OPERATIONS,
        }
    }

    /// The cache key the failure relates to, when there is one.
    pub fn key(&self) -> Option<&NamespacedName> {
        match self {
            Self::EntryNotFound { key, .. }
            | Self::ValidationFailed { key, .. }
            | Self::MutationFailed { key, .. } => Some(key),
            _ => None,
        }
    }

    /// Map onto a wire status.
    ///
    /// Validation failures use `validation_code`: `Internal` for wire
    /// compatibility with existing clients, `InvalidArgument` when configured.
    pub fn to_status(&self, validation_code: Code) -> Status {
        let code = match self {
            Self::EntryNotFound { .. } => Code::NotFound,
            Self::ValidationFailed { .. } => validation_code,
            Self::MutationFailed { .. } => Code::Internal,
            Self::Unimplemented => Code::Unimplemented,
            Self::EmptyRequest | Self::TooManyOperations { .. } => Code::InvalidArgument,
        };
        Status::new(code, self.to_string())
    }
}
