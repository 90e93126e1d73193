use crate::status::Code;
use serde::{Deserialize, Serialize};

/// What a Delete does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeleteMode {
    /// Reject every Delete with `Unimplemented`, touching nothing.
    #[default]
    Unimplemented,
    /// Look up the entry, mark it dirty, report a DELETE result.
    MarkDirty,
}

impl DeleteMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "unimplemented" => Some(Self::Unimplemented),
            "mark_dirty" | "mark-dirty" => Some(Self::MarkDirty),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct HandlerConfig {
    pub delete_mode: DeleteMode,

    /// Wire code for rejected updates. `internal` keeps existing clients
    /// working; `invalid_argument` is the conventional client-error code.
    pub validation_failure_code: Code,

    /// Passed through to the validator.
    pub strict_origin: bool,

    /// Upper bound on deletes + replaces + updates in one batch request.
    pub max_operations: usize,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            delete_mode: DeleteMode::default(),
            validation_failure_code: Code::Internal,
            strict_origin: true,
            max_operations: 64,
        }
    }
}

impl HandlerConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !matches!(
            self.validation_failure_code,
            Code::Internal | Code::InvalidArgument | Code::FailedPrecondition
        ) {
            return Err(format!(
                "validation_failure_code must be internal, invalid_argument or failed_precondition, got {}",
                self.validation_failure_code
            ));
        }
        if self.max_operations == 0 {
            return Err("max_operations must be at least 1".to_string());
        }
        Ok(())
    }
}
