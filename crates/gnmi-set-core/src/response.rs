use crate::path::Path;
use serde::{Deserialize, Serialize};

/// The operation recorded for one path in a Set response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
    Delete,
    Replace,
    Update,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateResult {
    /// Unix time in nanoseconds.
    pub timestamp: i64,
    pub path: Path,
    pub op: Operation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<Path>,
    pub response: Vec<UpdateResult>,
    pub timestamp: i64,
}

/// Current wall-clock time in Unix nanoseconds.
pub fn now_nanos() -> i64 {
    // Out of i64 range only after 2262.
    chrono::Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or(i64::MAX)
}

/// Collects results that share one timestamp.
#[derive(Debug)]
pub struct ResponseBuilder {
    prefix: Option<Path>,
    timestamp: i64,
    results: Vec<UpdateResult>,
}

impl ResponseBuilder {
    pub fn new(prefix: Option<&Path>) -> Self {
        Self::at(prefix, now_nanos())
    }

    pub fn at(prefix: Option<&Path>, timestamp: i64) -> Self {
        Self {
            prefix: prefix.cloned(),
            timestamp,
            results: Vec::new(),
        }
    }

    pub fn record(mut self, path: Path, op: Operation) -> Self {
        self.results.push(UpdateResult {
            timestamp: self.timestamp,
            path,
            op,
        });
        self
    }

    pub fn build(self) -> SetResponse {
        SetResponse {
            prefix: self.prefix,
            response: self.results,
            timestamp: self.timestamp,
        }
    }
}
