//! gNMI path and value model.
//!
//! A [`Path`] is an ordered list of [`PathElem`]s plus the two optional
//! qualifiers gNMI hangs off a path: `origin` (schema namespace) and `target`
//! (device). Empty strings mean "not set"; a missing path is represented by
//! `Option<Path>` at the call sites and defaults to [`Path::default`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One element of a path, e.g. `interface[name=eth0]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathElem {
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub key: BTreeMap<String, String>,
}

impl PathElem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: BTreeMap::new(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.key.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for PathElem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for (k, v) in &self.key {
            write!(f, "[{}={}]", k, v)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Path {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub origin: String,
    #[serde(default)]
    pub elem: Vec<PathElem>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub target: String,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    pub fn with_elem(mut self, elem: PathElem) -> Self {
        self.elem.push(elem);
        self
    }

    /// Append a plain (unkeyed) element.
    pub fn push(mut self, name: impl Into<String>) -> Self {
        self.elem.push(PathElem::new(name));
        self
    }

    /// True when the path carries no elements and no qualifiers.
    pub fn is_empty(&self) -> bool {
        self.elem.is_empty() && self.origin.is_empty() && self.target.is_empty()
    }

    /// Render the element list as `/a/b[k=v]/c`, without origin or target.
    ///
    /// The root path renders as `/`.
    pub fn to_xpath(&self) -> String {
        if self.elem.is_empty() {
            return "/".to_string();
        }
        let mut out = String::new();
        for e in &self.elem {
            out.push('/');
            out.push_str(&e.to_string());
        }
        out
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.origin.is_empty() {
            write!(f, "{}:", self.origin)?;
        }
        f.write_str(&self.to_xpath())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathParseError {
    #[error("path must start with '/': {0}")]
    MissingRoot(String),

    #[error("empty element name at position {0}")]
    EmptyElement(usize),

    #[error("unterminated key selector in element '{0}'")]
    UnterminatedKey(String),

    #[error("malformed key selector '{0}' (expected name=value)")]
    MalformedKey(String),
}

impl FromStr for Path {
    type Err = PathParseError;

    /// Parse `[origin:]/a/b[k=v]/c`. Target is never part of the text form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (origin, rest) = match s.find(":/") {
            Some(idx) if !s[..idx].contains('/') => (&s[..idx], &s[idx + 1..]),
            _ => ("", s),
        };
        if !rest.starts_with('/') {
            return Err(PathParseError::MissingRoot(s.to_string()));
        }

        let mut path = Path::new().with_origin(origin);
        for (pos, segment) in split_segments(&rest[1..])?.into_iter().enumerate() {
            if segment.is_empty() {
                // "/" alone is the root path.
                if rest == "/" {
                    break;
                }
                return Err(PathParseError::EmptyElement(pos));
            }
            path.elem.push(parse_elem(segment, pos)?);
        }
        Ok(path)
    }
}

/// Split on '/' outside of `[...]` selectors, so key values may contain '/'.
fn split_segments(s: &str) -> Result<Vec<&str>, PathParseError> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            '/' if depth == 0 => {
                out.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(PathParseError::UnterminatedKey(s[start..].to_string()));
    }
    out.push(&s[start..]);
    Ok(out)
}

fn parse_elem(segment: &str, pos: usize) -> Result<PathElem, PathParseError> {
    let (name, mut rest) = match segment.find('[') {
        Some(idx) => (&segment[..idx], &segment[idx..]),
        None => (segment, ""),
    };
    if name.is_empty() {
        return Err(PathParseError::EmptyElement(pos));
    }

    let mut elem = PathElem::new(name);
    while !rest.is_empty() {
        let close = rest
            .find(']')
            .ok_or_else(|| PathParseError::UnterminatedKey(segment.to_string()))?;
        let selector = &rest[1..close];
        let (k, v) = selector
            .split_once('=')
            .filter(|(k, _)| !k.is_empty())
            .ok_or_else(|| PathParseError::MalformedKey(selector.to_string()))?;
        elem.key.insert(k.to_string(), v.to_string());
        rest = &rest[close + 1..];
        if !rest.is_empty() && !rest.starts_with('[') {
            return Err(PathParseError::MalformedKey(rest.to_string()));
        }
    }
    Ok(elem)
}

/// The gNMI `TypedValue` union, restricted to the scalar and JSON encodings
/// this service accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypedValue {
    /// RFC 7159 JSON text.
    JsonVal(String),
    /// RFC 7951 (JSON_IETF) text.
    JsonIetfVal(String),
    StringVal(String),
    IntVal(i64),
    UintVal(u64),
    BoolVal(bool),
    DoubleVal(f64),
}

#[derive(Debug, Error)]
#[error("value is not valid JSON: {0}")]
pub struct ValueDecodeError(#[from] serde_json::Error);

impl TypedValue {
    /// Decode into a JSON document. Only the JSON encodings can fail.
    pub fn to_json(&self) -> Result<Value, ValueDecodeError> {
        Ok(match self {
            Self::JsonVal(raw) | Self::JsonIetfVal(raw) => serde_json::from_str(raw)?,
            Self::StringVal(s) => Value::String(s.clone()),
            Self::IntVal(n) => Value::from(*n),
            Self::UintVal(n) => Value::from(*n),
            Self::BoolVal(b) => Value::Bool(*b),
            Self::DoubleVal(d) => Value::from(*d),
        })
    }
}

/// A proposed mutation: the value to place at `path`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Update {
    #[serde(default)]
    pub path: Option<Path>,
    #[serde(default)]
    pub val: Option<TypedValue>,
}

impl Update {
    pub fn new(path: Path, val: TypedValue) -> Self {
        Self {
            path: Some(path),
            val: Some(val),
        }
    }
}
