use super::ValidateMode;
use crate::path::{Path, PathElem};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CandidateError {
    #[error("cannot descend into '{0}': parent is not a container")]
    NotAContainer(String),

    #[error("'{0}' is not a list")]
    NotAList(String),
}

/// Apply one update to `doc` in place, creating intermediate containers and
/// list members as needed.
///
/// Keyed elements (`interface[name=eth0]`) select the list member whose key
/// leaves match, or append a new member carrying the keys.
pub fn apply_update(
    doc: &mut Value,
    path: &Path,
    value: Value,
    mode: ValidateMode,
) -> Result<(), CandidateError> {
    let mut cursor = doc;
    for elem in &path.elem {
        let obj = as_container(cursor, &elem.name)?;
        if elem.key.is_empty() {
            cursor = obj.entry(elem.name.clone()).or_insert(Value::Null);
            continue;
        }

        let list = obj
            .entry(elem.name.clone())
            .or_insert_with(|| Value::Array(Vec::new()));
        if list.is_null() {
            *list = Value::Array(Vec::new());
        }
        let Value::Array(members) = list else {
            return Err(CandidateError::NotAList(elem.name.clone()));
        };
        let idx = match members.iter().position(|m| key_matches(m, &elem.key)) {
            Some(idx) => idx,
            None => {
                members.push(key_object(&elem.key));
                members.len() - 1
            }
        };
        cursor = &mut members[idx];
    }

    let keys = path.elem.last().map(|e| &e.key);
    match mode {
        ValidateMode::Update => merge(cursor, value),
        ValidateMode::Replace => {
            *cursor = value;
            // A replaced list member keeps its identity.
            if let (Some(keys), Value::Object(obj)) = (keys, cursor) {
                for (k, v) in keys {
                    obj.entry(k.clone())
                        .or_insert_with(|| Value::String(v.clone()));
                }
            }
        }
    }
    Ok(())
}

/// Remove the node at `path` from `doc`, returning whether anything was removed.
///
/// A missing node is not an error. The root path clears the whole document.
pub fn remove_path(doc: &mut Value, path: &Path) -> bool {
    let Some((last, parents)) = path.elem.split_last() else {
        *doc = Value::Object(Map::new());
        return true;
    };
    let mut cursor = doc;
    for elem in parents {
        let Some(next) = descend(cursor, elem) else {
            return false;
        };
        cursor = next;
    }
    let Value::Object(obj) = cursor else {
        return false;
    };
    if last.key.is_empty() {
        return obj.remove(&last.name).is_some();
    }
    match obj.get_mut(&last.name) {
        Some(Value::Array(members)) => {
            let before = members.len();
            members.retain(|m| !key_matches(m, &last.key));
            members.len() != before
        }
        _ => false,
    }
}

fn descend<'a>(v: &'a mut Value, elem: &PathElem) -> Option<&'a mut Value> {
    let child = v.as_object_mut()?.get_mut(&elem.name)?;
    if elem.key.is_empty() {
        return Some(child);
    }
    child
        .as_array_mut()?
        .iter_mut()
        .find(|m| key_matches(m, &elem.key))
}

fn as_container<'a>(
    v: &'a mut Value,
    name: &str,
) -> Result<&'a mut Map<String, Value>, CandidateError> {
    if v.is_null() {
        *v = Value::Object(Map::new());
    }
    match v {
        Value::Object(m) => Ok(m),
        _ => Err(CandidateError::NotAContainer(name.to_string())),
    }
}

fn key_matches(member: &Value, keys: &BTreeMap<String, String>) -> bool {
    keys.iter().all(|(k, want)| match member.get(k) {
        Some(Value::String(s)) => s == want,
        Some(other) => other.to_string() == *want,
        None => false,
    })
}

fn key_object(keys: &BTreeMap<String, String>) -> Value {
    Value::Object(
        keys.iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    )
}

fn merge(dst: &mut Value, src: Value) {
    match (dst, src) {
        (Value::Object(d), Value::Object(s)) => {
            for (k, v) in s {
                merge(d.entry(k).or_insert(Value::Null), v);
            }
        }
        (d, s) => *d = s,
    }
}
