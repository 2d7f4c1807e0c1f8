//! YAML codec helpers built on serde_yaml
//!
//! The document model is a title-ordered map of section title to an opaque
//! `serde_yaml::Value`. Binding overlays a section onto the current value of
//! a target instead of replacing it, so keys missing from the document keep
//! their in-memory defaults.

use std::collections::BTreeMap;

use serde::{Serialize, de::DeserializeOwned};
use serde_yaml::Value;

use crate::Failure;
use cfgsync_fs::NormalizedPath;

/// A decoded document: section title to section value.
pub type Document = BTreeMap<String, Value>;

/// Decode a whole document.
///
/// An empty (or comment-only) document decodes to an empty map. The root must
/// be a mapping with scalar keys; anything else is a decode failure. Keys that
/// name the same title once turned into text (`1` and `'1'`, `true` and
/// `'true'`) are a decode failure too.
pub fn decode_document(path: &NormalizedPath, source: &str) -> Result<Document, Failure> {
    let decode_failure = |message: String| Failure::Decode {
        path: path.clone(),
        message,
    };

    let root: Value = serde_yaml::from_str(source).map_err(|e| decode_failure(e.to_string()))?;
    let mapping = match root {
        Value::Null => return Ok(Document::new()),
        Value::Mapping(mapping) => mapping,
        other => {
            return Err(decode_failure(format!(
                "document root must be a mapping of sections, found {}",
                shape_of(&other)
            )));
        }
    };

    let mut document = Document::new();
    for (key, value) in mapping {
        let title = title_of(&key).ok_or_else(|| {
            decode_failure(format!("section key must be a scalar, found {}", shape_of(&key)))
        })?;
        if document.contains_key(&title) {
            return Err(decode_failure(format!(
                "section title '{title}' is given by more than one key"
            )));
        }
        document.insert(title, value);
    }
    Ok(document)
}

/// Encode a value on its own, as if it were a whole document.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(value)
}

/// Decode `raw` and overlay it onto the current value of `target`.
///
/// A null section leaves the target untouched.
pub fn bind_into<T>(raw: &str, target: &mut T) -> Result<(), serde_yaml::Error>
where
    T: Serialize + DeserializeOwned,
{
    let top: Value = serde_yaml::from_str(raw)?;
    if top.is_null() {
        return Ok(());
    }
    let mut base = serde_yaml::to_value(&*target)?;
    overlay(&mut base, top);
    *target = serde_yaml::from_value(base)?;
    Ok(())
}

/// Deep-merge `top` into `base`.
///
/// Mappings merge key by key; every other kind of value replaces what was
/// there.
pub fn overlay(base: &mut Value, top: Value) {
    match (base, top) {
        (Value::Mapping(base), Value::Mapping(top)) => {
            for (key, value) in top {
                match base.get_mut(&key) {
                    Some(slot) => overlay(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, top) => *slot = top,
    }
}

/// Human-readable name of a value's shape, for error messages.
pub fn shape_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

fn title_of(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
