//! Chroot navigation: narrowing a parsed document to a sub-value before
//! comparison (spec §4.3).

use crate::error::{ChrootError, ChrootErrorReason};
use crate::path::{ChrootSegment, parse_chroot_path};
use crate::value::Value;

/// Navigates `doc` along `path`, returning the sub-value found there.
///
/// A `key[index]` segment is two navigation steps bundled together: the key
/// lookup happens first, then the index lookup against whatever the key
/// resolved to.
pub fn navigate(doc: &Value, path: &str) -> Result<Value, ChrootError> {
    let segments = parse_chroot_path(path).map_err(|reason| ChrootError {
        path: path.to_string(),
        reason,
    })?;

    let mut current = doc;
    for segment in &segments {
        current = step(current, segment).map_err(|reason| ChrootError {
            path: path.to_string(),
            reason,
        })?;
    }
    Ok(current.clone())
}

fn step<'a>(value: &'a Value, segment: &ChrootSegment) -> Result<&'a Value, ChrootErrorReason> {
    match segment {
        ChrootSegment::Key(key) => key_lookup(value, key),
        ChrootSegment::Index(index) => index_lookup(value, *index),
        ChrootSegment::KeyIndex(key, index) => index_lookup(key_lookup(value, key)?, *index),
    }
}

fn key_lookup<'a>(value: &'a Value, key: &str) -> Result<&'a Value, ChrootErrorReason> {
    match value {
        Value::Map(m) => m
            .get(key)
            .ok_or_else(|| ChrootErrorReason::KeyNotFound(key.to_string())),
        _ if value.is_scalar() => Err(ChrootErrorReason::DescendsIntoScalar),
        _ => Err(ChrootErrorReason::KeyNotFound(key.to_string())),
    }
}

fn index_lookup(value: &Value, index: usize) -> Result<&Value, ChrootErrorReason> {
    match value {
        Value::List(items) => items.get(index).ok_or(ChrootErrorReason::IndexOutOfBounds {
            index,
            len: items.len(),
        }),
        _ if value.is_scalar() => Err(ChrootErrorReason::DescendsIntoScalar),
        _ => Err(ChrootErrorReason::IndexOutOfBounds { index, len: 0 }),
    }
}

/// Navigates to `path` within `doc`, then optionally explodes a list result
/// into a document sequence. When `list_to_documents` is true and the
/// navigated value is a list, each element becomes its own document;
/// otherwise the navigated value is returned as a single-element sequence.
pub fn apply_chroot(
    doc: &Value,
    path: &str,
    list_to_documents: bool,
) -> Result<Vec<Value>, ChrootError> {
    let found = navigate(doc, path)?;
    match found {
        Value::List(items) if list_to_documents => Ok(items),
        other => Ok(vec![other]),
    }
}

/// Applies a chroot path to every document in a stream, flattening each
/// document's (possibly list-exploded) result into the combined stream
/// that feeds the matcher.
pub fn apply_chroot_to_stream(
    docs: &[Value],
    path: &str,
    list_to_documents: bool,
) -> Result<Vec<Value>, ChrootError> {
    let mut result = Vec::new();
    for doc in docs {
        result.extend(apply_chroot(doc, path, list_to_documents)?);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::OrderedMap;

    fn doc() -> Value {
        let mut containers = Vec::new();
        let mut container = OrderedMap::new();
        container.insert("name", Value::String("app".to_string()));
        container.insert("image", Value::String("app:1.0".to_string()));
        containers.push(Value::Map(container));

        let mut spec = OrderedMap::new();
        spec.insert("containers", Value::List(containers));

        let mut root = OrderedMap::new();
        root.insert("spec", Value::Map(spec));
        Value::Map(root)
    }

    #[test]
    fn navigates_through_key_and_index() {
        let result = navigate(&doc(), "spec.containers[0].image").unwrap();
        assert_eq!(result, Value::String("app:1.0".to_string()));
    }

    #[test]
    fn missing_key_is_an_error() {
        let err = navigate(&doc(), "spec.missing").unwrap_err();
        assert_eq!(err.reason, ChrootErrorReason::KeyNotFound("missing".to_string()));
    }

    #[test]
    fn out_of_bounds_index_is_an_error() {
        let err = navigate(&doc(), "spec.containers[9]").unwrap_err();
        assert_eq!(
            err.reason,
            ChrootErrorReason::IndexOutOfBounds { index: 9, len: 1 }
        );
    }

    #[test]
    fn descending_into_a_scalar_is_an_error() {
        let err = navigate(&doc(), "spec.containers[0].image.sub").unwrap_err();
        assert_eq!(err.reason, ChrootErrorReason::DescendsIntoScalar);
    }

    #[test]
    fn root_path_returns_the_whole_document() {
        assert_eq!(navigate(&doc(), "").unwrap(), doc());
    }
}
