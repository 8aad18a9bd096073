//! `$ref` resolution.
//!
//! A reference is `<namespace>#<path>` or `#<path>`. The namespace (with
//! its `#`) is looked up in the sub-schema table, verbatim and then
//! without the `#`; a bare `#` targets the root document, and so does
//! any namespace when no sub-schemas were supplied. The path is
//! `/`-delimited and walked by plain key lookup (array elements by index),
//! with no `~0`/`~1` unescaping.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::ResolveError;

/// Split at the first `#`: `("ns#", "/a/b")`. Without a `#` the whole
/// string is the path and the namespace is empty.
pub(crate) fn split(reference: &str) -> (&str, &str) {
    match reference.find('#') {
        Some(i) => reference.split_at(i + 1),
        None => ("", reference),
    }
}

/// Locate the fragment `reference` points at.
pub(crate) fn locate<'a>(
    reference: &str,
    root: &'a Value,
    sub_schemas: &'a HashMap<String, Value>,
) -> Result<&'a Value, ResolveError> {
    let (namespace, path) = split(reference);

    let document = match namespace {
        "" | "#" => root,
        _ if sub_schemas.is_empty() => root,
        ns => sub_schemas
            .get(ns)
            .or_else(|| sub_schemas.get(ns.trim_end_matches('#')))
            .ok_or_else(|| ResolveError::ReferenceNotFound {
                reference: reference.to_string(),
            })?,
    };

    let mut fragment = document;
    for segment in path.split('/').skip(1) {
        let next = match fragment {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        fragment = next.ok_or_else(|| ResolveError::MalformedReference {
            reference: reference.to_string(),
            reason: format!("no '{segment}' in the referenced document"),
        })?;
    }

    tracing::debug!(reference, namespace, "resolved reference");
    Ok(fragment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split() {
        assert_eq!(split("#/definitions/a"), ("#", "/definitions/a"));
        assert_eq!(split("definitions#/name"), ("definitions#", "/name"));
        assert_eq!(split("#"), ("#", ""));
        assert_eq!(split("plain"), ("", "plain"));
    }

    #[test]
    fn test_locate_in_root() {
        let root = json!({"definitions": {"a": {"type": "string"}}});
        let subs = HashMap::new();
        let found = locate("#/definitions/a", &root, &subs).unwrap();
        assert_eq!(found, &json!({"type": "string"}));
        assert!(std::ptr::eq(found, &root["definitions"]["a"]));
    }

    #[test]
    fn test_locate_root_itself() {
        let root = json!({"type": "object"});
        let subs = HashMap::new();
        assert!(std::ptr::eq(locate("#", &root, &subs).unwrap(), &root));
    }

    #[test]
    fn test_locate_in_namespace_with_or_without_hash() {
        let root = json!({});
        let mut subs = HashMap::new();
        subs.insert("definitions".to_string(), json!({"name": {"type": "string"}}));
        subs.insert("other#".to_string(), json!({"n": {"type": "number"}}));
        assert_eq!(
            locate("definitions#/name", &root, &subs).unwrap(),
            &json!({"type": "string"})
        );
        assert_eq!(
            locate("other#/n", &root, &subs).unwrap(),
            &json!({"type": "number"})
        );
    }

    #[test]
    fn test_locate_array_index() {
        let root = json!({"items": [{"type": "string"}, {"type": "number"}]});
        let subs = HashMap::new();
        assert_eq!(
            locate("#/items/1", &root, &subs).unwrap(),
            &json!({"type": "number"})
        );
    }

    #[test]
    fn test_unknown_namespace() {
        let root = json!({});
        let mut subs = HashMap::new();
        subs.insert("other".to_string(), json!({}));
        assert!(matches!(
            locate("missing#/a", &root, &subs),
            Err(ResolveError::ReferenceNotFound { .. })
        ));
    }

    #[test]
    fn test_namespace_without_sub_schemas_walks_root() {
        let root = json!({"definitions": {"x": {"type": "string"}}});
        let subs = HashMap::new();
        let found = locate("defs#/definitions/x", &root, &subs).unwrap();
        assert!(std::ptr::eq(found, &root["definitions"]["x"]));
    }

    #[test]
    fn test_missing_path_segment() {
        let root = json!({"definitions": {}});
        let subs = HashMap::new();
        assert!(matches!(
            locate("#/definitions/nope", &root, &subs),
            Err(ResolveError::MalformedReference { .. })
        ));
    }
}
