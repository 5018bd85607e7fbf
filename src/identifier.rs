//! Identifier utilities: pulling a stable identity out of a list item or a
//! Kubernetes-shaped document, the thing the matcher and list comparator
//! pair items by instead of position (spec §4.4).

use crate::value::{ScalarToken, Value};

const DEFAULT_IDENTIFIER_FIELDS: [&str; 2] = ["name", "id"];

/// Returns the value of the first present field (checked in order, default
/// `name`/`id` plus any `additional_identifiers`) whose value is a
/// comparable scalar. A list is only "identifier-matchable" when at least
/// one of its items resolves an identifier this way.
pub fn list_item_identifier(value: &Value, additional_identifiers: &[String]) -> Option<ScalarToken> {
    let map = value.as_map()?;
    DEFAULT_IDENTIFIER_FIELDS
        .iter()
        .copied()
        .chain(additional_identifiers.iter().map(String::as_str))
        .find_map(|field| map.get(field).and_then(Value::comparable_scalar))
}

pub fn is_identifier_matchable(items: &[Value], additional_identifiers: &[String]) -> bool {
    items
        .iter()
        .any(|item| list_item_identifier(item, additional_identifiers).is_some())
}

/// A value qualifies as a Kubernetes resource iff it is a map with
/// string-typed `apiVersion` and `kind`, and a map-typed `metadata`
/// containing a non-empty string `name` or `generateName`.
pub fn is_kubernetes_resource(value: &Value) -> bool {
    kubernetes_parts(value).is_some()
}

struct KubernetesParts<'a> {
    api_version: &'a str,
    kind: &'a str,
    namespace: Option<&'a str>,
    name: &'a str,
}

fn kubernetes_parts(value: &Value) -> Option<KubernetesParts<'_>> {
    let map = value.as_map()?;
    let api_version = map.get("apiVersion")?.as_str()?;
    let kind = map.get("kind")?.as_str()?;
    let metadata = map.get("metadata")?.as_map()?;
    let name = metadata
        .get("name")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .or_else(|| {
            metadata
                .get("generateName")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
        })?;
    let namespace = metadata.get("namespace").and_then(Value::as_str);

    Some(KubernetesParts {
        api_version,
        kind,
        namespace,
        name,
    })
}

/// Builds the Kubernetes identifier string for `value`, or an empty string
/// for non-resources. `ignore_api_version` drops the `apiVersion` component
/// so that e.g. a `Deployment` promoted from `apps/v1beta1` to `apps/v1`
/// still matches its predecessor.
pub fn kubernetes_identifier(value: &Value, ignore_api_version: bool) -> String {
    let Some(parts) = kubernetes_parts(value) else {
        return String::new();
    };

    let namespaced_name = match parts.namespace {
        Some(ns) => format!("{ns}/{}", parts.name),
        None => parts.name.to_string(),
    };

    if ignore_api_version {
        format!("{}:{namespaced_name}", parts.kind)
    } else {
        format!("{}:{}:{namespaced_name}", parts.api_version, parts.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::OrderedMap;

    fn resource(api_version: &str, kind: &str, namespace: Option<&str>, name: &str) -> Value {
        let mut metadata = OrderedMap::new();
        if let Some(ns) = namespace {
            metadata.insert("namespace", Value::String(ns.to_string()));
        }
        metadata.insert("name", Value::String(name.to_string()));

        let mut map = OrderedMap::new();
        map.insert("apiVersion", Value::String(api_version.to_string()));
        map.insert("kind", Value::String(kind.to_string()));
        map.insert("metadata", Value::Map(metadata));
        Value::Map(map)
    }

    #[test]
    fn list_item_identifier_prefers_name_over_id() {
        let mut m = OrderedMap::new();
        m.insert("id", Value::Int(1));
        m.insert("name", Value::String("web".to_string()));
        assert_eq!(
            list_item_identifier(&Value::Map(m), &[]),
            Some(ScalarToken::String("web".to_string()))
        );
    }

    #[test]
    fn list_item_identifier_tries_additional_fields() {
        let mut m = OrderedMap::new();
        m.insert("key", Value::String("port-443".to_string()));
        let extra = vec!["key".to_string()];
        assert_eq!(
            list_item_identifier(&Value::Map(m), &extra),
            Some(ScalarToken::String("port-443".to_string()))
        );
    }

    #[test]
    fn list_item_identifier_absent_when_no_field_matches() {
        let mut m = OrderedMap::new();
        m.insert("value", Value::Int(8080));
        assert_eq!(list_item_identifier(&Value::Map(m), &[]), None);
    }

    #[test]
    fn detects_kubernetes_resource() {
        let doc = resource("apps/v1", "Deployment", Some("prod"), "web");
        assert!(is_kubernetes_resource(&doc));
    }

    #[test]
    fn rejects_non_resource_missing_metadata() {
        let mut m = OrderedMap::new();
        m.insert("apiVersion", Value::String("v1".to_string()));
        m.insert("kind", Value::String("ConfigMap".to_string()));
        assert!(!is_kubernetes_resource(&Value::Map(m)));
    }

    #[test]
    fn standard_identifier_includes_api_version() {
        let doc = resource("apps/v1", "Deployment", Some("prod"), "web");
        assert_eq!(
            kubernetes_identifier(&doc, false),
            "apps/v1:Deployment:prod/web"
        );
    }

    #[test]
    fn agnostic_identifier_drops_api_version() {
        let doc = resource("apps/v1", "Deployment", Some("prod"), "web");
        assert_eq!(kubernetes_identifier(&doc, true), "Deployment:prod/web");
    }

    #[test]
    fn identifier_falls_back_to_generate_name() {
        let mut metadata = OrderedMap::new();
        metadata.insert("generateName", Value::String("web-".to_string()));
        let mut map = OrderedMap::new();
        map.insert("apiVersion", Value::String("v1".to_string()));
        map.insert("kind", Value::String("Pod".to_string()));
        map.insert("metadata", Value::Map(metadata));
        assert_eq!(kubernetes_identifier(&Value::Map(map), false), "v1:Pod:web-");
    }

    #[test]
    fn non_resource_identifier_is_empty() {
        assert_eq!(kubernetes_identifier(&Value::Null, false), "");
    }
}
