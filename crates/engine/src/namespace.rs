//! Dotted-path lookup over the layered context namespace.
//!
//! The namespace handed to tag resolution is one JSON tree assembled by the
//! job controller (`job.*` and `steps.*` roots). Paths walk that tree one
//! dot-separated segment at a time; any miss yields `Null` rather than an
//! error, so a workflow can probe for values that may not exist yet.

use serde_json::Value;

/// Resolves a dotted path against `root`, returning `Null` on any miss.
///
/// Each segment indexes the current node: object segments by key, array
/// segments by a base-10 index. Anything else (scalar node, bad index,
/// missing key) stops the walk and yields `Null`.
pub fn resolve_path(root: &Value, path: &str) -> Value {
    let mut current = root;
    for segment in path.split('.') {
        match current {
            Value::Object(map) => match map.get(segment) {
                Some(next) => current = next,
                None => return Value::Null,
            },
            Value::Array(items) => match segment.parse::<usize>().ok().and_then(|i| items.get(i)) {
                Some(next) => current = next,
                None => return Value::Null,
            },
            _ => return Value::Null,
        }
    }
    current.clone()
}

/// Truthiness used by `if` conditions.
///
/// `Null`, `false`, numeric zero, the empty string, and empty composites
/// are falsy; everything else is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn walks_objects_and_arrays() {
        let root = json!({
            "steps": {
                "fetch": {
                    "result": { "elements": [ { "child": { "inner": "deep" } } ] }
                }
            }
        });
        assert_eq!(
            resolve_path(&root, "steps.fetch.result.elements.0.child.inner"),
            json!("deep")
        );
    }

    #[test]
    fn any_miss_yields_null() {
        let root = json!({ "job": { "variables": { "a": 1 } } });
        assert_eq!(resolve_path(&root, "job.variables.missing"), Value::Null);
        assert_eq!(resolve_path(&root, "job.variables.a.too_deep"), Value::Null);
        assert_eq!(resolve_path(&root, "nowhere.at.all"), Value::Null);
    }

    #[test]
    fn array_indices_must_be_in_bounds() {
        let root = json!({ "list": [10, 20] });
        assert_eq!(resolve_path(&root, "list.1"), json!(20));
        assert_eq!(resolve_path(&root, "list.2"), Value::Null);
        assert_eq!(resolve_path(&root, "list.x"), Value::Null);
    }

    #[test]
    fn truthiness_matches_the_condition_contract() {
        for falsy in [json!(null), json!(false), json!(0), json!(0.0), json!(""), json!([]), json!({})] {
            assert!(!is_truthy(&falsy), "{falsy} should be falsy");
        }
        for truthy in [json!(true), json!(-1), json!(0.5), json!("no"), json!([0]), json!({"k": null})] {
            assert!(is_truthy(&truthy), "{truthy} should be truthy");
        }
    }
}
