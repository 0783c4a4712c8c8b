//! Deep Merge
//!
//! Combines a base document (the defaults) with an overlay (a stored or
//! partial document), overlay winning.
//!
//! Rules, applied per key of the overlay:
//!
//! ```text
//!   overlay value is an object       → recurse into base[key] (or {} if base[key] is not an object)
//!   overlay value is anything else   → replaces base[key] wholesale
//!     (scalar, null, or ARRAY — arrays are never concatenated or merged element-wise)
//!   key only in base                 → kept as is
//! ```
//!
//! New default fields therefore appear for users whose stored document
//! predates them, without a migration step.

use serde_json::{Map, Value};

/// Merge `overlay` over `base` and return the combined value.
///
/// A non-object overlay (e.g. `null`) contributes nothing and the base is
/// returned unchanged.
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    let Value::Object(overlay) = overlay else {
        return base.clone();
    };

    let mut result = match base {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    merge_into(&mut result, overlay);
    Value::Object(result)
}

fn merge_into(target: &mut Map<String, Value>, overlay: &Map<String, Value>) {
    for (key, value) in overlay {
        match value {
            Value::Object(nested) => {
                let slot = target
                    .entry(key.clone())
                    .or_insert_with(|| Value::Object(Map::new()));
                if !slot.is_object() {
                    *slot = Value::Object(Map::new());
                }
                if let Value::Object(inner) = slot {
                    merge_into(inner, nested);
                }
            }
            other => {
                target.insert(key.clone(), other.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_records_merge_key_by_key() {
        let base = json!({"a": 1, "b": {"c": 2}});
        let overlay = json!({"b": {"d": 3}});
        assert_eq!(deep_merge(&base, &overlay), json!({"a": 1, "b": {"c": 2, "d": 3}}));
    }

    #[test]
    fn test_arrays_are_replaced_wholesale() {
        let base = json!({"testimonials": ["Y", "Z"]});
        let overlay = json!({"testimonials": ["X"]});
        assert_eq!(deep_merge(&base, &overlay), json!({"testimonials": ["X"]}));

        let overlay = json!({"testimonials": []});
        assert_eq!(deep_merge(&base, &overlay), json!({"testimonials": []}));
    }

    #[test]
    fn test_null_and_scalars_replace() {
        let base = json!({"a": {"x": 1}, "b": "keep", "c": 3});
        let overlay = json!({"a": null, "c": "three"});
        assert_eq!(
            deep_merge(&base, &overlay),
            json!({"a": null, "b": "keep", "c": "three"})
        );
    }

    #[test]
    fn test_object_over_scalar_starts_from_empty() {
        let base = json!({"hero": "flat"});
        let overlay = json!({"hero": {"title": "T"}});
        assert_eq!(deep_merge(&base, &overlay), json!({"hero": {"title": "T"}}));
    }

    #[test]
    fn test_keys_only_in_overlay_are_added() {
        let base = json!({"a": 1});
        let overlay = json!({"z": {"deep": [1, 2]}});
        assert_eq!(deep_merge(&base, &overlay), json!({"a": 1, "z": {"deep": [1, 2]}}));
    }

    #[test]
    fn test_non_object_overlay_returns_base() {
        let base = json!({"a": 1});
        assert_eq!(deep_merge(&base, &Value::Null), base);
        assert_eq!(deep_merge(&base, &json!([1, 2])), base);
        assert_eq!(deep_merge(&base, &json!("text")), base);
    }

    #[test]
    fn test_base_is_not_mutated() {
        let base = json!({"b": {"c": 2}});
        let _ = deep_merge(&base, &json!({"b": {"c": 9}}));
        assert_eq!(base, json!({"b": {"c": 2}}));
    }

    #[test]
    fn test_merge_is_idempotent_for_same_overlay() {
        let base = json!({"a": 1, "b": {"c": 2, "d": [1]}});
        let overlay = json!({"b": {"d": [7], "e": null}});
        let once = deep_merge(&base, &overlay);
        let twice = deep_merge(&once, &overlay);
        assert_eq!(once, twice);
    }
}
