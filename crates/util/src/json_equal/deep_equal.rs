use serde_json::{Number, Value};

use crate::numeric::NormalizedNumber;

/// Compares two numbers by value, regardless of integer or float storage.
pub fn numbers_equal(a: &Number, b: &Number) -> bool {
    a == b || NormalizedNumber::from_number(a) == NormalizedNumber::from_number(b)
}

/// Performs a deep equality check between two JSON values.
///
/// Arrays compare element by element, objects key by key regardless of
/// member order. Numbers are compared after normalization, so an integer
/// equals a float holding the same value.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use typed_patch_util::json_equal::deep_equal;
///
/// assert!(deep_equal(&json!({"count": [1, 2]}), &json!({"count": [1.0, 2]})));
/// assert!(!deep_equal(&json!({"count": 5}), &json!({"count": 6})));
/// ```
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => numbers_equal(a, b),
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(arr_a), Value::Array(arr_b)) => {
            arr_a.len() == arr_b.len() && arr_a.iter().zip(arr_b).all(|(a, b)| deep_equal(a, b))
        }
        (Value::Object(obj_a), Value::Object(obj_b)) => {
            obj_a.len() == obj_b.len()
                && obj_a
                    .iter()
                    .all(|(key, val_a)| obj_b.get(key).is_some_and(|val_b| deep_equal(val_a, val_b)))
        }
        // Different types are never equal
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_number_kinds_are_normalized() {
        assert!(deep_equal(&json!(1), &json!(1.0)));
        assert!(deep_equal(&json!(5.0), &json!(5)));
        assert!(!deep_equal(&json!(1), &json!(1.5)));
    }

    #[test]
    fn test_number_and_array_not_equal() {
        assert!(!deep_equal(&json!(1), &json!([])));
    }

    #[test]
    fn test_zero_and_null_not_equal() {
        assert!(!deep_equal(&json!(0), &json!(null)));
    }

    #[test]
    fn test_empty_string_and_null_not_equal() {
        assert!(!deep_equal(&json!(""), &json!(null)));
    }

    #[test]
    fn test_one_and_true_not_equal() {
        assert!(!deep_equal(&json!(1), &json!(true)));
    }

    #[test]
    fn test_numeric_string_is_not_a_number() {
        assert!(!deep_equal(&json!("1"), &json!(1)));
    }

    #[test]
    fn test_equal_objects_different_order() {
        assert!(deep_equal(
            &json!({"a": 1, "b": "2"}),
            &json!({"b": "2", "a": 1})
        ));
    }

    #[test]
    fn test_not_equal_objects_extra_property() {
        assert!(!deep_equal(
            &json!({"a": 1, "b": "2"}),
            &json!({"a": 1, "b": "2", "c": []})
        ));
    }

    #[test]
    fn test_not_equal_objects_different_properties() {
        assert!(!deep_equal(
            &json!({"a": 1, "b": "2", "c": 3}),
            &json!({"a": 1, "b": "2", "d": 3})
        ));
    }

    #[test]
    fn test_arrays_are_ordered() {
        assert!(deep_equal(&json!([1, 2, 3]), &json!([1, 2, 3.0])));
        assert!(!deep_equal(&json!([1, 2, 3]), &json!([3, 2, 1])));
        assert!(!deep_equal(&json!([1, 2, 3]), &json!([1, 2])));
    }

    #[test]
    fn test_nested_records() {
        let a = json!({
            "title": "Groceries",
            "items": [{"name": "milk", "count": 2}, {"name": "eggs", "count": 12}],
            "meta": {"priority": 1, "tags": ["home"]}
        });
        let b = json!({
            "meta": {"tags": ["home"], "priority": 1.0},
            "items": [{"count": 2.0, "name": "milk"}, {"name": "eggs", "count": 12}],
            "title": "Groceries"
        });
        assert!(deep_equal(&a, &b));
    }
}
