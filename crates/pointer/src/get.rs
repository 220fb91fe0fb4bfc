use serde_json::Value;

use crate::types::{Segment, SegmentKind};

/// Steps one segment into an untyped value.
///
/// Objects are keyed by the raw segment. Arrays accept numeric segments and
/// the append marker, which reads the last element.
pub fn step<'a>(val: &'a Value, segment: &Segment) -> Option<&'a Value> {
    match val {
        Value::Object(map) => map.get(segment.raw()),
        Value::Array(arr) => match segment.kind() {
            SegmentKind::Number(index) => arr.get(index),
            SegmentKind::Append => arr.last(),
            SegmentKind::Name => None,
        },
        _ => None,
    }
}

/// Mutable counterpart of [`step`].
pub fn step_mut<'a>(val: &'a mut Value, segment: &Segment) -> Option<&'a mut Value> {
    match val {
        Value::Object(map) => map.get_mut(segment.raw()),
        Value::Array(arr) => match segment.kind() {
            SegmentKind::Number(index) => arr.get_mut(index),
            SegmentKind::Append => arr.last_mut(),
            SegmentKind::Name => None,
        },
        _ => None,
    }
}

/// Get a value from a JSON document by segments.
///
/// # Example
///
/// ```
/// use typed_patch_pointer::{get, Path};
/// use serde_json::json;
///
/// let doc = json!({"foo": {"bar": [1, 2]}});
/// assert_eq!(get(&doc, Path::parse("/foo/bar/-").segments()), Some(&json!(2)));
/// assert_eq!(get(&doc, Path::parse("/missing").segments()), None);
/// ```
pub fn get<'a>(val: &'a Value, segments: &[Segment]) -> Option<&'a Value> {
    segments.iter().try_fold(val, step)
}

/// Mutable counterpart of [`get`].
pub fn get_mut<'a>(val: &'a mut Value, segments: &[Segment]) -> Option<&'a mut Value> {
    let mut current = val;
    for segment in segments {
        current = step_mut(current, segment)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Path;
    use serde_json::json;

    #[test]
    fn steps_into_objects_by_raw_key() {
        let doc = json!({"0": "zero", "a/b": 1});
        assert_eq!(get(&doc, Path::parse("/0").segments()), Some(&json!("zero")));
        assert_eq!(get(&doc, Path::parse("/a~1b").segments()), Some(&json!(1)));
    }

    #[test]
    fn steps_into_arrays() {
        let doc = json!([10, 20, 30]);
        assert_eq!(get(&doc, Path::parse("/1").segments()), Some(&json!(20)));
        assert_eq!(get(&doc, Path::parse("/-").segments()), Some(&json!(30)));
        assert_eq!(get(&doc, Path::parse("/3").segments()), None);
        assert_eq!(get(&doc, Path::parse("/x").segments()), None);
    }

    #[test]
    fn scalars_have_no_children() {
        assert_eq!(get(&json!(1), Path::parse("/a").segments()), None);
    }

    #[test]
    fn get_mut_allows_in_place_update() {
        let mut doc = json!({"a": [1, 2]});
        *get_mut(&mut doc, Path::parse("/a/0").segments()).unwrap() = json!(5);
        assert_eq!(doc, json!({"a": [5, 2]}));
    }
}
