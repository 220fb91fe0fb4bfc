//! RFC 6902 JSON Patch documents.

use std::sync::Arc;

use serde_json::{Map, Value};
use typed_patch_pointer::{validate_pointer, Path};

use super::PatchConverter;
use crate::error::PatchError;
use crate::ops::Operation;
use crate::patch::Patch;
use crate::value::OpValue;

/// Converts `[{"op": ..., "path": ..., "value"?: ..., "from"?: ...}]` arrays.
///
/// Scalar values are used as given. Objects and arrays become late values,
/// shaped once their destination is known.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use typed_patch::{JsonPatchConverter, PatchConverter};
///
/// let doc = json!([
///     {"op": "replace", "path": "/name", "value": "Frodo"},
///     {"op": "move", "from": "/tags/0", "path": "/tags/-"}
/// ]);
/// let patch = JsonPatchConverter.parse(&doc).unwrap();
/// assert_eq!(patch.len(), 2);
/// assert_eq!(JsonPatchConverter.render(&patch).unwrap(), doc);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPatchConverter;

fn invalid(index: usize, reason: impl std::fmt::Display) -> PatchError {
    PatchError::InvalidDocument(format!("operation {index}: {reason}"))
}

fn decode_path(index: usize, op: &Map<String, Value>, field: &str) -> Result<Arc<Path>, PatchError> {
    let pointer = op
        .get(field)
        .ok_or_else(|| invalid(index, format!("missing '{field}'")))?
        .as_str()
        .ok_or_else(|| invalid(index, format!("'{field}' must be a string")))?;
    validate_pointer(pointer).map_err(|err| invalid(index, err))?;
    Ok(Path::of(pointer))
}

fn decode_value(op: &Map<String, Value>) -> OpValue {
    match op.get("value") {
        None | Some(Value::Null) => OpValue::Concrete(Value::Null),
        Some(value @ (Value::Object(_) | Value::Array(_))) => OpValue::late(value.clone()),
        Some(value) => OpValue::Concrete(value.clone()),
    }
}

fn decode_op(index: usize, node: &Value) -> Result<Operation, PatchError> {
    let op = node
        .as_object()
        .ok_or_else(|| invalid(index, "must be an object"))?;
    let name = op
        .get("op")
        .ok_or_else(|| invalid(index, "missing 'op'"))?
        .as_str()
        .ok_or_else(|| invalid(index, "'op' must be a string"))?;
    let path = decode_path(index, op, "path")?;

    Ok(match name {
        "add" => Operation::Add {
            path,
            value: decode_value(op),
        },
        "remove" => Operation::Remove { path },
        "replace" => Operation::Replace {
            path,
            value: decode_value(op),
        },
        "move" => Operation::Move {
            path,
            from: decode_path(index, op, "from")?,
        },
        "copy" => Operation::Copy {
            path,
            from: decode_path(index, op, "from")?,
        },
        "test" => Operation::Test {
            path,
            value: decode_value(op),
        },
        other => {
            return Err(PatchError::UnsupportedOperation {
                op: other.to_string(),
            })
        }
    })
}

fn encode_op(operation: &Operation) -> Value {
    let mut m = Map::new();
    m.insert("op".into(), Value::from(operation.op_name()));
    if let Some(from) = operation.source() {
        m.insert("from".into(), Value::from(from.as_str()));
    }
    m.insert("path".into(), Value::from(operation.path().as_str()));
    if let Some(value) = operation.value() {
        m.insert("value".into(), value.raw().clone());
    }
    Value::Object(m)
}

impl PatchConverter for JsonPatchConverter {
    fn parse(&self, document: &Value) -> Result<Patch, PatchError> {
        let ops = document.as_array().ok_or_else(|| {
            PatchError::InvalidDocument("a JSON Patch document must be an array".into())
        })?;
        ops.iter()
            .enumerate()
            .map(|(index, node)| decode_op(index, node))
            .collect()
    }

    fn render(&self, patch: &Patch) -> Result<Value, PatchError> {
        Ok(Value::Array(patch.iter().map(encode_op).collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_non_array_documents() {
        let err = JsonPatchConverter.parse(&json!({"op": "add"})).unwrap_err();
        assert!(matches!(err, PatchError::InvalidDocument(_)));
    }

    #[test]
    fn unknown_op_is_unsupported() {
        let err = JsonPatchConverter
            .parse(&json!([{"op": "str_ins", "path": "/a"}]))
            .unwrap_err();
        assert_eq!(err.to_string(), "Unrecognized operation type: str_ins");
    }

    #[test]
    fn move_and_copy_require_from() {
        let err = JsonPatchConverter
            .parse(&json!([{"op": "move", "path": "/a"}]))
            .unwrap_err();
        assert_eq!(
            err,
            PatchError::InvalidDocument("operation 0: missing 'from'".into())
        );
    }

    #[test]
    fn rejects_invalid_pointers() {
        let err = JsonPatchConverter
            .parse(&json!([{"op": "remove", "path": "a/b"}]))
            .unwrap_err();
        assert!(matches!(err, PatchError::InvalidDocument(_)));
    }

    #[test]
    fn structured_values_are_late() {
        let patch = JsonPatchConverter
            .parse(&json!([
                {"op": "add", "path": "/a", "value": {"x": 1}},
                {"op": "add", "path": "/b", "value": 1},
                {"op": "add", "path": "/c"}
            ]))
            .unwrap();
        let values: Vec<_> = patch.iter().filter_map(Operation::value).collect();
        assert!(matches!(values[0], OpValue::Late(_)));
        assert!(matches!(values[1], OpValue::Concrete(_)));
        assert!(matches!(values[2], OpValue::Concrete(Value::Null)));
    }

    #[test]
    fn render_omits_absent_members() {
        let patch = Patch::new(vec![Operation::remove("/a"), Operation::copy_from("/b", "/c")]);
        assert_eq!(
            JsonPatchConverter.render(&patch).unwrap(),
            json!([
                {"op": "remove", "path": "/a"},
                {"op": "copy", "from": "/b", "path": "/c"}
            ])
        );
    }
}
