//! RFC 7386 JSON Merge Patch documents.
//!
//! Members set to `null` become removals, nested objects are descended into
//! and every other member replaces the value at its path.
//!
//! [`PatchConverter::parse`] only sees the merge document. Applied to a
//! typed document, prefer [`MergePatchConverter::parse_against`]: it drops
//! members the binder cannot resolve and replaces a nested object whole
//! where the current value is `null` or absent.

use serde_json::{Map, Value};
use tracing::debug;
use typed_patch_pointer::{format_pointer, Path};

use super::PatchConverter;
use crate::bind::{Access, Binder};
use crate::error::PatchError;
use crate::ops::Operation;
use crate::patch::Patch;
use crate::shape::{ScalarKind, ShapeKind, ShapeRef};
use crate::value::OpValue;

#[derive(Debug, Clone, Copy, Default)]
pub struct MergePatchConverter;

fn leaf_value(value: &Value) -> OpValue {
    match value {
        Value::Array(_) | Value::Object(_) => OpValue::late(value.clone()),
        _ => OpValue::Concrete(value.clone()),
    }
}

fn collect(prefix: &mut Vec<String>, members: &Map<String, Value>, out: &mut Vec<Operation>) {
    for (key, value) in members {
        prefix.push(key.clone());
        match value {
            Value::Null => out.push(Operation::Remove {
                path: Path::of(&format_pointer(prefix.as_slice())),
            }),
            Value::Object(nested) => collect(prefix, nested, out),
            _ => out.push(Operation::Replace {
                path: Path::of(&format_pointer(prefix.as_slice())),
                value: leaf_value(value),
            }),
        }
        prefix.pop();
    }
}

fn member_operation(prefix: &[String], value: &Value) -> Operation {
    let path = Path::of(&format_pointer(prefix));
    match value {
        Value::Null => Operation::Remove { path },
        _ => Operation::Replace {
            path,
            value: leaf_value(value),
        },
    }
}

/// Whether members of a document at `shape` are addressed by name.
fn has_members(shape: &ShapeRef) -> bool {
    matches!(
        shape.non_optional().kind(),
        ShapeKind::Record(_) | ShapeKind::Map { .. } | ShapeKind::Scalar(ScalarKind::Any)
    )
}

/// Walks `members` alongside the current value and its shape.
fn collect_against(
    prefix: &mut Vec<String>,
    members: &Map<String, Value>,
    current: Option<&Value>,
    shape: &ShapeRef,
    binder: &Binder,
    out: &mut Vec<Operation>,
) {
    let node = shape.non_optional();
    for (key, value) in members {
        let (stored, child_shape) = match node.kind() {
            ShapeKind::Record(fields) => {
                let child = current.and_then(|c| c.get(key));
                let descend = value.is_object() && child.is_some_and(Value::is_object);
                let side = if descend { Access::Read } else { Access::Write };
                let Some((name, field)) = binder
                    .resolve(key, node, side)
                    .and_then(|name| fields.get(&name).map(|field| (name, field)))
                else {
                    debug!(member = %key, shape = %node, "dropping unmapped merge member");
                    continue;
                };
                (name, field)
            }
            ShapeKind::Map { value: entry } => (key.clone(), entry),
            _ => (key.clone(), node),
        };
        prefix.push(key.clone());
        let child = current.and_then(|c| c.get(&stored));
        match (value, child) {
            (Value::Object(nested), Some(existing @ Value::Object(_))) if has_members(child_shape) => {
                collect_against(prefix, nested, Some(existing), child_shape, binder, out)
            }
            _ => out.push(member_operation(prefix, value)),
        }
        prefix.pop();
    }
}

fn insert_at(document: &mut Value, path: &Path, value: Value) -> Result<(), PatchError> {
    let Some((last, init)) = path.segments().split_last() else {
        *document = value;
        return Ok(());
    };
    let conflict = || {
        PatchError::InvalidDocument(format!(
            "'{path}' conflicts with an earlier member of the merge document"
        ))
    };
    let mut current = document;
    for segment in init {
        current = match current {
            Value::Object(map) => map
                .entry(segment.raw().to_string())
                .or_insert_with(|| Value::Object(Map::new())),
            _ => return Err(conflict()),
        };
    }
    match current {
        Value::Object(map) => {
            map.insert(last.raw().to_string(), value);
            Ok(())
        }
        _ => Err(conflict()),
    }
}

impl MergePatchConverter {
    /// Translates `document` for application to `target`, an instance of
    /// `shape`.
    ///
    /// Members the binder cannot resolve are ignored. A nested object is
    /// merged member by member where `target` already holds an object there,
    /// and otherwise replaces the value whole.
    ///
    /// # Example
    ///
    /// ```
    /// use serde_json::json;
    /// use typed_patch::{Binder, MergePatchConverter, Shape};
    ///
    /// let address = Shape::record("Address").field("city", Shape::string()).build();
    /// let person = Shape::record("Person")
    ///     .field("name", Shape::string())
    ///     .field("address", Shape::optional(address))
    ///     .build();
    /// let doc = json!({"name": "Bilbo", "address": null});
    /// let patch = MergePatchConverter
    ///     .parse_against(
    ///         &json!({"address": {"city": "Hobbiton"}, "_links": {"self": "x"}}),
    ///         &doc,
    ///         &person,
    ///         &Binder::exact(),
    ///     )
    ///     .unwrap();
    /// let out = patch.apply(&doc, &person, &Binder::exact()).unwrap();
    /// assert_eq!(out, json!({"name": "Bilbo", "address": {"city": "Hobbiton"}}));
    /// ```
    pub fn parse_against(
        &self,
        document: &Value,
        target: &Value,
        shape: &ShapeRef,
        binder: &Binder,
    ) -> Result<Patch, PatchError> {
        match document {
            Value::Object(members) if has_members(shape) && target.is_object() => {
                let mut operations = Vec::new();
                collect_against(&mut Vec::new(), members, Some(target), shape, binder, &mut operations);
                Ok(Patch::new(operations))
            }
            _ => Ok(Patch::new(vec![Operation::Replace {
                path: Path::root(),
                value: leaf_value(document),
            }])),
        }
    }
}

impl PatchConverter for MergePatchConverter {
    /// # Example
    ///
    /// ```
    /// use serde_json::json;
    /// use typed_patch::{MergePatchConverter, PatchConverter};
    ///
    /// let patch = MergePatchConverter
    ///     .parse(&json!({"name": "Frodo", "nickname": null, "meta": {"age": 33}}))
    ///     .unwrap();
    /// let ops: Vec<_> = patch.iter().map(|op| (op.op_name(), op.path().as_str())).collect();
    /// assert_eq!(ops, vec![("replace", "/name"), ("remove", "/nickname"), ("replace", "/meta/age")]);
    /// ```
    fn parse(&self, document: &Value) -> Result<Patch, PatchError> {
        let Value::Object(members) = document else {
            return Ok(Patch::new(vec![Operation::Replace {
                path: Path::root(),
                value: leaf_value(document),
            }]));
        };
        let mut operations = Vec::new();
        collect(&mut Vec::new(), members, &mut operations);
        Ok(Patch::new(operations))
    }

    fn render(&self, patch: &Patch) -> Result<Value, PatchError> {
        let mut document = Value::Object(Map::new());
        for operation in patch {
            let value = match operation {
                Operation::Replace { value, .. } => value.raw().clone(),
                Operation::Remove { .. } => Value::Null,
                other => {
                    return Err(PatchError::InvalidDocument(format!(
                        "a merge patch cannot express '{}'",
                        other.op_name()
                    )))
                }
            };
            insert_at(&mut document, operation.path(), value)?;
        }
        Ok(document)
    }
}
