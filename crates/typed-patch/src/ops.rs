//! The six patch operations.

use std::sync::Arc;

use serde_json::Value;
use tracing::trace;
use typed_patch_pointer::Path;
use typed_patch_util::deep_equal;

use crate::bind::{Access, Binder};
use crate::error::PatchError;
use crate::shape::{Shape, ShapeRef};
use crate::typed_path::bind;
use crate::value::OpValue;

/// A single patch operation.
///
/// Paths stay untyped until [`Operation::apply`] binds them against the
/// target's shape.
#[derive(Debug, Clone)]
pub enum Operation {
    Add { path: Arc<Path>, value: OpValue },
    Remove { path: Arc<Path> },
    Replace { path: Arc<Path>, value: OpValue },
    Move { path: Arc<Path>, from: Arc<Path> },
    Copy { path: Arc<Path>, from: Arc<Path> },
    Test { path: Arc<Path>, value: OpValue },
}

impl Operation {
    pub fn add(path: &str, value: impl Into<OpValue>) -> Self {
        Operation::Add {
            path: Path::of(path),
            value: value.into(),
        }
    }

    pub fn remove(path: &str) -> Self {
        Operation::Remove {
            path: Path::of(path),
        }
    }

    pub fn replace(path: &str, value: impl Into<OpValue>) -> Self {
        Operation::Replace {
            path: Path::of(path),
            value: value.into(),
        }
    }

    pub fn move_from(from: &str, path: &str) -> Self {
        Operation::Move {
            path: Path::of(path),
            from: Path::of(from),
        }
    }

    pub fn copy_from(from: &str, path: &str) -> Self {
        Operation::Copy {
            path: Path::of(path),
            from: Path::of(from),
        }
    }

    pub fn test(path: &str, value: impl Into<OpValue>) -> Self {
        Operation::Test {
            path: Path::of(path),
            value: value.into(),
        }
    }

    pub fn op_name(&self) -> &'static str {
        match self {
            Operation::Add { .. } => "add",
            Operation::Remove { .. } => "remove",
            Operation::Replace { .. } => "replace",
            Operation::Move { .. } => "move",
            Operation::Copy { .. } => "copy",
            Operation::Test { .. } => "test",
        }
    }

    pub fn path(&self) -> &Arc<Path> {
        match self {
            Operation::Add { path, .. }
            | Operation::Remove { path }
            | Operation::Replace { path, .. }
            | Operation::Move { path, .. }
            | Operation::Copy { path, .. }
            | Operation::Test { path, .. } => path,
        }
    }

    pub fn source(&self) -> Option<&Arc<Path>> {
        match self {
            Operation::Move { from, .. } | Operation::Copy { from, .. } => Some(from),
            _ => None,
        }
    }

    pub fn value(&self) -> Option<&OpValue> {
        match self {
            Operation::Add { value, .. }
            | Operation::Replace { value, .. }
            | Operation::Test { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Applies the operation to `target`, an instance of `root`.
    ///
    /// Returns the value previously found at the path, where there was one.
    pub fn apply(
        &self,
        target: &mut Value,
        root: &ShapeRef,
        binder: &Binder,
    ) -> Result<Option<Value>, PatchError> {
        trace!(op = self.op_name(), path = %self.path(), "applying operation");
        match self {
            Operation::Add { path, value } => {
                let typed = bind(path, root, Access::Write, binder)?;
                let shape = typed.insertion_shape(value.raw().is_array());
                let value = evaluate(value, shape, path)?;
                typed.add(target, value)
            }
            Operation::Remove { path } => {
                let typed = bind(path, root, Access::Write, binder)?;
                typed.remove(target).map(Some)
            }
            Operation::Replace { path, value } => {
                let typed = bind(path, root, Access::Write, binder)?;
                let previous = typed.get(target)?;
                let value = evaluate(value, typed.leaf(), path)?;
                typed.set(target, value)?;
                Ok(Some(previous))
            }
            Operation::Move { path, from } => {
                // The source is read first, then cleared: both sides must bind.
                bind(from, root, Access::Read, binder)?;
                let source = bind(from, root, Access::Write, binder)?;
                let destination = bind(path, root, Access::Write, binder)?;
                destination.move_from(&source, target)
            }
            Operation::Copy { path, from } => {
                let source = bind(from, root, Access::Read, binder)?;
                let destination = bind(path, root, Access::Write, binder)?;
                destination.copy_from(&source, target)
            }
            Operation::Test { path, value } => {
                let typed = bind(path, root, Access::Read, binder)?;
                let actual = typed.get(target)?;
                let failed = || PatchError::TestFailed {
                    path: path.to_string(),
                };
                let expected = match value {
                    OpValue::Concrete(expected) => expected.clone(),
                    OpValue::Late(late) => late.materialize(typed.leaf()).map_err(|_| failed())?,
                };
                if deep_equal(&actual, &expected) {
                    Ok(Some(actual))
                } else {
                    Err(failed())
                }
            }
        }
    }
}

/// Evaluates an operation value for a destination, refusing `null` where
/// the destination cannot hold it.
fn evaluate(value: &OpValue, shape: &Shape, path: &Path) -> Result<Value, PatchError> {
    if value.raw().is_null() && !shape.is_nullable() {
        return Err(PatchError::NotNullable {
            path: path.to_string(),
        });
    }
    value.evaluate(shape, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn person() -> ShapeRef {
        Shape::record("Person")
            .field("name", Shape::string())
            .field("nickname", Shape::optional(Shape::string()))
            .field("age", Shape::integer())
            .build()
    }

    fn apply(op: Operation, doc: &mut Value) -> Result<Option<Value>, PatchError> {
        op.apply(doc, &person(), &Binder::exact())
    }

    #[test]
    fn accessors() {
        let op = Operation::copy_from("/a", "/b");
        assert_eq!(op.op_name(), "copy");
        assert_eq!(op.path().as_str(), "/b");
        assert_eq!(op.source().map(|p| p.as_str()), Some("/a"));
        assert!(op.value().is_none());
    }

    #[test]
    fn replace_returns_previous_value() {
        let mut doc = json!({"name": "Bilbo", "nickname": null, "age": 111});
        let previous = apply(Operation::replace("/name", json!("Frodo")), &mut doc).unwrap();
        assert_eq!(previous, Some(json!("Bilbo")));
        assert_eq!(doc["name"], json!("Frodo"));
    }

    #[test]
    fn replace_with_null_requires_nullable_leaf() {
        let mut doc = json!({"name": "Bilbo", "nickname": "B", "age": 111});
        let err = apply(Operation::replace("/age", Value::Null), &mut doc).unwrap_err();
        assert_eq!(err, PatchError::NotNullable { path: "/age".into() });
        apply(Operation::replace("/nickname", Value::Null), &mut doc).unwrap();
        assert_eq!(doc["nickname"], Value::Null);
    }

    #[test]
    fn replace_converts_to_declared_shape() {
        let mut doc = json!({"name": "Bilbo", "nickname": null, "age": 111});
        apply(Operation::replace("/age", json!("112")), &mut doc).unwrap();
        assert_eq!(doc["age"], json!(112));
        let err = apply(Operation::replace("/age", json!("old")), &mut doc).unwrap_err();
        assert!(matches!(err, PatchError::EvaluationFailed { .. }));
    }

    #[test]
    fn test_failure_names_path() {
        let mut doc = json!({"name": "Bilbo", "nickname": null, "age": 111});
        let err = apply(Operation::test("/age", json!(110)), &mut doc).unwrap_err();
        assert_eq!(err.to_string(), "Test against path '/age' failed.");
    }

    #[test]
    fn test_with_unmaterializable_late_value_fails() {
        let mut doc = json!({"name": "Bilbo", "nickname": null, "age": 111});
        let err = apply(Operation::test("/age", OpValue::late(json!([1]))), &mut doc).unwrap_err();
        assert!(matches!(err, PatchError::TestFailed { .. }));
    }

    #[test]
    fn extreme_exponent_text_fails_evaluation() {
        let mut doc = json!({"name": "Bilbo", "nickname": null, "age": 111});
        for text in ["1e-9223372036854775808", "1e9223372036854775807", "5e-2147483647"] {
            let err = apply(Operation::replace("/age", json!(text)), &mut doc).unwrap_err();
            assert!(matches!(err, PatchError::EvaluationFailed { .. }), "{text}: {err}");
        }
        assert_eq!(doc["age"], json!(111));
    }
}
