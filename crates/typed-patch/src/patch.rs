//! Ordered operation lists and their application to a document.
//!
//! A [`Patch`] is immutable once built. Applying it walks the operations in
//! order and stops at the first failure.

use serde_json::Value;
use tracing::debug;

use crate::bind::Binder;
use crate::error::PatchError;
use crate::ops::Operation;
use crate::shape::{Patchable, ShapeRef};

/// An ordered list of operations.
///
/// Application is fail-fast: the first failing operation aborts the rest.
#[derive(Debug, Clone, Default)]
pub struct Patch {
    operations: Vec<Operation>,
}

impl Patch {
    pub fn new(operations: Vec<Operation>) -> Self {
        Self { operations }
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Operation> {
        self.operations.iter()
    }

    /// Applies every operation to `target` in order.
    ///
    /// On failure `target` holds the effects of the operations before the
    /// failing one; use [`Patch::apply`] to keep the input intact.
    pub fn apply_in_place(
        &self,
        target: &mut Value,
        shape: &ShapeRef,
        binder: &Binder,
    ) -> Result<Vec<Option<Value>>, PatchError> {
        debug!(operations = self.len(), shape = %shape, "applying patch");
        let mut previous = Vec::with_capacity(self.len());
        for (index, operation) in self.operations.iter().enumerate() {
            match operation.apply(target, shape, binder) {
                Ok(value) => previous.push(value),
                Err(err) => {
                    debug!(index, op = operation.op_name(), error = %err, "patch aborted");
                    return Err(err);
                }
            }
        }
        Ok(previous)
    }

    /// Applies the patch to a copy of `target` and returns the copy.
    ///
    /// # Example
    ///
    /// ```
    /// use serde_json::json;
    /// use typed_patch::{Binder, Operation, Patch, Shape};
    ///
    /// let shape = Shape::record("Hobbit")
    ///     .field("name", Shape::string())
    ///     .field("tags", Shape::list(Shape::string()))
    ///     .build();
    /// let patch = Patch::new(vec![
    ///     Operation::replace("/name", json!("Frodo")),
    ///     Operation::add("/tags/-", json!("c")),
    /// ]);
    /// let doc = json!({"name": "Bilbo", "tags": ["a", "b"]});
    /// let out = patch.apply(&doc, &shape, &Binder::exact()).unwrap();
    /// assert_eq!(out, json!({"name": "Frodo", "tags": ["a", "b", "c"]}));
    /// assert_eq!(doc["name"], json!("Bilbo"));
    /// ```
    pub fn apply(
        &self,
        target: &Value,
        shape: &ShapeRef,
        binder: &Binder,
    ) -> Result<Value, PatchError> {
        let mut working = target.clone();
        self.apply_in_place(&mut working, shape, binder)?;
        Ok(working)
    }

    /// Patches a typed value through its serialized form.
    pub fn apply_to<T: Patchable>(&self, target: &T, binder: &Binder) -> Result<T, PatchError> {
        let shape = T::shape();
        let conversion = |err: serde_json::Error| PatchError::EvaluationFailed {
            path: String::new(),
            shape: shape.name().to_string(),
            reason: err.to_string(),
        };
        let mut working = serde_json::to_value(target).map_err(conversion)?;
        self.apply_in_place(&mut working, &shape, binder)?;
        serde_json::from_value(working).map_err(conversion)
    }
}

impl From<Vec<Operation>> for Patch {
    fn from(operations: Vec<Operation>) -> Self {
        Self::new(operations)
    }
}

impl FromIterator<Operation> for Patch {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Patch {
    type Item = &'a Operation;
    type IntoIter = std::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Shape;
    use serde_json::json;

    fn shape() -> ShapeRef {
        Shape::record("Counter")
            .field("count", Shape::integer())
            .field("tags", Shape::list(Shape::string()))
            .build()
    }

    #[test]
    fn stops_at_first_failure() {
        let patch: Patch = vec![
            Operation::add("/tags/-", json!("x")),
            Operation::test("/count", json!(6)),
            Operation::add("/tags/-", json!("y")),
        ]
        .into();
        let mut doc = json!({"count": 5, "tags": []});
        let err = patch
            .apply_in_place(&mut doc, &shape(), &Binder::exact())
            .unwrap_err();
        assert!(matches!(err, PatchError::TestFailed { .. }));
        assert_eq!(doc["tags"], json!(["x"]));
    }

    #[test]
    fn apply_leaves_input_untouched_on_failure() {
        let patch = Patch::new(vec![
            Operation::remove("/tags/0"),
            Operation::remove("/tags/0"),
        ]);
        let doc = json!({"count": 5, "tags": ["a"]});
        assert!(patch.apply(&doc, &shape(), &Binder::exact()).is_err());
        assert_eq!(doc["tags"], json!(["a"]));
    }

    #[test]
    fn collects_previous_values() {
        let patch: Patch = [
            Operation::replace("/count", json!(6)),
            Operation::add("/tags/0", json!("a")),
        ]
        .into_iter()
        .collect();
        let mut doc = json!({"count": 5, "tags": []});
        let previous = patch
            .apply_in_place(&mut doc, &shape(), &Binder::exact())
            .unwrap();
        assert_eq!(previous, vec![Some(json!(5)), None]);
        assert_eq!(patch.iter().count(), 2);
        assert_eq!((&patch).into_iter().map(Operation::op_name).collect::<Vec<_>>(), vec!["replace", "add"]);
    }
}
