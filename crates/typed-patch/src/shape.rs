//! Runtime descriptions of the declared structure of patchable types.
//!
//! A [`Shape`] plays the role of a type: it tells the binder which segments
//! name properties, which index collections and which key maps. Live
//! instances are plain `serde_json::Value` trees conforming to a shape.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub type ShapeRef = Arc<Shape>;

static NEXT_SHAPE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a shape; two shapes built separately never
/// share an id, even when structurally equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(u64);

impl ShapeId {
    fn next() -> Self {
        Self(NEXT_SHAPE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Integer,
    Float,
    String,
    /// Untyped; anything below it is navigated by the runtime value.
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    List,
    /// Unordered, without duplicates. Addressed by position like a list.
    Set,
}

#[derive(Debug, Clone)]
pub enum ShapeKind {
    Scalar(ScalarKind),
    /// Named fields in declaration order.
    Record(IndexMap<String, ShapeRef>),
    Collection {
        kind: CollectionKind,
        element: ShapeRef,
    },
    /// String keyed map.
    Map { value: ShapeRef },
    /// Nullable wrapper.
    Optional(ShapeRef),
}

#[derive(Debug)]
pub struct Shape {
    id: ShapeId,
    name: String,
    kind: ShapeKind,
}

impl Shape {
    pub fn new(name: impl Into<String>, kind: ShapeKind) -> ShapeRef {
        Arc::new(Self {
            id: ShapeId::next(),
            name: name.into(),
            kind,
        })
    }

    pub fn boolean() -> ShapeRef {
        Self::new("Boolean", ShapeKind::Scalar(ScalarKind::Bool))
    }

    pub fn integer() -> ShapeRef {
        Self::new("Integer", ShapeKind::Scalar(ScalarKind::Integer))
    }

    pub fn float() -> ShapeRef {
        Self::new("Float", ShapeKind::Scalar(ScalarKind::Float))
    }

    pub fn string() -> ShapeRef {
        Self::new("String", ShapeKind::Scalar(ScalarKind::String))
    }

    pub fn any() -> ShapeRef {
        Self::new("Any", ShapeKind::Scalar(ScalarKind::Any))
    }

    pub fn list(element: ShapeRef) -> ShapeRef {
        Self::collection(CollectionKind::List, element)
    }

    pub fn set(element: ShapeRef) -> ShapeRef {
        Self::collection(CollectionKind::Set, element)
    }

    pub fn collection(kind: CollectionKind, element: ShapeRef) -> ShapeRef {
        let name = match kind {
            CollectionKind::List => format!("List<{}>", element.name),
            CollectionKind::Set => format!("Set<{}>", element.name),
        };
        Self::new(name, ShapeKind::Collection { kind, element })
    }

    pub fn map(value: ShapeRef) -> ShapeRef {
        Self::new(format!("Map<String, {}>", value.name), ShapeKind::Map { value })
    }

    pub fn optional(inner: ShapeRef) -> ShapeRef {
        Self::new(format!("Optional<{}>", inner.name), ShapeKind::Optional(inner))
    }

    /// Starts a record shape.
    ///
    /// # Example
    ///
    /// ```
    /// use typed_patch::Shape;
    ///
    /// let todo = Shape::record("Todo")
    ///     .field("description", Shape::optional(Shape::string()))
    ///     .field("complete", Shape::boolean())
    ///     .build();
    /// assert!(todo.field("complete").is_some());
    /// assert!(todo.field("missing").is_none());
    /// ```
    pub fn record(name: impl Into<String>) -> RecordBuilder {
        RecordBuilder {
            name: name.into(),
            fields: IndexMap::new(),
        }
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ShapeKind {
        &self.kind
    }

    /// Whether the shape admits `null`.
    pub fn is_nullable(&self) -> bool {
        matches!(
            self.kind,
            ShapeKind::Optional(_) | ShapeKind::Scalar(ScalarKind::Any)
        )
    }

    /// Strips every `Optional` wrapper.
    pub fn non_optional(self: &Arc<Self>) -> &ShapeRef {
        let mut shape = self;
        while let ShapeKind::Optional(inner) = &shape.kind {
            shape = inner;
        }
        shape
    }

    pub fn field(&self, name: &str) -> Option<&ShapeRef> {
        match &self.kind {
            ShapeKind::Record(fields) => fields.get(name),
            ShapeKind::Optional(inner) => inner.field(name),
            _ => None,
        }
    }

    /// Element shape of a (possibly optional) collection.
    pub fn element(&self) -> Option<&ShapeRef> {
        match &self.kind {
            ShapeKind::Collection { element, .. } => Some(element),
            ShapeKind::Optional(inner) => inner.element(),
            _ => None,
        }
    }

    pub fn is_collection(&self) -> bool {
        self.element().is_some()
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Fluent constructor for record shapes, see [`Shape::record`].
#[derive(Debug)]
pub struct RecordBuilder {
    name: String,
    fields: IndexMap<String, ShapeRef>,
}

impl RecordBuilder {
    pub fn field(mut self, name: impl Into<String>, shape: ShapeRef) -> Self {
        self.fields.insert(name.into(), shape);
        self
    }

    pub fn build(self) -> ShapeRef {
        Shape::new(self.name, ShapeKind::Record(self.fields))
    }
}

/// A typed value that can be patched through a serde round trip.
///
/// Implementations return the same shape instance on every call so the
/// binding cache is shared across values of the type.
pub trait Patchable: Serialize + DeserializeOwned {
    fn shape() -> ShapeRef;
}

// ── Descriptors ───────────────────────────────────────────────────────────

/// Serializable description of a shape, e.g. loaded from a schema file.
///
/// ```json
/// {"type": "record", "name": "Todo", "fields": {
///     "description": {"type": "optional", "inner": {"type": "string"}},
///     "items": {"type": "list", "element": {"type": "string"}}
/// }}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeDescriptor {
    Record {
        name: String,
        #[serde(default)]
        fields: IndexMap<String, ShapeDescriptor>,
    },
    List {
        element: Box<ShapeDescriptor>,
    },
    Set {
        element: Box<ShapeDescriptor>,
    },
    Map {
        value: Box<ShapeDescriptor>,
    },
    Optional {
        inner: Box<ShapeDescriptor>,
    },
    String,
    Integer,
    Float,
    Bool,
    Any,
}

impl ShapeDescriptor {
    pub fn build(&self) -> ShapeRef {
        match self {
            ShapeDescriptor::Record { name, fields } => fields
                .iter()
                .fold(Shape::record(name.clone()), |builder, (field, shape)| {
                    builder.field(field.clone(), shape.build())
                })
                .build(),
            ShapeDescriptor::List { element } => Shape::list(element.build()),
            ShapeDescriptor::Set { element } => Shape::set(element.build()),
            ShapeDescriptor::Map { value } => Shape::map(value.build()),
            ShapeDescriptor::Optional { inner } => Shape::optional(inner.build()),
            ShapeDescriptor::String => Shape::string(),
            ShapeDescriptor::Integer => Shape::integer(),
            ShapeDescriptor::Float => Shape::float(),
            ShapeDescriptor::Bool => Shape::boolean(),
            ShapeDescriptor::Any => Shape::any(),
        }
    }
}

impl From<&Shape> for ShapeDescriptor {
    fn from(shape: &Shape) -> Self {
        let boxed = |shape: &ShapeRef| Box::new(ShapeDescriptor::from(shape.as_ref()));
        match &shape.kind {
            ShapeKind::Scalar(ScalarKind::Bool) => ShapeDescriptor::Bool,
            ShapeKind::Scalar(ScalarKind::Integer) => ShapeDescriptor::Integer,
            ShapeKind::Scalar(ScalarKind::Float) => ShapeDescriptor::Float,
            ShapeKind::Scalar(ScalarKind::String) => ShapeDescriptor::String,
            ShapeKind::Scalar(ScalarKind::Any) => ShapeDescriptor::Any,
            ShapeKind::Record(fields) => ShapeDescriptor::Record {
                name: shape.name.clone(),
                fields: fields
                    .iter()
                    .map(|(name, field)| (name.clone(), ShapeDescriptor::from(field.as_ref())))
                    .collect(),
            },
            ShapeKind::Collection {
                kind: CollectionKind::List,
                element,
            } => ShapeDescriptor::List {
                element: boxed(element),
            },
            ShapeKind::Collection {
                kind: CollectionKind::Set,
                element,
            } => ShapeDescriptor::Set {
                element: boxed(element),
            },
            ShapeKind::Map { value } => ShapeDescriptor::Map {
                value: boxed(value),
            },
            ShapeKind::Optional(inner) => ShapeDescriptor::Optional {
                inner: boxed(inner),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ids_are_unique_per_construction() {
        let a = Shape::string();
        let b = Shape::string();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.name(), b.name());
    }

    #[test]
    fn nullability() {
        assert!(Shape::optional(Shape::integer()).is_nullable());
        assert!(Shape::any().is_nullable());
        assert!(!Shape::integer().is_nullable());
        assert!(!Shape::list(Shape::string()).is_nullable());
    }

    #[test]
    fn non_optional_strips_nested_wrappers() {
        let shape = Shape::optional(Shape::optional(Shape::list(Shape::string())));
        assert_eq!(shape.non_optional().name(), "List<String>");
        assert!(shape.is_collection());
        assert_eq!(shape.element().map(|e| e.name()), Some("String"));
    }

    #[test]
    fn descriptor_builds_records_in_declaration_order() {
        let descriptor: ShapeDescriptor = serde_json::from_value(json!({
            "type": "record",
            "name": "Todo",
            "fields": {
                "id": {"type": "optional", "inner": {"type": "integer"}},
                "items": {"type": "list", "element": {"type": "string"}},
                "labels": {"type": "map", "value": {"type": "bool"}}
            }
        }))
        .unwrap();
        let shape = descriptor.build();
        assert_eq!(shape.name(), "Todo");
        let ShapeKind::Record(fields) = shape.kind() else {
            panic!("expected record");
        };
        let names: Vec<_> = fields.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["id", "items", "labels"]);
        assert_eq!(ShapeDescriptor::from(shape.as_ref()), descriptor);
    }

    #[test]
    fn descriptor_rejects_unknown_type() {
        let result = serde_json::from_value::<ShapeDescriptor>(json!({"type": "tuple"}));
        assert!(result.is_err());
    }
}
