//! Paths bound against a shape.
//!
//! Binding walks the shape once per (shape, pointer, access, binder) and
//! records one [`Step`] per segment. The result is cached process-wide and
//! then replayed against any number of instances.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock};

use dashmap::DashMap;
use serde_json::Value;
use tracing::debug;
use typed_patch_pointer::{step, step_mut, Path, Segment, SegmentKind};
use typed_patch_util::deep_equal;

use crate::bind::{Access, Binder, ContextId};
use crate::error::PatchError;
use crate::shape::{CollectionKind, ScalarKind, Shape, ShapeId, ShapeKind, ShapeRef};
use crate::value::conform;

/// How one segment addresses its parent.
#[derive(Debug, Clone)]
pub enum Step {
    /// A record field, `shape` being its declared shape.
    Property { name: String, shape: ShapeRef },
    Index {
        index: usize,
        kind: CollectionKind,
        element: ShapeRef,
    },
    /// The position after the last element; reads see the last element.
    Append {
        kind: CollectionKind,
        element: ShapeRef,
    },
    /// A map entry, keyed by the raw segment.
    Key { key: String, value: ShapeRef },
    /// Below an untyped node; resolved against the runtime value.
    Dynamic { segment: Segment, shape: ShapeRef },
}

impl Step {
    /// Declared shape of the node this step reaches.
    pub fn shape(&self) -> &ShapeRef {
        match self {
            Step::Property { shape, .. } => shape,
            Step::Index { element, .. } | Step::Append { element, .. } => element,
            Step::Key { value, .. } => value,
            Step::Dynamic { shape, .. } => shape,
        }
    }

    fn child<'a>(&self, value: &'a Value) -> Option<&'a Value> {
        match self {
            Step::Property { name: key, .. } | Step::Key { key, .. } => value.as_object()?.get(key),
            Step::Index { index, .. } => value.as_array()?.get(*index),
            Step::Append { .. } => value.as_array()?.last(),
            Step::Dynamic { segment, .. } => step(value, segment),
        }
    }

    fn child_mut<'a>(&self, value: &'a mut Value) -> Option<&'a mut Value> {
        match self {
            Step::Property { name: key, .. } | Step::Key { key, .. } => {
                value.as_object_mut()?.get_mut(key)
            }
            Step::Index { index, .. } => value.as_array_mut()?.get_mut(*index),
            Step::Append { .. } => value.as_array_mut()?.last_mut(),
            Step::Dynamic { segment, .. } => step_mut(value, segment),
        }
    }
}

/// Position addressed within a list, independent of how it was bound.
enum Slot {
    At(usize),
    End,
}

/// A pointer resolved against a root shape.
#[derive(Debug)]
pub struct TypedPath {
    path: Arc<Path>,
    root: ShapeRef,
    access: Access,
    context: ContextId,
    steps: Vec<Step>,
    leaf: ShapeRef,
}

impl TypedPath {
    /// Binds `path` without consulting the cache.
    pub fn resolve(
        path: Arc<Path>,
        root: &ShapeRef,
        access: Access,
        binder: &Binder,
    ) -> Result<Self, PatchError> {
        let mut current = Arc::clone(root);
        let mut steps = Vec::with_capacity(path.len());
        let last = path.len().saturating_sub(1);

        for (position, segment) in path.segments().iter().enumerate() {
            let side = if position == last { access } else { Access::Read };
            let node = Arc::clone(current.non_optional());
            let unresolvable = || PatchError::UnresolvablePath {
                segment: segment.raw().to_string(),
                path: path.to_string(),
                shape: node.name().to_string(),
                access: side,
            };
            let step = match node.kind() {
                ShapeKind::Map { value } => Step::Key {
                    key: segment.raw().to_string(),
                    value: Arc::clone(value),
                },
                ShapeKind::Collection { kind, element } => match segment.kind() {
                    SegmentKind::Number(index) => Step::Index {
                        index,
                        kind: *kind,
                        element: Arc::clone(element),
                    },
                    SegmentKind::Append => Step::Append {
                        kind: *kind,
                        element: Arc::clone(element),
                    },
                    SegmentKind::Name => return Err(unresolvable()),
                },
                ShapeKind::Record(fields) => {
                    let name = binder
                        .resolve(segment.raw(), &node, side)
                        .ok_or_else(unresolvable)?;
                    let shape = fields.get(&name).ok_or_else(unresolvable)?;
                    Step::Property {
                        shape: Arc::clone(shape),
                        name,
                    }
                }
                ShapeKind::Scalar(ScalarKind::Any) => Step::Dynamic {
                    segment: segment.clone(),
                    shape: Arc::clone(&node),
                },
                ShapeKind::Scalar(_) | ShapeKind::Optional(_) => return Err(unresolvable()),
            };
            current = Arc::clone(step.shape());
            steps.push(step);
        }

        Ok(Self {
            path,
            root: Arc::clone(root),
            access,
            context: binder.id(),
            steps,
            leaf: current,
        })
    }

    pub fn path(&self) -> &Arc<Path> {
        &self.path
    }

    pub fn root(&self) -> &ShapeRef {
        &self.root
    }

    pub fn access(&self) -> Access {
        self.access
    }

    pub fn context(&self) -> ContextId {
        self.context
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Declared shape of the addressed value.
    pub fn leaf(&self) -> &ShapeRef {
        &self.leaf
    }

    /// Shape a value added here must take. A single value added to a
    /// collection property becomes its element.
    pub fn insertion_shape(&self, value_is_collection: bool) -> &ShapeRef {
        match (self.steps.last(), self.leaf.element()) {
            (Some(Step::Property { .. }), Some(element)) if !value_is_collection => element,
            _ => &self.leaf,
        }
    }

    fn no_such_value(&self) -> PatchError {
        PatchError::NoSuchValue {
            path: self.path.to_string(),
        }
    }

    fn out_of_bounds(&self, index: usize, size: usize) -> PatchError {
        PatchError::IndexOutOfBounds {
            path: self.path.to_string(),
            index,
            size,
        }
    }

    fn slot(&self, step: &Step) -> Option<Slot> {
        match step {
            Step::Index { index, .. } => Some(Slot::At(*index)),
            Step::Append { .. } => Some(Slot::End),
            Step::Dynamic { segment, .. } => match segment.kind() {
                SegmentKind::Number(index) => Some(Slot::At(index)),
                SegmentKind::Append => Some(Slot::End),
                SegmentKind::Name => None,
            },
            Step::Property { .. } | Step::Key { .. } => None,
        }
    }

    fn is_set(step: &Step) -> bool {
        matches!(
            step,
            Step::Index { kind: CollectionKind::Set, .. }
                | Step::Append { kind: CollectionKind::Set, .. }
        )
    }

    fn parent<'a>(&self, target: &'a Value) -> Result<&'a Value, PatchError> {
        let mut current = target;
        for step in &self.steps[..self.steps.len().saturating_sub(1)] {
            current = step.child(current).ok_or_else(|| self.no_such_value())?;
        }
        Ok(current)
    }

    /// Walks to the parent of the addressed value. With `create_collection`,
    /// an absent collection field holding the target is created as `null`.
    fn parent_mut<'a>(
        &self,
        target: &'a mut Value,
        create_collection: bool,
    ) -> Result<&'a mut Value, PatchError> {
        let Some((_, init)) = self.steps.split_last() else {
            return Ok(target);
        };
        let mut current = target;
        for (position, step) in init.iter().enumerate() {
            if create_collection && position + 1 == init.len() {
                if let (Step::Property { name, shape }, Value::Object(map)) = (step, &mut *current) {
                    if shape.is_collection() {
                        map.entry(name.clone()).or_insert(Value::Null);
                    }
                }
            }
            current = step.child_mut(current).ok_or_else(|| self.no_such_value())?;
        }
        Ok(current)
    }

    /// Reads the addressed value.
    ///
    /// An absent field or map entry reads as `null`; an absent intermediate
    /// node is an error.
    pub fn get(&self, target: &Value) -> Result<Value, PatchError> {
        let Some(last) = self.steps.last() else {
            return Ok(target.clone());
        };
        let parent = self.parent(target)?;

        if let Some(slot) = self.slot(last) {
            if let Value::Object(map) = parent {
                // Dynamic segments under an object are plain keys.
                if let Step::Dynamic { segment, .. } = last {
                    return Ok(map.get(segment.raw()).cloned().unwrap_or(Value::Null));
                }
            }
            let items: &[Value] = match parent {
                Value::Array(items) => items.as_slice(),
                Value::Null => &[],
                _ => return Err(self.no_such_value()),
            };
            return match slot {
                Slot::At(index) => items
                    .get(index)
                    .cloned()
                    .ok_or_else(|| self.out_of_bounds(index, items.len())),
                Slot::End => items.last().cloned().ok_or_else(|| self.out_of_bounds(0, 0)),
            };
        }

        let key = self.key(last);
        match parent {
            Value::Object(map) => Ok(map.get(key).cloned().unwrap_or(Value::Null)),
            _ => Err(self.no_such_value()),
        }
    }

    fn key<'s>(&self, step: &'s Step) -> &'s str {
        match step {
            Step::Property { name, .. } => name,
            Step::Key { key, .. } => key,
            Step::Dynamic { segment, .. } => segment.raw(),
            Step::Index { .. } | Step::Append { .. } => "",
        }
    }

    /// Assigns the addressed value, returning the previous one. List
    /// positions must already exist.
    pub fn set(&self, target: &mut Value, value: Value) -> Result<Option<Value>, PatchError> {
        let Some(last) = self.steps.last() else {
            return Ok(Some(std::mem::replace(target, value)));
        };
        let parent = self.parent_mut(target, false)?;

        if let Some(slot) = self.slot(last) {
            if let Value::Array(items) = parent {
                let size = items.len();
                let index = match slot {
                    Slot::At(index) => index,
                    Slot::End => size.checked_sub(1).ok_or_else(|| self.out_of_bounds(0, 0))?,
                };
                let item = items.get_mut(index).ok_or_else(|| self.out_of_bounds(index, size))?;
                return Ok(Some(std::mem::replace(item, value)));
            }
            if !matches!(last, Step::Dynamic { .. }) {
                return Err(match parent {
                    Value::Null => self.out_of_bounds(Self::requested_index(&slot), 0),
                    _ => self.no_such_value(),
                });
            }
        }

        let key = self.key(last).to_string();
        match parent {
            Value::Object(map) => Ok(map.insert(key, value)),
            _ => Err(self.no_such_value()),
        }
    }

    fn requested_index(slot: &Slot) -> usize {
        match slot {
            Slot::At(index) => *index,
            Slot::End => 0,
        }
    }

    /// Clears the addressed value and returns it.
    ///
    /// Fields are set to `null`, which requires a nullable shape. Map
    /// entries are removed. List elements are deleted, shifting later ones.
    pub fn remove(&self, target: &mut Value) -> Result<Value, PatchError> {
        let Some(last) = self.steps.last() else {
            if !self.leaf.is_nullable() {
                return Err(PatchError::NotNullable {
                    path: self.path.to_string(),
                });
            }
            return Ok(std::mem::take(target));
        };
        let parent = self.parent_mut(target, false)?;

        if let Some(slot) = self.slot(last) {
            if let Value::Array(items) = parent {
                let size = items.len();
                let index = match slot {
                    Slot::At(index) => index,
                    Slot::End => size.checked_sub(1).ok_or_else(|| self.out_of_bounds(0, 0))?,
                };
                if index >= size {
                    return Err(self.out_of_bounds(index, size));
                }
                return Ok(items.remove(index));
            }
            if !matches!(last, Step::Dynamic { .. }) {
                return Err(match parent {
                    Value::Null => self.out_of_bounds(Self::requested_index(&slot), 0),
                    _ => self.no_such_value(),
                });
            }
        }

        let Value::Object(map) = parent else {
            return Err(self.no_such_value());
        };
        match last {
            Step::Property { name, shape } => {
                if !shape.is_nullable() {
                    return Err(PatchError::NotNullable {
                        path: self.path.to_string(),
                    });
                }
                let previous = map.insert(name.clone(), Value::Null);
                Ok(previous.unwrap_or(Value::Null))
            }
            _ => Ok(map.shift_remove(self.key(last)).unwrap_or(Value::Null)),
        }
    }

    /// Adds `value` at the addressed location, returning what it displaced.
    ///
    /// List positions insert (`index == size` appends); a `null` collection
    /// is created on the fly. A single value added to a collection property
    /// replaces it with a one-element collection. Everything else assigns.
    pub fn add(&self, target: &mut Value, value: Value) -> Result<Option<Value>, PatchError> {
        let Some(last) = self.steps.last() else {
            return Ok(Some(std::mem::replace(target, value)));
        };
        let is_set = Self::is_set(last);
        let parent = self.parent_mut(target, true)?;

        if let Some(slot) = self.slot(last) {
            if parent.is_null() && !matches!(last, Step::Dynamic { .. }) {
                *parent = Value::Array(Vec::new());
            }
            if let Value::Array(items) = parent {
                let size = items.len();
                let index = match slot {
                    Slot::At(index) => index,
                    Slot::End => size,
                };
                if index > size {
                    return Err(self.out_of_bounds(index, size));
                }
                if is_set && items.iter().any(|item| deep_equal(item, &value)) {
                    return Ok(None);
                }
                items.insert(index, value);
                return Ok(None);
            }
            if !matches!(last, Step::Dynamic { .. }) {
                return Err(self.no_such_value());
            }
        }

        let Value::Object(map) = parent else {
            return Err(self.no_such_value());
        };
        let wrap = matches!(last, Step::Property { shape, .. } if shape.is_collection());
        let value = if wrap && !value.is_array() {
            Value::Array(vec![value])
        } else {
            value
        };
        Ok(map.insert(self.key(last).to_string(), value))
    }

    fn conform_for_add(&self, value: Value) -> Result<Value, PatchError> {
        let shape = self.insertion_shape(value.is_array());
        conform(value, shape).map_err(|reason| PatchError::EvaluationFailed {
            path: self.path.to_string(),
            shape: shape.name().to_string(),
            reason,
        })
    }

    /// Adds a copy of the value found at `source`. The source is unchanged.
    pub fn copy_from(
        &self,
        source: &TypedPath,
        target: &mut Value,
    ) -> Result<Option<Value>, PatchError> {
        let value = self.conform_for_add(source.get(target)?)?;
        self.add(target, value)
    }

    /// Removes the value at `source` and adds it here. `source` is cleared,
    /// so it should be bound with [`Access::Write`].
    pub fn move_from(
        &self,
        source: &TypedPath,
        target: &mut Value,
    ) -> Result<Option<Value>, PatchError> {
        let value = self.conform_for_add(source.remove(target)?)?;
        self.add(target, value)
    }
}

// ── Binding cache ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    shape: ShapeId,
    path: String,
    access: Access,
    context: ContextId,
}

const DEFAULT_CAPACITY: usize = 4096;

static TYPED_PATHS: LazyLock<DashMap<CacheKey, Arc<TypedPath>>> = LazyLock::new(DashMap::new);
static CAPACITY: AtomicUsize = AtomicUsize::new(DEFAULT_CAPACITY);

/// Binds `path` against `root`, reusing an earlier binding for the same
/// shape, pointer, access side and binder.
///
/// Failed bindings are not cached.
pub fn bind(
    path: &Arc<Path>,
    root: &ShapeRef,
    access: Access,
    binder: &Binder,
) -> Result<Arc<TypedPath>, PatchError> {
    let key = CacheKey {
        shape: root.id(),
        path: path.as_str().to_string(),
        access,
        context: binder.id(),
    };
    if let Some(hit) = TYPED_PATHS.get(&key) {
        return Ok(Arc::clone(hit.value()));
    }

    debug!(path = %path, shape = %root, ?access, "binding path");
    let typed = Arc::new(TypedPath::resolve(Arc::clone(path), root, access, binder)?);
    if TYPED_PATHS.len() >= CAPACITY.load(Ordering::Relaxed) {
        debug!(entries = TYPED_PATHS.len(), "binding cache full, clearing");
        TYPED_PATHS.clear();
    }
    TYPED_PATHS.insert(key, Arc::clone(&typed));
    Ok(typed)
}

pub fn clear_binding_cache() {
    TYPED_PATHS.clear();
}

pub fn binding_cache_len() -> usize {
    TYPED_PATHS.len()
}

pub fn binding_cache_capacity() -> usize {
    CAPACITY.load(Ordering::Relaxed)
}

/// Sets the number of entries at which the cache is cleared. Minimum 1.
pub fn set_binding_cache_capacity(capacity: usize) {
    CAPACITY.store(capacity.max(1), Ordering::Relaxed);
}
