//! Resolution of pointer segments to property names.
//!
//! The engine never inspects a record's fields by itself when binding a
//! named segment: it asks a [`BindContext`]. Callers backed by a schema
//! registry, generated code or naming conventions plug in here.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock};

use crate::shape::Shape;

/// Maps a raw segment to the property it denotes on a record shape.
///
/// Results are cached per segment and shape, so implementations must be
/// deterministic.
pub trait BindContext: Send + Sync {
    fn readable_property(&self, segment: &str, shape: &Shape) -> Option<String>;

    fn writable_property(&self, segment: &str, shape: &Shape) -> Option<String>;
}

/// Which side of a property a binding needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    Read,
    Write,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::Read => f.write_str("readable"),
            Access::Write => f.write_str("writable"),
        }
    }
}

/// Segments name fields verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactBindContext;

impl BindContext for ExactBindContext {
    fn readable_property(&self, segment: &str, shape: &Shape) -> Option<String> {
        shape.field(segment).map(|_| segment.to_string())
    }

    fn writable_property(&self, segment: &str, shape: &Shape) -> Option<String> {
        self.readable_property(segment, shape)
    }
}

/// A context built from two closures.
pub struct FnBindContext<R, W> {
    read: R,
    write: W,
}

impl<R, W> FnBindContext<R, W>
where
    R: Fn(&str, &Shape) -> Option<String> + Send + Sync,
    W: Fn(&str, &Shape) -> Option<String> + Send + Sync,
{
    pub fn new(read: R, write: W) -> Self {
        Self { read, write }
    }
}

impl<R, W> BindContext for FnBindContext<R, W>
where
    R: Fn(&str, &Shape) -> Option<String> + Send + Sync,
    W: Fn(&str, &Shape) -> Option<String> + Send + Sync,
{
    fn readable_property(&self, segment: &str, shape: &Shape) -> Option<String> {
        (self.read)(segment, shape)
    }

    fn writable_property(&self, segment: &str, shape: &Shape) -> Option<String> {
        (self.write)(segment, shape)
    }
}

/// Per-record renames and visibility rules on top of exact field names.
///
/// A renamed field is only reachable through its external name.
///
/// # Example
///
/// ```
/// use typed_patch::{BindContext, MappedBindContext, Shape};
///
/// let todo = Shape::record("Todo")
///     .field("description", Shape::string())
///     .field("id", Shape::integer())
///     .build();
/// let context = MappedBindContext::new()
///     .rename("Todo", "title", "description")
///     .read_only("Todo", "id");
///
/// assert_eq!(context.readable_property("title", &todo).as_deref(), Some("description"));
/// assert_eq!(context.readable_property("description", &todo), None);
/// assert_eq!(context.readable_property("id", &todo).as_deref(), Some("id"));
/// assert_eq!(context.writable_property("id", &todo), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MappedBindContext {
    // (record name, external name) -> field
    renames: HashMap<(String, String), String>,
    renamed: HashSet<(String, String)>,
    read_only: HashSet<(String, String)>,
    hidden: HashSet<(String, String)>,
}

impl MappedBindContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rename(
        mut self,
        record: impl Into<String>,
        external: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        let record = record.into();
        let field = field.into();
        self.renamed.insert((record.clone(), field.clone()));
        self.renames.insert((record, external.into()), field);
        self
    }

    pub fn read_only(mut self, record: impl Into<String>, field: impl Into<String>) -> Self {
        self.read_only.insert((record.into(), field.into()));
        self
    }

    pub fn hidden(mut self, record: impl Into<String>, field: impl Into<String>) -> Self {
        self.hidden.insert((record.into(), field.into()));
        self
    }

    fn resolve(&self, segment: &str, shape: &Shape) -> Option<String> {
        let record = shape.name().to_string();
        let field = match self.renames.get(&(record.clone(), segment.to_string())) {
            Some(field) => field.clone(),
            None if self.renamed.contains(&(record.clone(), segment.to_string())) => return None,
            None => segment.to_string(),
        };
        if self.hidden.contains(&(record, field.clone())) || shape.field(&field).is_none() {
            return None;
        }
        Some(field)
    }
}

impl BindContext for MappedBindContext {
    fn readable_property(&self, segment: &str, shape: &Shape) -> Option<String> {
        self.resolve(segment, shape)
    }

    fn writable_property(&self, segment: &str, shape: &Shape) -> Option<String> {
        self.resolve(segment, shape)
            .filter(|field| !self.read_only.contains(&(shape.name().to_string(), field.clone())))
    }
}

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a [`Binder`], part of every binding cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(u64);

/// A bind context together with its identity.
///
/// Clones share the identity and therefore the cached bindings. Two binders
/// created from equal contexts do not.
#[derive(Clone)]
pub struct Binder {
    id: ContextId,
    context: Arc<dyn BindContext>,
}

static EXACT: LazyLock<Binder> = LazyLock::new(|| Binder::new(ExactBindContext));

impl Binder {
    pub fn new(context: impl BindContext + 'static) -> Self {
        Self::from_arc(Arc::new(context))
    }

    pub fn from_arc(context: Arc<dyn BindContext>) -> Self {
        Self {
            id: ContextId(NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed)),
            context,
        }
    }

    /// The process-wide binder resolving segments to identically named fields.
    pub fn exact() -> Self {
        EXACT.clone()
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn context(&self) -> &dyn BindContext {
        self.context.as_ref()
    }

    pub fn resolve(&self, segment: &str, shape: &Shape, access: Access) -> Option<String> {
        match access {
            Access::Read => self.context.readable_property(segment, shape),
            Access::Write => self.context.writable_property(segment, shape),
        }
    }
}

impl Default for Binder {
    fn default() -> Self {
        Self::exact()
    }
}

impl fmt::Debug for Binder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binder").field("id", &self.id).finish_non_exhaustive()
    }
}
