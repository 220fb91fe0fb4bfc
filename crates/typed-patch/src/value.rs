//! Operation values and their conversion into a destination shape.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Number, Value};
use typed_patch_pointer::Path;
use typed_patch_util::{deep_equal, NormalizedNumber};

use crate::error::PatchError;
use crate::shape::{CollectionKind, ScalarKind, Shape, ShapeKind};

/// A value whose final form depends on where it lands.
///
/// Materialized at most once per application, after the destination shape
/// has been resolved.
pub trait LateValue: Send + Sync + fmt::Debug {
    fn materialize(&self, shape: &Shape) -> Result<Value, String>;

    /// The representation the value was read from.
    fn raw(&self) -> &Value;
}

/// Late value backed by a JSON tree, converted with [`conform`].
#[derive(Debug, Clone, PartialEq)]
pub struct JsonLateValue {
    raw: Value,
}

impl JsonLateValue {
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }
}

impl LateValue for JsonLateValue {
    fn materialize(&self, shape: &Shape) -> Result<Value, String> {
        conform(self.raw.clone(), shape)
    }

    fn raw(&self) -> &Value {
        &self.raw
    }
}

#[derive(Debug, Clone)]
pub enum OpValue {
    Concrete(Value),
    Late(Arc<dyn LateValue>),
}

impl OpValue {
    pub fn late(raw: Value) -> Self {
        OpValue::Late(Arc::new(JsonLateValue::new(raw)))
    }

    pub fn raw(&self) -> &Value {
        match self {
            OpValue::Concrete(value) => value,
            OpValue::Late(late) => late.raw(),
        }
    }

    /// Produces the value to store at `path`, shaped as `shape`.
    pub fn evaluate(&self, shape: &Shape, path: &Path) -> Result<Value, PatchError> {
        let result = match self {
            OpValue::Concrete(value) => conform(value.clone(), shape),
            OpValue::Late(late) => late.materialize(shape),
        };
        result.map_err(|reason| PatchError::EvaluationFailed {
            path: path.to_string(),
            shape: shape.name().to_string(),
            reason,
        })
    }
}

impl From<Value> for OpValue {
    fn from(value: Value) -> Self {
        OpValue::Concrete(value)
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn mismatch(value: &Value, shape: &Shape) -> String {
    format!("expected {}, found {}", shape.name(), describe(value))
}

/// Converts `value` into the form `shape` declares.
///
/// Scalars are coerced where the conversion is lossless (`true` into
/// `"true"`, `"42"` into `42`). Records drop nothing silently: unknown
/// fields are rejected and absent optional fields become `null`.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use typed_patch::{conform, Shape};
///
/// assert_eq!(conform(json!(true), &Shape::string()), Ok(json!("true")));
/// assert_eq!(conform(json!("7"), &Shape::integer()), Ok(json!(7)));
/// assert!(conform(json!(null), &Shape::integer()).is_err());
/// ```
pub fn conform(value: Value, shape: &Shape) -> Result<Value, String> {
    if value.is_null() {
        return if shape.is_nullable() {
            Ok(Value::Null)
        } else {
            Err(mismatch(&value, shape))
        };
    }
    match shape.kind() {
        ShapeKind::Optional(inner) => conform(value, inner),
        ShapeKind::Scalar(kind) => conform_scalar(value, *kind, shape),
        ShapeKind::Collection { kind, element } => {
            let Value::Array(items) = value else {
                return Err(mismatch(&value, shape));
            };
            let mut out: Vec<Value> = Vec::with_capacity(items.len());
            for item in items {
                let item = conform(item, element)?;
                if *kind == CollectionKind::Set && out.iter().any(|seen| deep_equal(seen, &item)) {
                    continue;
                }
                out.push(item);
            }
            Ok(Value::Array(out))
        }
        ShapeKind::Map { value: entry } => {
            let Value::Object(map) = value else {
                return Err(mismatch(&value, shape));
            };
            map.into_iter()
                .map(|(key, item)| conform(item, entry).map(|item| (key, item)))
                .collect::<Result<Map<_, _>, _>>()
                .map(Value::Object)
        }
        ShapeKind::Record(fields) => {
            let Value::Object(mut map) = value else {
                return Err(mismatch(&value, shape));
            };
            if let Some(unknown) = map.keys().find(|key| !fields.contains_key(*key)) {
                return Err(format!("unknown field '{unknown}' for {}", shape.name()));
            }
            let mut out = Map::new();
            for (name, field) in fields {
                let item = match map.remove(name) {
                    Some(item) => conform(item, field)?,
                    None if field.is_nullable() => Value::Null,
                    None => return Err(format!("missing field '{name}' for {}", shape.name())),
                };
                out.insert(name.clone(), item);
            }
            Ok(Value::Object(out))
        }
    }
}

fn conform_scalar(value: Value, kind: ScalarKind, shape: &Shape) -> Result<Value, String> {
    match (kind, value) {
        (ScalarKind::Any, value) => Ok(value),
        (ScalarKind::Bool, Value::Bool(b)) => Ok(Value::Bool(b)),
        (ScalarKind::Bool, Value::String(s)) => match s.as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(format!("'{s}' is not a boolean")),
        },
        (ScalarKind::String, Value::String(s)) => Ok(Value::String(s)),
        (ScalarKind::String, Value::Bool(b)) => Ok(Value::String(b.to_string())),
        (ScalarKind::String, Value::Number(n)) => Ok(Value::String(n.to_string())),
        (ScalarKind::Integer, Value::Number(n)) => to_integer(&NormalizedNumber::from_number(&n)),
        (ScalarKind::Integer, Value::String(s)) => match NormalizedNumber::parse(&s) {
            Some(n) => to_integer(&n),
            None => Err(format!("'{s}' is not an integer")),
        },
        (ScalarKind::Float, Value::Number(n)) => to_float(&NormalizedNumber::from_number(&n)),
        (ScalarKind::Float, Value::String(s)) => match NormalizedNumber::parse(&s) {
            Some(n) => to_float(&n),
            None => Err(format!("'{s}' is not a number")),
        },
        (_, value) => Err(mismatch(&value, shape)),
    }
}

fn to_integer(n: &NormalizedNumber) -> Result<Value, String> {
    if !n.is_integer() {
        return Err(format!("{n} is not an integer"));
    }
    n.to_i64()
        .map(Number::from)
        .or_else(|| n.to_u64().map(Number::from))
        .map(Value::Number)
        .ok_or_else(|| format!("{n} is out of range"))
}

fn to_float(n: &NormalizedNumber) -> Result<Value, String> {
    n.to_f64()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| format!("{n} is out of range"))
}
