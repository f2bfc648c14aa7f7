//! Core types for spark-web.
//!
//! These types define the foundation that everything builds on.
//! Field values, field flags and the handles that name components and
//! renderers all flow through the registry, the render engine and the
//! mount layer.

use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// Handles
// =============================================================================

/// Handle to a component instance in the component arena.
///
/// Handles are plain indices: copying one never extends the lifetime of the
/// component, so parent back-references and dependent lists can store them
/// freely without creating ownership cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub(crate) usize);

impl ComponentId {
    /// Raw arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Handle to a renderer (content wrapper) in the renderer arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RendererId(pub(crate) usize);

impl RendererId {
    /// Raw arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

// =============================================================================
// Value
// =============================================================================

/// Dynamically typed value stored in a reactive field.
///
/// Equality is structural: writing an equal value to a field is a no-op.
/// Serializes as the bare JSON value (`null`, `true`, `3`, `2.5`, `"hi"`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Truthiness used by templates: `None`, `false`, `0`, `0.0` and `""` are falsy.
    pub fn truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
        }
    }

    /// The [`ValueType`] of this value, `None` for [`Value::None`].
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            Value::None => None,
            Value::Bool(_) => Some(ValueType::Bool),
            Value::Int(_) => Some(ValueType::Int),
            Value::Float(_) => Some(ValueType::Float),
            Value::Str(_) => Some(ValueType::Str),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::None)
    }
}

// =============================================================================
// Value Type (coercion target)
// =============================================================================

/// Target type a field coerces written values into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Bool,
    Int,
    Float,
    Str,
}

impl ValueType {
    /// Convert `value` into this type.
    ///
    /// `Value::None` passes through untouched. Returns `None` when the value
    /// has no sensible representation in the target type.
    pub fn coerce(self, value: Value) -> Option<Value> {
        if value.is_none() || value.value_type() == Some(self) {
            return Some(value);
        }
        match (self, value) {
            (ValueType::Str, v) => Some(Value::Str(v.to_string())),
            (ValueType::Int, Value::Bool(b)) => Some(Value::Int(b as i64)),
            (ValueType::Int, Value::Float(f)) if f.fract() == 0.0 => Some(Value::Int(f as i64)),
            (ValueType::Int, Value::Str(s)) => s.trim().parse().ok().map(Value::Int),
            (ValueType::Float, Value::Int(i)) => Some(Value::Float(i as f64)),
            (ValueType::Float, Value::Str(s)) => s.trim().parse().ok().map(Value::Float),
            (ValueType::Bool, Value::Int(i)) => Some(Value::Bool(i != 0)),
            (ValueType::Bool, Value::Str(s)) => match s.trim() {
                "true" | "1" | "" => Some(Value::Bool(true)),
                "false" | "0" => Some(Value::Bool(false)),
                _ => None,
            },
            _ => None,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Str => "str",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Field Flags (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Per-field behaviour flags.
    ///
    /// Combine with bitwise OR: `FieldFlags::TRACKED | FieldFlags::OBSERVABLE`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FieldFlags: u8 {
        const NONE = 0;
        /// Must receive a value at construction.
        const REQUIRED = 1 << 0;
        /// Reflected to the host element as an attribute.
        const OBSERVABLE = 1 << 1;
        /// Reads register the active renderer; writes re-render dependents.
        const TRACKED = 1 << 2;
    }
}

// =============================================================================
// Tests
// =============================================================================
