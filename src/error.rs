//! Error type shared by every runtime operation.
//!
//! Configuration errors are fatal and surface at the point of detection.
//! Validation errors reject a write before it is stored, so the previous
//! value stays intact.

use crate::types::{ComponentId, RendererId, Value, ValueType};

#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error("field `{field}` of `{class}` is required")]
    MissingRequired { class: String, field: String },

    #[error("`{class}` has no field `{field}`")]
    UnknownField { class: String, field: String },

    #[error("value {value:?} is not allowed for field `{field}` (expected one of: {allowed})")]
    NotInDomain {
        field: String,
        value: Value,
        allowed: String,
    },

    #[error("cannot coerce {value:?} to {target} for field `{field}`")]
    Coercion {
        field: String,
        value: Value,
        target: ValueType,
    },

    #[error("content of `{component}` is not renderable: {reason}")]
    NotRenderable { component: String, reason: String },

    #[error("component class `{0}` is already registered")]
    DuplicateClass(String),

    #[error("`{class}` has no child slot `{slot}`")]
    UnknownSlot { class: String, slot: String },

    #[error("child slot `{slot}` holds {actual}, not {expected}")]
    SlotKind {
        slot: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("unknown component {0:?}")]
    UnknownComponent(ComponentId),

    #[error("unknown renderer {0:?}")]
    UnknownRenderer(RendererId),

    #[error("invalid runtime configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl WebError {
    /// True for domain/validation errors (the write was rejected, nothing changed).
    pub fn is_validation(&self) -> bool {
        matches!(self, WebError::NotInDomain { .. } | WebError::Coercion { .. })
    }
}

pub type Result<T> = std::result::Result<T, WebError>;
