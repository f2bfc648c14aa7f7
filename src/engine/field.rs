//! Reactive Fields - Declarations and the get/set descriptor.
//!
//! Two field kinds exist:
//! - [`state()`]: internal reactive state
//! - [`attr()`]: an observable attribute, reflected onto the host element
//!
//! Both are render-tracked by default: a [`get`] while a renderer is on top
//! of the render stack registers that renderer as a dependent of the field,
//! and a [`set`] that changes the value re-renders those dependents.
//!
//! # Example
//!
//! ```ignore
//! let counter = ComponentClass::builder("Counter")
//!     .field("count", state().with_default(0))
//!     .field("size", attr().one_of(["s", "m", "l"]).with_default("m"))
//!     .build()?;
//!
//! let id = counter.instantiate()?;
//! id.set("count", id.get_int("count")? + 1)?;
//! ```

use indexmap::IndexMap;

use super::registry::{with_component, with_component_mut};
use crate::error::{Result, WebError};
use crate::host::with_host;
use crate::pipeline::{rerender_dependents, track_read};
use crate::types::{ComponentId, FieldFlags, Value, ValueType};
use crate::utils::to_kebab_case;

// =============================================================================
// Field Declaration
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    State,
    Attr,
}

/// A reactive field declaration. The name is assigned when the class is built.
#[derive(Debug, Clone)]
pub struct Field {
    pub(crate) name: String,
    kind: FieldKind,
    default: Option<Value>,
    flags: FieldFlags,
    domain: Option<Vec<Value>>,
    coerce: Option<ValueType>,
    model: Option<String>,
}

/// Declare internal reactive state.
pub fn state() -> Field {
    Field::new(FieldKind::State, FieldFlags::TRACKED)
}

/// Declare an observable attribute.
pub fn attr() -> Field {
    Field::new(FieldKind::Attr, FieldFlags::TRACKED | FieldFlags::OBSERVABLE)
}

impl Field {
    fn new(kind: FieldKind, flags: FieldFlags) -> Self {
        Self {
            name: String::new(),
            kind,
            default: None,
            flags,
            domain: None,
            coerce: None,
            model: None,
        }
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Must receive a value at construction unless a default exists.
    pub fn required(mut self) -> Self {
        self.flags |= FieldFlags::REQUIRED;
        self
    }

    /// Restrict values to an enumerated domain.
    pub fn one_of<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.domain = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Coerce every written value into `target`.
    pub fn coerce(mut self, target: ValueType) -> Self {
        self.coerce = Some(target);
        self
    }

    /// Expose (or hide) the field to the host as an attribute.
    pub fn visible(mut self, visible: bool) -> Self {
        self.flags.set(FieldFlags::OBSERVABLE, visible);
        self
    }

    /// Reads never register dependents; writes never re-render.
    pub fn untracked(mut self) -> Self {
        self.flags.remove(FieldFlags::TRACKED);
        self
    }

    /// Two-way binding: `event` carrying a value writes it into this field.
    pub fn model(mut self, event: impl Into<String>) -> Self {
        self.model = Some(event.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn flags(&self) -> FieldFlags {
        self.flags
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn domain(&self) -> Option<&[Value]> {
        self.domain.as_deref()
    }

    pub fn model_event(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn is_required(&self) -> bool {
        self.flags.contains(FieldFlags::REQUIRED)
    }

    pub fn is_observable(&self) -> bool {
        self.flags.contains(FieldFlags::OBSERVABLE)
    }

    pub fn is_tracked(&self) -> bool {
        self.flags.contains(FieldFlags::TRACKED)
    }

    /// Host attribute name: leading underscores dropped, kebab-cased.
    pub fn attribute_name(&self) -> String {
        to_kebab_case(self.name.trim_start_matches('_'))
    }

    /// Coerce `value`, then check it against the domain.
    pub fn validate(&self, value: Value) -> Result<Value> {
        let value = match self.coerce {
            Some(target) => target.coerce(value.clone()).ok_or_else(|| WebError::Coercion {
                field: self.name.clone(),
                value,
                target,
            })?,
            None => value,
        };
        if let Some(domain) = &self.domain {
            if !domain.contains(&value) {
                let allowed = domain.iter().map(|v| format!("{v:?}")).collect::<Vec<_>>().join(", ");
                return Err(WebError::NotInDomain {
                    field: self.name.clone(),
                    value,
                    allowed,
                });
            }
        }
        Ok(value)
    }
}

// =============================================================================
// Descriptor
// =============================================================================

/// Read a field, caching its default on first access.
///
/// Tracked fields register the active renderer as a dependent. Names that
/// are class constants resolve to the constant, untracked.
pub fn get(id: ComponentId, name: &str) -> Result<Value> {
    let (value, tracked) = with_component_mut(id, |c| {
        let Some(tracked) = c.class.field(name).map(Field::is_tracked) else {
            return c.class.constant(name).cloned().map(|v| (v, false)).ok_or_else(|| {
                WebError::UnknownField {
                    class: c.class.name().to_string(),
                    field: name.to_string(),
                }
            });
        };
        let value = match c.values.get(name) {
            Some(value) => value.clone(),
            None => {
                let value = c.class.default_for(name);
                c.values.insert(name.to_string(), value.clone());
                value
            }
        };
        Ok((value, tracked))
    })??;

    if tracked {
        track_read(id, name);
    }
    Ok(value)
}

/// Current value without caching the default or registering a dependent.
pub fn peek(id: ComponentId, name: &str) -> Result<Value> {
    with_component(id, |c| {
        if c.class.field(name).is_none() {
            return c.class.constant(name).cloned().ok_or_else(|| WebError::UnknownField {
                class: c.class.name().to_string(),
                field: name.to_string(),
            });
        }
        Ok(c.values.get(name).cloned().unwrap_or_else(|| c.class.default_for(name)))
    })?
}

/// Validate and write a field.
///
/// The notify hook sees every accepted write. Only a changed value is
/// reflected to the host and re-renders dependents.
pub fn set(id: ComponentId, name: &str, value: impl Into<Value>) -> Result<()> {
    let (field, class) = with_component(id, |c| (c.class.field(name).cloned(), c.class.clone()))?;
    let field = field.ok_or_else(|| WebError::UnknownField {
        class: class.name().to_string(),
        field: name.to_string(),
    })?;
    let value = field.validate(value.into())?;

    let (changed, element) = with_component_mut(id, |c| {
        let old = c.values.get(name).cloned().unwrap_or_else(|| class.default_for(name));
        let changed = old != value;
        if changed {
            c.values.insert(name.to_string(), value.clone());
        }
        (changed, c.element)
    })?;

    if let Some(notify) = &class.hooks().notify {
        notify(id, name, &value);
    }
    if !changed {
        return Ok(());
    }

    log::debug!("[field] {}.{} = {:?}", class.name(), name, value);
    if field.is_observable() {
        if let Some(element) = element {
            let attribute = attribute_value(&value);
            with_host(|host| host.set_attribute(element, &field.attribute_name(), attribute.as_deref()));
        }
    }
    if field.is_tracked() {
        rerender_dependents(id, name)?;
    }
    Ok(())
}

/// Host attribute text for a value: `None`/`false` remove it, `true` is empty.
pub fn attribute_value(value: &Value) -> Option<String> {
    match value {
        Value::None | Value::Bool(false) => None,
        Value::Bool(true) => Some(String::new()),
        other => Some(other.to_string()),
    }
}

/// Write every observable field of `id` onto its host element.
pub fn reflect_attributes(id: ComponentId) -> Result<()> {
    let Some(element) = with_component(id, |c| c.element)? else {
        return Ok(());
    };
    for (name, value) in attributes(id)? {
        let name = to_kebab_case(name.trim_start_matches('_'));
        let value = attribute_value(&value);
        with_host(|host| host.set_attribute(element, &name, value.as_deref()));
    }
    Ok(())
}

fn snapshot(id: ComponentId, observable: bool) -> Result<IndexMap<String, Value>> {
    with_component(id, |c| {
        c.class
            .fields()
            .filter(|(_, f)| f.is_observable() == observable)
            .map(|(name, _)| {
                let value = c.values.get(name).cloned().unwrap_or_else(|| c.class.default_for(name));
                (name.clone(), value)
            })
            .collect()
    })
}

/// Current values of the observable attributes (untracked).
pub fn attributes(id: ComponentId) -> Result<IndexMap<String, Value>> {
    snapshot(id, true)
}

/// Current values of the internal state fields (untracked).
pub fn states(id: ComponentId) -> Result<IndexMap<String, Value>> {
    snapshot(id, false)
}

impl ComponentId {
    pub fn get(self, name: &str) -> Result<Value> {
        get(self, name)
    }

    pub fn set(self, name: &str, value: impl Into<Value>) -> Result<()> {
        set(self, name, value)
    }

    pub fn peek(self, name: &str) -> Result<Value> {
        peek(self, name)
    }

    /// Tracked read as an integer (`0` when unset or not an integer).
    pub fn get_int(self, name: &str) -> Result<i64> {
        Ok(get(self, name)?.as_int().unwrap_or_default())
    }

    pub fn get_str(self, name: &str) -> Result<String> {
        Ok(get(self, name)?.to_string())
    }

    pub fn get_bool(self, name: &str) -> Result<bool> {
        Ok(get(self, name)?.truthy())
    }
}

// =============================================================================
// Tests
// =============================================================================
