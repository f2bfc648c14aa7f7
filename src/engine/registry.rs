//! Component Registry - Instance arena, identity and live-instance index.
//!
//! Manages the lifecycle of component instances:
//! - Arena slot per instance, addressed by [`ComponentId`]
//! - Constructor argument snapshot for exact re-construction ([`clone_component`])
//! - Random identity sized to the number of live instances
//! - Parent/slot/position back-references for tree navigation
//!
//! Instances are never removed from the arena. The live-instance index only
//! grows; it exists to size identities, not to track lifetimes.

use std::cell::{OnceCell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use indexmap::IndexMap;
use slab::Slab;

use super::children::ChildInstance;
use super::class::{class_count, ComponentClass};
use crate::error::{Result, WebError};
use crate::host::NodeId;
use crate::types::{ComponentId, RendererId, Value};
use crate::utils::{log10_ceil, random_name};

// =============================================================================
// Constructor Arguments
// =============================================================================

/// Constructor arguments: positional values and field keywords.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    pub positional: Vec<Value>,
    pub keywords: IndexMap<String, Value>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arguments with a single positional text value.
    pub fn with_text(text: impl Into<Value>) -> Self {
        Self::new().arg(text)
    }

    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    pub fn kw(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keywords.insert(name.into(), value.into());
        self
    }

    /// First positional argument, used as static content.
    pub fn text(&self) -> Option<&Value> {
        self.positional.first()
    }
}

// =============================================================================
// Instance State
// =============================================================================

pub(crate) struct ComponentState {
    pub(crate) class: Rc<ComponentClass>,
    pub(crate) identity: String,
    pub(crate) args: OnceCell<Args>,
    /// Per-instance field values. A missing entry means "default, not yet read".
    pub(crate) values: IndexMap<String, Value>,
    /// Private copies of the class's template children, by slot.
    pub(crate) children: HashMap<String, ChildInstance>,
    pub(crate) parent: Option<ComponentId>,
    pub(crate) slot: Option<String>,
    pub(crate) position: Option<usize>,
    /// Renderers that read a field (or child slot) of this instance, by key.
    pub(crate) dependents: HashMap<String, Vec<RendererId>>,
    pub(crate) shadow_root: Option<NodeId>,
    pub(crate) element: Option<NodeId>,
    pub(crate) mount_parent: Option<NodeId>,
    pub(crate) renderers: Vec<RendererId>,
}

thread_local! {
    static COMPONENTS: RefCell<Slab<ComponentState>> = RefCell::new(Slab::new());

    /// Every instance ever created, by class name.
    static LIVE_INSTANCES: RefCell<IndexMap<String, Vec<ComponentId>>> = RefCell::new(IndexMap::new());
}

/// Borrow an instance. `f` must not call back into the registry.
pub(crate) fn with_component<R>(id: ComponentId, f: impl FnOnce(&ComponentState) -> R) -> Result<R> {
    COMPONENTS.with(|components| {
        components
            .borrow()
            .get(id.0)
            .map(f)
            .ok_or(WebError::UnknownComponent(id))
    })
}

/// Mutably borrow an instance. `f` must not call back into the registry.
pub(crate) fn with_component_mut<R>(
    id: ComponentId,
    f: impl FnOnce(&mut ComponentState) -> R,
) -> Result<R> {
    COMPONENTS.with(|components| {
        components
            .borrow_mut()
            .get_mut(id.0)
            .map(f)
            .ok_or(WebError::UnknownComponent(id))
    })
}

// =============================================================================
// Construction
// =============================================================================

/// Create an instance of `class`.
///
/// Keyword arguments and subclass default overrides are validated, stored and
/// passed to the class notify hook in field declaration order. Plain field
/// defaults stay lazy and are cached on first read. Fails with
/// [`WebError::MissingRequired`] before anything is registered if a required
/// field gets no value.
pub fn create(class: &Rc<ComponentClass>, args: Args) -> Result<ComponentId> {
    if let Some(name) = args.keywords.keys().find(|k| class.field(k).is_none()) {
        return Err(WebError::UnknownField {
            class: class.name().to_string(),
            field: name.clone(),
        });
    }

    let mut values = IndexMap::new();
    for (name, field) in class.fields() {
        let explicit = args
            .keywords
            .get(name)
            .or_else(|| class.default_override(name))
            .cloned();
        match explicit {
            Some(value) => {
                values.insert(name.clone(), field.validate(value)?);
            }
            None if field.is_required() && !class.has_default(name) => {
                return Err(WebError::MissingRequired {
                    class: class.name().to_string(),
                    field: name.clone(),
                });
            }
            None => {}
        }
    }

    let live = LIVE_INSTANCES.with(|live| live.borrow().get(class.name()).map_or(0, Vec::len));
    let identity = random_name(log10_ceil((live + 1) * class_count().max(1)));

    let state = ComponentState {
        class: class.clone(),
        identity,
        args: OnceCell::new(),
        values,
        children: HashMap::new(),
        parent: None,
        slot: None,
        position: None,
        dependents: HashMap::new(),
        shadow_root: None,
        element: None,
        mount_parent: None,
        renderers: Vec::new(),
    };
    let _ = state.args.set(args);

    let id = ComponentId(COMPONENTS.with(|components| components.borrow_mut().insert(state)));
    LIVE_INSTANCES.with(|live| {
        live.borrow_mut()
            .entry(class.name().to_string())
            .or_default()
            .push(id);
    });

    log::debug!("[registry] created {} {:?}", class.name(), id);

    if let Some(notify) = &class.hooks().notify {
        let stored = with_component(id, |c| c.values.clone())?;
        for (name, value) in &stored {
            notify(id, name, value);
        }
    }
    Ok(id)
}

/// Re-construct `id` from its captured constructor arguments.
///
/// The copy has a fresh identity and fresh field values, no parent and no
/// children of its own yet.
pub fn clone_component(id: ComponentId) -> Result<ComponentId> {
    let (class, args) = with_component(id, |c| (c.class.clone(), c.args.get().cloned().unwrap_or_default()))?;
    create(&class, args)
}

// =============================================================================
// Accessors
// =============================================================================

pub fn exists(id: ComponentId) -> bool {
    COMPONENTS.with(|components| components.borrow().contains(id.0))
}

pub fn class_of(id: ComponentId) -> Result<Rc<ComponentClass>> {
    with_component(id, |c| c.class.clone())
}

/// Randomly generated identity of an instance.
pub fn identity(id: ComponentId) -> Result<String> {
    with_component(id, |c| c.identity.clone())
}

/// Constructor arguments captured at creation.
pub fn args(id: ComponentId) -> Result<Args> {
    with_component(id, |c| c.args.get().cloned().unwrap_or_default())
}

pub fn parent(id: ComponentId) -> Option<ComponentId> {
    with_component(id, |c| c.parent).ok().flatten()
}

/// Index of `id` within its owner's list slot.
pub fn position(id: ComponentId) -> Option<usize> {
    with_component(id, |c| c.position).ok().flatten()
}

/// Child slot of its owner that `id` fills.
pub fn slot_of(id: ComponentId) -> Option<String> {
    with_component(id, |c| c.slot.clone()).ok().flatten()
}

/// Host element created for `id` by the last mount.
pub fn element(id: ComponentId) -> Option<NodeId> {
    with_component(id, |c| c.element).ok().flatten()
}

pub fn is_mounted(id: ComponentId) -> bool {
    element(id).is_some()
}

/// Instances ever created for `class_name`, in creation order.
pub fn live_instances(class_name: &str) -> Vec<ComponentId> {
    LIVE_INSTANCES.with(|live| live.borrow().get(class_name).cloned().unwrap_or_default())
}

pub fn component_count() -> usize {
    COMPONENTS.with(|components| components.borrow().len())
}

pub(crate) fn set_parent(
    id: ComponentId,
    parent: Option<ComponentId>,
    slot: Option<&str>,
    position: Option<usize>,
) -> Result<()> {
    with_component_mut(id, |c| {
        c.parent = parent;
        c.slot = slot.map(str::to_string);
        c.position = position;
    })
}

pub(crate) fn set_position(id: ComponentId, position: Option<usize>) -> Result<()> {
    with_component_mut(id, |c| c.position = position)
}

/// Run the `set_ref` hook of `child`'s class.
pub(crate) fn run_set_ref(child: ComponentId, owner: Option<ComponentId>, slot: &str) -> Result<()> {
    let hook = with_component(child, |c| c.class.hooks().set_ref.clone())?;
    match hook {
        Some(hook) => hook(child, owner, slot),
        None => Ok(()),
    }
}

impl ComponentId {
    pub fn class(self) -> Result<Rc<ComponentClass>> {
        class_of(self)
    }

    pub fn identity(self) -> Result<String> {
        identity(self)
    }

    pub fn parent(self) -> Option<ComponentId> {
        parent(self)
    }

    pub fn position(self) -> Option<usize> {
        position(self)
    }
}

/// Clear the arena and the live-instance index (for testing).
pub fn reset_registry() {
    COMPONENTS.with(|components| components.borrow_mut().clear());
    LIVE_INSTANCES.with(|live| live.borrow_mut().clear());
}

// =============================================================================
// Tests
// =============================================================================
