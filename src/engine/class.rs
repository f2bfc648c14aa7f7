//! Component Classes - Field registry and inheritance.
//!
//! A class is declared once with a [`ClassBuilder`] and produces an immutable
//! [`ComponentClass`]. Building walks the parent class's tables and the
//! members declared in the builder, in order:
//!
//! - a [`Field`] declares (or replaces) a field. A field of a different kind
//!   than the inherited one wins outright.
//! - a plain value assigned to an inherited field becomes that field's new
//!   default. The name still resolves to a field.
//! - a plain value assigned to any other name is a class constant.
//! - a child template declares a child slot.
//!
//! # Example
//!
//! ```ignore
//! let button = ComponentClass::builder("Button")
//!     .tag("button")
//!     .field("kind", attr().with_default("button").one_of(["submit", "reset", "button"]))
//!     .build()?;
//!
//! let submit = ComponentClass::builder("SubmitButton")
//!     .extends(&button)
//!     .value("kind", "submit") // still a field, new default
//!     .build()?;
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use super::children::ChildTemplate;
use super::field::Field;
use super::registry::{self, Args};
use crate::error::{Result, WebError};
use crate::pipeline::Render;
use crate::state::{EventHandler, HostEvent};
use crate::types::{ComponentId, Value};
use crate::utils::to_kebab_case;

// =============================================================================
// Hook Types
// =============================================================================

/// Content-producing function of a component.
pub type ContentFn = Rc<dyn Fn(ComponentId) -> Result<Render>>;

/// Called after every stored field write with `(component, field, new value)`.
pub type NotifyHook = Rc<dyn Fn(ComponentId, &str, &Value)>;

/// `pre_mount` / `mount` hook.
pub type LifecycleHook = Rc<dyn Fn(ComponentId) -> Result<()>>;

/// Called with `(child, owner, slot)` when a template child is bound.
pub type SetRefHook = Rc<dyn Fn(ComponentId, Option<ComponentId>, &str) -> Result<()>>;

/// Lifecycle hooks, inherited from the parent class unless overridden.
#[derive(Clone, Default)]
pub struct Hooks {
    pub notify: Option<NotifyHook>,
    pub pre_mount: Option<LifecycleHook>,
    pub mount: Option<LifecycleHook>,
    pub set_ref: Option<SetRefHook>,
}

impl Hooks {
    fn inherit(self, parent: &Hooks) -> Self {
        Self {
            notify: self.notify.or_else(|| parent.notify.clone()),
            pre_mount: self.pre_mount.or_else(|| parent.pre_mount.clone()),
            mount: self.mount.or_else(|| parent.mount.clone()),
            set_ref: self.set_ref.or_else(|| parent.set_ref.clone()),
        }
    }
}

#[derive(Clone)]
pub(crate) struct HandlerDecl {
    slot: Option<String>,
    event: String,
    handler: EventHandler,
}

// =============================================================================
// Component Class
// =============================================================================

/// Immutable per-type descriptor.
pub struct ComponentClass {
    name: String,
    tag: Option<String>,
    content_tag: Option<String>,
    root: bool,
    raw_html: bool,
    parent: Option<Rc<ComponentClass>>,
    fields: IndexMap<String, Field>,
    defaults: IndexMap<String, Value>,
    constants: IndexMap<String, Value>,
    slots: IndexMap<String, ChildTemplate>,
    content: Option<ContentFn>,
    hooks: Hooks,
    handlers: Vec<HandlerDecl>,
}

impl ComponentClass {
    pub fn builder(name: impl Into<String>) -> ClassBuilder {
        ClassBuilder::new(name.into())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Host tag of the component's element. `None` only for root classes.
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Tag of the element wrapping the component's content, if any.
    pub fn content_tag(&self) -> Option<&str> {
        self.content_tag.as_deref()
    }

    pub fn is_root(&self) -> bool {
        self.root
    }

    /// Fragment output may replace foreign content without a warning.
    pub fn raw_html(&self) -> bool {
        self.raw_html
    }

    pub fn parent(&self) -> Option<&Rc<ComponentClass>> {
        self.parent.as_ref()
    }

    /// Whether `self` is `other` or inherits from it.
    pub fn is_subclass_of(&self, other: &ComponentClass) -> bool {
        let mut current = Some(self);
        while let Some(class) = current {
            if std::ptr::eq(class, other) {
                return true;
            }
            current = class.parent.as_deref();
        }
        false
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Fields in declaration order, inherited ones first.
    pub fn fields(&self) -> impl Iterator<Item = (&String, &Field)> {
        self.fields.iter()
    }

    /// Default redefined by a subclass with a plain value, if any.
    pub fn default_override(&self, name: &str) -> Option<&Value> {
        self.defaults.get(name)
    }

    /// Effective default of `name`: subclass override, else the field default.
    pub fn default_for(&self, name: &str) -> Value {
        self.defaults
            .get(name)
            .or_else(|| self.fields.get(name).and_then(|f| f.default_value()))
            .cloned()
            .unwrap_or_default()
    }

    /// Whether `name` has any default (override or field default).
    pub fn has_default(&self, name: &str) -> bool {
        self.defaults.contains_key(name)
            || self.fields.get(name).is_some_and(|f| f.default_value().is_some())
    }

    pub fn constant(&self, name: &str) -> Option<&Value> {
        self.constants.get(name)
    }

    pub fn slot(&self, name: &str) -> Option<&ChildTemplate> {
        self.slots.get(name)
    }

    /// Child slot names in declaration order.
    pub fn slot_names(&self) -> impl Iterator<Item = &String> {
        self.slots.keys()
    }

    pub fn content(&self) -> Option<ContentFn> {
        self.content.clone()
    }

    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    /// Host attribute names of all observable fields.
    pub fn observed_attributes(&self) -> Vec<String> {
        self.fields
            .values()
            .filter(|f| f.is_observable())
            .map(|f| f.attribute_name())
            .collect()
    }

    /// Handlers for `event`: own handlers (`slot == None`) or the ones
    /// declared for a child slot.
    pub(crate) fn handlers_for(&self, slot: Option<&str>, event: &str) -> Vec<EventHandler> {
        self.handlers
            .iter()
            .filter(|h| h.slot.as_deref() == slot && h.event == event)
            .map(|h| h.handler.clone())
            .collect()
    }

    /// Create an instance (see [`registry::create`]).
    pub fn create(self: &Rc<Self>, args: Args) -> Result<ComponentId> {
        registry::create(self, args)
    }

    /// Create an instance with no constructor arguments.
    pub fn instantiate(self: &Rc<Self>) -> Result<ComponentId> {
        registry::create(self, Args::default())
    }
}

impl fmt::Debug for ComponentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentClass")
            .field("name", &self.name)
            .field("tag", &self.tag)
            .field("content_tag", &self.content_tag)
            .field("root", &self.root)
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .field("slots", &self.slots.keys().collect::<Vec<_>>())
            .finish()
    }
}

// =============================================================================
// Class Builder
// =============================================================================

enum Member {
    Field(Field),
    Value(Value),
    Child(ChildTemplate),
}

/// Declares a class body. See the module docs for the resolution rules.
pub struct ClassBuilder {
    name: String,
    tag: Option<String>,
    content_tag: Option<String>,
    root: bool,
    raw_html: bool,
    parent: Option<Rc<ComponentClass>>,
    members: Vec<(String, Member)>,
    content: Option<ContentFn>,
    hooks: Hooks,
    handlers: Vec<HandlerDecl>,
}

impl ClassBuilder {
    fn new(name: String) -> Self {
        Self {
            name,
            tag: None,
            content_tag: None,
            root: false,
            raw_html: false,
            parent: None,
            members: Vec::new(),
            content: None,
            hooks: Hooks::default(),
            handlers: Vec::new(),
        }
    }

    pub fn extends(mut self, parent: &Rc<ComponentClass>) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    /// Host tag name.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into().to_ascii_lowercase());
        self
    }

    pub fn content_tag(mut self, tag: impl Into<String>) -> Self {
        self.content_tag = Some(tag.into().to_ascii_lowercase());
        self
    }

    /// Abstract base: exempt from the duplicate-name check, needs no tag.
    pub fn root(mut self) -> Self {
        self.root = true;
        self
    }

    pub fn raw_html(mut self) -> Self {
        self.raw_html = true;
        self
    }

    pub fn field(mut self, name: impl Into<String>, field: Field) -> Self {
        self.members.push((name.into(), Member::Field(field)));
        self
    }

    /// Plain value in the class body: new default or class constant.
    pub fn value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.members.push((name.into(), Member::Value(value.into())));
        self
    }

    /// Single child slot holding a clone of `template` per instance.
    pub fn child(mut self, name: impl Into<String>, template: ComponentId) -> Self {
        self.members
            .push((name.into(), Member::Child(ChildTemplate::Tag(template))));
        self
    }

    /// List slot holding clones of `templates` per instance.
    pub fn children(mut self, name: impl Into<String>, templates: Vec<ComponentId>) -> Self {
        self.members
            .push((name.into(), Member::Child(ChildTemplate::List(templates))));
        self
    }

    pub fn content<F>(mut self, content: F) -> Self
    where
        F: Fn(ComponentId) -> Result<Render> + 'static,
    {
        self.content = Some(Rc::new(content));
        self
    }

    /// Handle `event` reaching this component.
    pub fn on<F>(mut self, event: impl Into<String>, handler: F) -> Self
    where
        F: Fn(ComponentId, &HostEvent) -> Result<()> + 'static,
    {
        self.handlers.push(HandlerDecl {
            slot: None,
            event: event.into(),
            handler: Rc::new(handler),
        });
        self
    }

    /// Handle `event` reaching the child in `slot`. The handler receives the owner.
    pub fn on_child<F>(mut self, slot: impl Into<String>, event: impl Into<String>, handler: F) -> Self
    where
        F: Fn(ComponentId, &HostEvent) -> Result<()> + 'static,
    {
        self.handlers.push(HandlerDecl {
            slot: Some(slot.into()),
            event: event.into(),
            handler: Rc::new(handler),
        });
        self
    }

    pub fn on_notify<F>(mut self, hook: F) -> Self
    where
        F: Fn(ComponentId, &str, &Value) + 'static,
    {
        self.hooks.notify = Some(Rc::new(hook));
        self
    }

    pub fn on_pre_mount<F>(mut self, hook: F) -> Self
    where
        F: Fn(ComponentId) -> Result<()> + 'static,
    {
        self.hooks.pre_mount = Some(Rc::new(hook));
        self
    }

    pub fn on_mount<F>(mut self, hook: F) -> Self
    where
        F: Fn(ComponentId) -> Result<()> + 'static,
    {
        self.hooks.mount = Some(Rc::new(hook));
        self
    }

    pub fn on_set_ref<F>(mut self, hook: F) -> Self
    where
        F: Fn(ComponentId, Option<ComponentId>, &str) -> Result<()> + 'static,
    {
        self.hooks.set_ref = Some(Rc::new(hook));
        self
    }

    /// Resolve the class body against the parent class and register the class.
    pub fn build(self) -> Result<Rc<ComponentClass>> {
        let parent = self.parent;
        let (mut fields, mut defaults, mut constants, mut slots) = match &parent {
            Some(p) => (
                p.fields.clone(),
                p.defaults.clone(),
                p.constants.clone(),
                p.slots.clone(),
            ),
            None => Default::default(),
        };

        let mut bound_templates = Vec::new();
        for (name, member) in self.members {
            match member {
                Member::Field(mut field) => {
                    field.name = name.clone();
                    defaults.shift_remove(&name);
                    constants.shift_remove(&name);
                    slots.shift_remove(&name);
                    fields.insert(name, field);
                }
                Member::Value(value) => match fields.get(&name) {
                    Some(field) => {
                        let value = field.validate(value)?;
                        defaults.insert(name, value);
                    }
                    None => {
                        constants.insert(name, value);
                    }
                },
                Member::Child(template) => {
                    fields.shift_remove(&name);
                    defaults.shift_remove(&name);
                    constants.shift_remove(&name);
                    bound_templates.push((name.clone(), template.clone()));
                    slots.insert(name, template);
                }
            }
        }

        let inherited = |pick: fn(&ComponentClass) -> Option<String>| parent.as_deref().and_then(pick);
        let tag = self
            .tag
            .or_else(|| inherited(|p| p.tag.clone()))
            .or_else(|| (!self.root).then(|| to_kebab_case(&self.name)));
        let content_tag = self.content_tag.or_else(|| inherited(|p| p.content_tag.clone()));

        let mut handlers = parent.as_ref().map(|p| p.handlers.clone()).unwrap_or_default();
        handlers.extend(self.handlers);

        let hooks = match &parent {
            Some(p) => self.hooks.inherit(&p.hooks),
            None => self.hooks,
        };

        let class = Rc::new(ComponentClass {
            name: self.name,
            tag,
            content_tag,
            root: self.root,
            raw_html: self.raw_html || parent.as_ref().is_some_and(|p| p.raw_html),
            content: self.content.or_else(|| parent.as_ref().and_then(|p| p.content.clone())),
            parent,
            fields,
            defaults,
            constants,
            slots,
            hooks,
            handlers,
        });

        register_class(&class)?;

        for (slot, template) in bound_templates {
            match template {
                ChildTemplate::Tag(child) => registry::run_set_ref(child, None, &slot)?,
                ChildTemplate::List(list) => {
                    for child in list {
                        registry::run_set_ref(child, None, &slot)?;
                    }
                }
            }
        }

        log::debug!("[class] built {:?}", class);
        Ok(class)
    }
}

// =============================================================================
// Class Registry
// =============================================================================

thread_local! {
    /// Non-root classes by name.
    static CLASSES: RefCell<IndexMap<String, Rc<ComponentClass>>> = RefCell::new(IndexMap::new());

    /// Every class ever built, root classes included.
    static CLASS_COUNT: Cell<usize> = const { Cell::new(0) };
}

fn register_class(class: &Rc<ComponentClass>) -> Result<()> {
    if !class.root {
        CLASSES.with(|classes| {
            let mut classes = classes.borrow_mut();
            if classes.contains_key(&class.name) {
                return Err(WebError::DuplicateClass(class.name.clone()));
            }
            classes.insert(class.name.clone(), class.clone());
            Ok(())
        })?;
    }
    CLASS_COUNT.with(|count| count.set(count.get() + 1));
    Ok(())
}

/// Look up a registered (non-root) class.
pub fn class_by_name(name: &str) -> Option<Rc<ComponentClass>> {
    CLASSES.with(|classes| classes.borrow().get(name).cloned())
}

/// Number of classes built so far.
pub fn class_count() -> usize {
    CLASS_COUNT.with(|count| count.get())
}

pub fn reset_classes() {
    CLASSES.with(|classes| classes.borrow_mut().clear());
    CLASS_COUNT.with(|count| count.set(0));
}

// =============================================================================
// Tests
// =============================================================================
