//! Host Events - Routing host-originated events into the component tree.
//!
//! Every node the runtime creates carries a back-reference to the component
//! or renderer that created it. [`dispatch`] resolves that back-reference
//! (walking up the host tree from the event target) and offers the event to
//! components from the target upwards:
//!
//! 1. model bindings: `attr().model("input")` writes the event value
//! 2. the component's own handlers (`.on("click", ..)`)
//! 3. handlers its owner declared for the slot it fills (`.on_child(..)`)
//!
//! Dispatch stops at the first component where anything handled the event.

use std::cell::RefCell;
use std::rc::Rc;

use crate::engine::{class_of, parent, set, slot_of};
use crate::error::Result;
use crate::host::{find_owner, NodeId, Owner};
use crate::pipeline::renderer_component;
use crate::types::ComponentId;

// =============================================================================
// Types
// =============================================================================

/// Event raised by the host.
#[derive(Clone, Debug, PartialEq)]
pub struct HostEvent {
    /// Event name (e.g. "click", "input")
    pub kind: String,
    /// Value carried by the event, for inputs
    pub value: Option<String>,
    /// Component the event was first offered to (set by dispatch)
    pub target: Option<ComponentId>,
}

impl HostEvent {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: None,
            target: None,
        }
    }

    pub fn with_value(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: Some(value.into()),
            target: None,
        }
    }
}

/// Event handler. Receives the component that declared it.
pub type EventHandler = Rc<dyn Fn(ComponentId, &HostEvent) -> Result<()>>;

thread_local! {
    static LAST_EVENT: RefCell<Option<HostEvent>> = const { RefCell::new(None) };
}

/// The last event passed to [`dispatch`] or [`dispatch_to`].
pub fn last_event() -> Option<HostEvent> {
    LAST_EVENT.with(|e| e.borrow().clone())
}

// =============================================================================
// Dispatch
// =============================================================================

/// Dispatch `event` raised on host node `node`.
///
/// Returns true if some component handled it.
pub fn dispatch(node: NodeId, event: HostEvent) -> Result<bool> {
    let target = match find_owner(node) {
        Some(Owner::Component(id)) => id,
        Some(Owner::Renderer(renderer)) => renderer_component(renderer)?,
        None => {
            log::debug!("[events] {} on {:?}: no owner", event.kind, node);
            return Ok(false);
        }
    };
    dispatch_to(target, event)
}

/// Offer `event` to `target`, then to its ancestors until handled.
pub fn dispatch_to(target: ComponentId, mut event: HostEvent) -> Result<bool> {
    event.target = Some(target);
    LAST_EVENT.with(|e| *e.borrow_mut() = Some(event.clone()));

    let mut current = Some(target);
    while let Some(id) = current {
        if handle(id, &event)? {
            return Ok(true);
        }
        current = parent(id);
    }
    Ok(false)
}

fn handle(id: ComponentId, event: &HostEvent) -> Result<bool> {
    let class = class_of(id)?;
    let mut handled = false;

    if let Some(value) = &event.value {
        let bound: Vec<String> = class
            .fields()
            .filter(|(_, f)| f.model_event() == Some(event.kind.as_str()))
            .map(|(name, _)| name.clone())
            .collect();
        for name in bound {
            set(id, &name, value.as_str())?;
            handled = true;
        }
    }

    for handler in class.handlers_for(None, &event.kind) {
        handler(id, event)?;
        handled = true;
    }

    if let (Some(owner), Some(slot)) = (parent(id), slot_of(id)) {
        for handler in class_of(owner)?.handlers_for(Some(&slot), &event.kind) {
            handler(owner, event)?;
            handled = true;
        }
    }

    if handled {
        log::debug!("[events] {} handled by {} {:?}", event.kind, class.name(), id);
    }
    Ok(handled)
}

/// Forget the last event (for testing).
pub fn reset_events() {
    LAST_EVENT.with(|e| *e.borrow_mut() = None);
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::engine::{attr, element, state, Args, ComponentClass};
    use crate::host::body;
    use crate::pipeline::mount;
    use crate::reset_runtime;
    use crate::types::{Value, ValueType};

    #[test]
    fn test_dispatch_to_own_handler() {
        reset_runtime();
        let class = ComponentClass::builder("Clicker")
            .tag("button")
            .field("clicks", state().with_default(0))
            .on("click", |id, _| id.set("clicks", id.get_int("clicks")? + 1))
            .build()
            .unwrap();
        let id = class.instantiate().unwrap();
        mount(id, body().unwrap()).unwrap();

        let button = element(id).unwrap();
        assert!(dispatch(button, HostEvent::new("click")).unwrap());
        assert!(!dispatch(button, HostEvent::new("hover")).unwrap());
        assert_eq!(id.get_int("clicks").unwrap(), 1);
        assert_eq!(last_event().and_then(|e| e.target), Some(id));
    }

    #[test]
    fn test_model_binding() {
        reset_runtime();
        let class = ComponentClass::builder("TextField")
            .tag("input")
            .field("value", attr().with_default("").model("input"))
            .field("length", attr().coerce(ValueType::Int).model("resize"))
            .build()
            .unwrap();
        let id = class.instantiate().unwrap();
        mount(id, body().unwrap()).unwrap();

        dispatch(element(id).unwrap(), HostEvent::with_value("input", "hello")).unwrap();
        assert_eq!(id.get_str("value").unwrap(), "hello");
        let input = element(id).unwrap();
        assert_eq!(
            crate::host::with_host(|h| h.attribute(input, "value")).as_deref(),
            Some("hello")
        );

        dispatch_to(id, HostEvent::with_value("resize", "12")).unwrap();
        assert_eq!(id.get_int("length").unwrap(), 12);
    }

    #[test]
    fn test_slot_handler_bubbles_to_owner() {
        reset_runtime();
        let item = ComponentClass::builder("Item").tag("li").build().unwrap();
        let list = ComponentClass::builder("List")
            .tag("ul")
            .field("picked", state())
            .children("items", vec![item.create(Args::with_text("a")).unwrap()])
            .on_child("items", "click", |owner, event| {
                let position = event.target.and_then(|t| t.position());
                owner.set("picked", position)
            })
            .build()
            .unwrap();
        let id = list.instantiate().unwrap();
        mount(id, body().unwrap()).unwrap();

        let first = id.children("items").unwrap()[0];
        let li = element(first).unwrap();
        assert!(dispatch(li, HostEvent::new("click")).unwrap());
        assert_eq!(id.get("picked").unwrap(), Value::Int(0));
    }

    #[test]
    fn test_bubbles_to_parent_component() {
        reset_runtime();
        let hits = Rc::new(Cell::new(0));
        let seen = hits.clone();
        let inner = ComponentClass::builder("Inner").tag("span").build().unwrap();
        let outer = ComponentClass::builder("Outer")
            .tag("section")
            .child("inner", inner.instantiate().unwrap())
            .on("click", move |_, _| {
                seen.set(seen.get() + 1);
                Ok(())
            })
            .build()
            .unwrap();
        let id = outer.instantiate().unwrap();
        mount(id, body().unwrap()).unwrap();

        let span = element(id.child("inner").unwrap()).unwrap();
        assert!(dispatch(span, HostEvent::new("click")).unwrap());
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_unowned_node() {
        reset_runtime();
        assert!(!dispatch(body().unwrap(), HostEvent::new("click")).unwrap());
    }
}
