//! Child Slots - Per-instance copies of class-level template children.
//!
//! A class declares child slots with template instances:
//!
//! ```ignore
//! let list = ComponentClass::builder("TodoList")
//!     .tag("ul")
//!     .children("todos", vec![todo.create(Args::with_text("first"))?])
//!     .build()?;
//! ```
//!
//! The templates themselves are never mounted. The first access to a slot
//! from an owning instance clones the template (same constructor arguments,
//! fresh identity and field values), parents the copy to the owner and caches
//! it. Later accesses return the cached copy.
//!
//! Slot reads through [`child`] / [`children`] are render-tracked under the
//! slot name, and every mutation re-renders the slot's dependents.

use super::registry::{self, clone_component, run_set_ref, set_parent, set_position, with_component, with_component_mut};
use crate::error::{Result, WebError};
use crate::host::{with_host, NodeId};
use crate::pipeline::{mount_component, render_component, rerender_dependents, track_read, unmount_component};
use crate::types::ComponentId;

/// Class-level slot declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum ChildTemplate {
    Tag(ComponentId),
    List(Vec<ComponentId>),
}

/// An owner's private copy of a slot.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ChildInstance {
    Tag(ComponentId),
    List(Vec<ComponentId>),
}

impl ChildInstance {
    pub(crate) fn components(&self) -> Vec<ComponentId> {
        match self {
            ChildInstance::Tag(id) => vec![*id],
            ChildInstance::List(ids) => ids.clone(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ChildInstance::Tag(_) => "a single child",
            ChildInstance::List(_) => "a list of children",
        }
    }
}

// =============================================================================
// Resolution
// =============================================================================

/// The owner's copy of `slot`, created on first access.
fn resolve(owner: ComponentId, slot: &str) -> Result<ChildInstance> {
    let (cached, template, class) = with_component(owner, |c| {
        (c.children.get(slot).cloned(), c.class.slot(slot).cloned(), c.class.clone())
    })?;
    if let Some(instance) = cached {
        return Ok(instance);
    }
    let template = template.ok_or_else(|| WebError::UnknownSlot {
        class: class.name().to_string(),
        slot: slot.to_string(),
    })?;

    let instance = match template {
        ChildTemplate::Tag(template) => {
            let copy = clone_component(template)?;
            set_parent(copy, Some(owner), Some(slot), None)?;
            ChildInstance::Tag(copy)
        }
        ChildTemplate::List(templates) => {
            let mut copies = Vec::with_capacity(templates.len());
            for (position, template) in templates.into_iter().enumerate() {
                let copy = clone_component(template)?;
                set_parent(copy, Some(owner), Some(slot), Some(position))?;
                copies.push(copy);
            }
            ChildInstance::List(copies)
        }
    };
    with_component_mut(owner, |c| c.children.insert(slot.to_string(), instance.clone()))?;
    log::debug!("[children] {}.{} bound for {:?}", class.name(), slot, owner);

    for copy in instance.components() {
        run_set_ref(copy, Some(owner), slot)?;
    }
    Ok(instance)
}

fn resolve_list(owner: ComponentId, slot: &str) -> Result<Vec<ComponentId>> {
    match resolve(owner, slot)? {
        ChildInstance::List(ids) => Ok(ids),
        other => Err(WebError::SlotKind {
            slot: slot.to_string(),
            expected: "a list of children",
            actual: other.kind(),
        }),
    }
}

fn store_list(owner: ComponentId, slot: &str, ids: Vec<ComponentId>) -> Result<()> {
    with_component_mut(owner, |c| {
        c.children.insert(slot.to_string(), ChildInstance::List(ids));
    })
}

/// Every slot child of `owner` in slot declaration order (untracked).
pub(crate) fn slot_components(owner: ComponentId) -> Result<Vec<ComponentId>> {
    let class = registry::class_of(owner)?;
    let mut out = Vec::new();
    for slot in class.slot_names() {
        out.extend(resolve(owner, slot)?.components());
    }
    Ok(out)
}

// =============================================================================
// Mounting helpers
// =============================================================================

/// Host node that children of `slot` are mounted under: next to an already
/// mounted sibling, else the owner's element.
fn slot_host(owner: ComponentId, siblings: &[ComponentId]) -> Option<NodeId> {
    siblings
        .iter()
        .find_map(|s| with_component(*s, |c| c.mount_parent).ok().flatten())
        .or_else(|| registry::element(owner))
}

/// Host index in front of the first component mounted under `host` that
/// follows `child` in slot order. `None` appends.
fn insert_index(owner: ComponentId, child: ComponentId, host: NodeId) -> Result<Option<usize>> {
    let order = slot_components(owner)?;
    let Some(at) = order.iter().position(|id| *id == child) else {
        return Ok(None);
    };
    Ok(order[at + 1..]
        .iter()
        .filter_map(|id| registry::element(*id))
        .find_map(|element| {
            with_host(|h| match h.parent(element) {
                Some(parent) if parent == host => h.index_of(element),
                _ => None,
            })
        }))
}

fn attach(owner: ComponentId, child: ComponentId, host: Option<NodeId>) -> Result<()> {
    if let Some(host) = host {
        let index = insert_index(owner, child, host)?;
        mount_component(child, Some(owner), host, index)?;
        render_component(child)?;
    }
    Ok(())
}

fn detach(child: ComponentId) -> Result<()> {
    if registry::is_mounted(child) {
        unmount_component(child)?;
    }
    Ok(())
}

// =============================================================================
// Public API
// =============================================================================

/// The single child in `slot` (tracked).
pub fn child(owner: ComponentId, slot: &str) -> Result<ComponentId> {
    let id = child_untracked(owner, slot)?;
    track_read(owner, slot);
    Ok(id)
}

/// Replace the single child in `slot` outright.
pub fn set_child(owner: ComponentId, slot: &str, new_child: ComponentId) -> Result<()> {
    let old = child_untracked(owner, slot)?;
    if old == new_child {
        return Ok(());
    }
    let host = slot_host(owner, &[old]);
    detach(old)?;
    set_parent(old, None, None, None)?;

    set_parent(new_child, Some(owner), Some(slot), None)?;
    with_component_mut(owner, |c| {
        c.children.insert(slot.to_string(), ChildInstance::Tag(new_child));
    })?;
    attach(owner, new_child, host)?;
    rerender_dependents(owner, slot)
}

fn child_untracked(owner: ComponentId, slot: &str) -> Result<ComponentId> {
    match resolve(owner, slot)? {
        ChildInstance::Tag(id) => Ok(id),
        other => Err(WebError::SlotKind {
            slot: slot.to_string(),
            expected: "a single child",
            actual: other.kind(),
        }),
    }
}

/// The children in list slot `slot`, in order (tracked).
pub fn children(owner: ComponentId, slot: &str) -> Result<Vec<ComponentId>> {
    let ids = resolve_list(owner, slot)?;
    track_read(owner, slot);
    Ok(ids)
}

pub fn children_len(owner: ComponentId, slot: &str) -> Result<usize> {
    children(owner, slot).map(|ids| ids.len())
}

/// Append `new_child` to list slot `slot`.
pub fn append_child(owner: ComponentId, slot: &str, new_child: ComponentId) -> Result<()> {
    let mut ids = resolve_list(owner, slot)?;
    let host = slot_host(owner, &ids);
    set_parent(new_child, Some(owner), Some(slot), Some(ids.len()))?;
    ids.push(new_child);
    store_list(owner, slot, ids)?;

    attach(owner, new_child, host)?;
    rerender_dependents(owner, slot)
}

/// Remove `target` from list slot `slot`. Returns false if it was not there.
pub fn remove_child(owner: ComponentId, slot: &str, target: ComponentId) -> Result<bool> {
    let mut ids = resolve_list(owner, slot)?;
    let Some(index) = ids.iter().position(|id| *id == target) else {
        return Ok(false);
    };
    ids.remove(index);
    for (position, id) in ids.iter().enumerate().skip(index) {
        set_position(*id, Some(position))?;
    }
    store_list(owner, slot, ids)?;

    detach(target)?;
    set_parent(target, None, None, None)?;
    rerender_dependents(owner, slot)?;
    Ok(true)
}

/// Replace the whole list in `slot`.
pub fn replace_children(owner: ComponentId, slot: &str, new_children: Vec<ComponentId>) -> Result<()> {
    let old = resolve_list(owner, slot)?;
    let host = slot_host(owner, &old);
    for id in old.iter().filter(|id| !new_children.contains(id)) {
        detach(*id)?;
        set_parent(*id, None, None, None)?;
    }
    for (position, id) in new_children.iter().enumerate() {
        set_parent(*id, Some(owner), Some(slot), Some(position))?;
    }
    store_list(owner, slot, new_children.clone())?;

    for id in new_children {
        detach(id)?;
        attach(owner, id, host)?;
    }
    rerender_dependents(owner, slot)
}

impl ComponentId {
    pub fn child(self, slot: &str) -> Result<ComponentId> {
        child(self, slot)
    }

    pub fn children(self, slot: &str) -> Result<Vec<ComponentId>> {
        children(self, slot)
    }

    pub fn append_child(self, slot: &str, new_child: ComponentId) -> Result<()> {
        append_child(self, slot, new_child)
    }

    pub fn remove_child(self, slot: &str, target: ComponentId) -> Result<bool> {
        remove_child(self, slot, target)
    }
}

// =============================================================================
// Tests
// =============================================================================
