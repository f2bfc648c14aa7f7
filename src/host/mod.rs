//! Host Tree - The document the runtime renders into.
//!
//! The runtime never owns host nodes. It talks to the host through the
//! [`HostTree`] trait and refers to nodes by [`NodeId`]. One host tree is
//! installed per thread; [`MemoryDocument`] is installed by default.
//!
//! # Back-references
//!
//! Every node the runtime creates is tagged with an [`Owner`] so that
//! host-originated events can be routed back to the component tree
//! (see [`crate::state::dispatch`]).

mod memory;

use std::any::Any;
use std::cell::RefCell;

use crate::types::{ComponentId, RendererId};

pub use memory::MemoryDocument;

/// Handle to a node in the installed host tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

/// Runtime object that created a host node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    Component(ComponentId),
    Renderer(RendererId),
}

/// Operations the runtime needs from a host document.
pub trait HostTree {
    fn create_element(&mut self, tag: &str) -> NodeId;

    /// Create a detached fragment.
    fn create_fragment(&mut self) -> NodeId;

    /// Create a detached leaf node holding `markup` verbatim.
    fn create_markup(&mut self, markup: &str) -> NodeId;

    /// Insert `child` under `parent` at `index` (append when `None` or out of range).
    ///
    /// Inserting a fragment moves its children into `parent`; the fragment
    /// itself stays detached and empty.
    fn insert_child(&mut self, parent: NodeId, child: NodeId, index: Option<usize>);

    /// Remove `child` from `parent`. Returns false if it was not a child.
    ///
    /// The removed subtree is released; its ids must not be used again.
    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool;

    /// Release a detached node and its subtree. No-op for attached nodes.
    fn release(&mut self, node: NodeId);

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Position of `node` among its parent's children.
    fn index_of(&self, node: NodeId) -> Option<usize>;

    /// Lowercase tag name, `None` for non-element nodes.
    fn tag_name(&self, node: NodeId) -> Option<String>;

    /// Replace all children of `node` with `markup`. For a markup node,
    /// replace the markup it holds.
    fn set_inner_markup(&mut self, node: NodeId, markup: &str);

    fn inner_markup(&self, node: NodeId) -> String;

    /// Set (`Some`) or remove (`None`) an attribute.
    fn set_attribute(&mut self, node: NodeId, name: &str, value: Option<&str>);

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    /// Attach a new isolated subtree root to `host`.
    fn attach_shadow(&mut self, host: NodeId) -> NodeId;

    fn shadow_root(&self, host: NodeId) -> Option<NodeId>;

    fn set_owner(&mut self, node: NodeId, owner: Owner);

    fn owner(&self, node: NodeId) -> Option<Owner>;

    fn as_any(&self) -> &dyn Any;
}

// =============================================================================
// Installed Host
// =============================================================================

thread_local! {
    static HOST: RefCell<Box<dyn HostTree>> = RefCell::new(Box::new(MemoryDocument::new()));
}

/// Install `host` as this thread's host tree.
pub fn install(host: impl HostTree + 'static) {
    HOST.with(|h| *h.borrow_mut() = Box::new(host));
}

/// Run `f` against the installed host tree.
///
/// `f` must not call back into the runtime.
pub fn with_host<R>(f: impl FnOnce(&mut dyn HostTree) -> R) -> R {
    HOST.with(|h| f(h.borrow_mut().as_mut()))
}

/// Run `f` against the installed host if it is a [`MemoryDocument`].
pub fn with_document<R>(f: impl FnOnce(&MemoryDocument) -> R) -> Option<R> {
    HOST.with(|h| {
        let host = h.borrow();
        host.as_any().downcast_ref::<MemoryDocument>().map(f)
    })
}

/// The `<body>` node of the installed [`MemoryDocument`].
pub fn body() -> Option<NodeId> {
    with_document(|doc| doc.body())
}

/// Install a fresh [`MemoryDocument`] (for testing).
pub fn reset_host() {
    install(MemoryDocument::new());
}

/// Walk up from `node` to the nearest node carrying a back-reference.
pub fn find_owner(node: NodeId) -> Option<Owner> {
    with_host(|host| {
        let mut current = Some(node);
        while let Some(n) = current {
            if let Some(owner) = host.owner(n) {
                return Some(owner);
            }
            current = host.parent(n);
        }
        None
    })
}
