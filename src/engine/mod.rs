//! Component Engine - Classes, instances, fields and child slots.
//!
//! The engine manages the core data structures:
//! - Class: per-type field table, built once and inherited
//! - Registry: component arena, identity, live-instance index
//! - Field: reactive field declarations and the get/set descriptor
//! - Children: per-instance copies of class-level template children
//!
//! # Architecture
//!
//! Components are handles into an arena, not objects:
//!
//! ```text
//! ComponentId(0): Counter  (parent=None, values={count: 3}, element=<button>)
//! ComponentId(1): Todo     (parent=2,    values={completed: true}, slot=todos[0])
//! ```
//!
//! Parents, dependents and child caches all store handles, so there are no
//! ownership cycles between a component and the renderers that read it.

mod class;
mod children;
mod field;
mod registry;

pub use class::*;
pub use children::*;
pub use field::*;
pub use registry::*;

pub(crate) use children::slot_components;
pub(crate) use registry::{with_component, with_component_mut};
