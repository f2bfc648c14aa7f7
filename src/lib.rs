//! # spark-web
//!
//! Reactive component runtime for host document trees.
//!
//! ## Architecture
//!
//! Components are handles into a thread-local arena. A component class is
//! built once and carries the field table, child slots, content function and
//! hooks shared by all its instances:
//!
//! ```text
//! ComponentClass ──create──▶ ComponentId ──mount──▶ element + renderer(s)
//!                                 │                        │
//!                          field write ──dependents──▶ render pass
//! ```
//!
//! Rendering is dependency-tracked: every tracked field read during a
//! renderer's pass registers the renderer on that field, and a changed write
//! re-renders exactly those renderers by replacing their markup.
//!
//! The runtime is single-threaded. All state is thread-local; every thread
//! drives an independent runtime.
//!
//! ## Modules
//!
//! - [`types`] - Core types (handles, Value, FieldFlags)
//! - [`engine`] - Classes, instances, reactive fields, child slots
//! - [`pipeline`] - Renderers, render/re-render stacks, mount lifecycle
//! - [`host`] - Host tree boundary and the in-memory document
//! - [`state`] - Host event routing
//! - [`config`] - Runtime configuration and logging setup
//!
//! ## Example
//!
//! ```ignore
//! use spark_web::*;
//!
//! let counter = ComponentClass::builder("Counter")
//!     .tag("button")
//!     .field("count", state().with_default(0))
//!     .on("click", |id, _| id.set("count", id.get_int("count")? + 1))
//!     .content(|id| Ok(format!("Count: {}", id.get_int("count")?).into()))
//!     .build()?;
//!
//! let id = counter.instantiate()?;
//! mount(id, body().unwrap())?;
//! dispatch_to(id, HostEvent::new("click"))?;
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod host;
pub mod pipeline;
pub mod state;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use types::*;

pub use error::{Result, WebError};

pub use config::{
    config, init_logging, is_isolated_host, load_config_json, reset_config, set_config, RuntimeConfig,
};

pub use engine::{
    append_child, attr, attributes, child, children, children_len, class_by_name, class_count, class_of,
    clone_component, component_count, create, element, identity, is_mounted, live_instances,
    remove_child, replace_children, reset_classes, reset_registry, set_child, state, states, Args,
    ChildTemplate, ClassBuilder, ComponentClass, Field, FieldKind, Hooks,
};

pub use host::{body, find_owner, install, reset_host, with_document, with_host, HostTree, MemoryDocument, NodeId, Owner};

pub use pipeline::{
    create_renderer, current_renderer, dependents, destroy_renderer, mount, mount_renderer, render,
    render_component, render_count, renderers_of, reset_renderers, static_markup, unmount, unmount_renderer,
    MountMode, Piece, Render,
};

pub use state::{dispatch, dispatch_to, last_event, reset_events, EventHandler, HostEvent};

/// Reset every piece of thread-local runtime state (for testing).
///
/// Installs a fresh [`MemoryDocument`] and the default configuration.
pub fn reset_runtime() {
    reset_renderers();
    reset_registry();
    reset_classes();
    reset_events();
    reset_host();
    reset_config();
}
