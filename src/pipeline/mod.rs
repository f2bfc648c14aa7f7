//! Render Pipeline
//!
//! This module connects the component engine to the host tree.
//!
//! # Pipeline Architecture
//!
//! ```text
//! field write → dependent list → render(R) → content() → Render → host node
//! ```
//!
//! ## Data Flow
//!
//! 1. **mount** - Creates the component's element and a renderer per content
//!    function, choosing element, isolated or fragment mount points
//! 2. **render** - Runs the content function with the renderer on the render
//!    stack, so every tracked read registers it as a dependent
//! 3. **re-render** - A changed field write renders exactly the renderers on
//!    that field's dependent list
//!
//! ## Threading
//!
//! Both stacks and every arena are thread-local. The runtime is not
//! thread-safe and nothing in it is `Send`; each thread drives its own tree.

mod mount;
mod render;

pub use mount::{
    mount, mount_component, mount_renderer, render_component, static_markup, unmount, unmount_component,
    unmount_renderer,
};
pub use render::{
    create_renderer, current_renderer, dependents, destroy_renderer, mount_element, mount_mode, render, render_count,
    render_depth, renderer_children, renderer_component, renderer_count, renderer_exists, renderers_of,
    rerender_dependents, reset_renderers, track_read, MountMode, Piece, Render,
};
