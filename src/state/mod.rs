//! State Module - Runtime state outside the component arena
//!
//! - **Events** - Host event routing, model bindings, handler bubbling

mod events;

pub use events::*;
