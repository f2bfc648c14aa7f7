//! Mount API - Attaching components to the host tree.
//!
//! Mounting a component creates its host element, one renderer for its
//! content and mounts its slot children under the element. Each renderer
//! picks its mount point from the component's element:
//!
//! - the class has a `content_tag`: a new element of that tag
//!   ([`MountMode::Element`])
//! - the element is an isolated host (custom element or allow-listed tag): the
//!   element's isolated subtree root, attached once and shared by every
//!   renderer of that element ([`MountMode::Isolated`])
//! - otherwise a detached fragment whose output is reconciled into the
//!   element ([`MountMode::Fragment`]). If the class declares child slots,
//!   the output gets a markup node of its own ahead of the slot children so
//!   that rendering never replaces them.
//!
//! # Example
//!
//! ```ignore
//! use spark_web::{body, mount, unmount};
//!
//! let root = app.instantiate()?;
//! mount(root, body().unwrap())?;
//! // ...
//! unmount(root, body().unwrap())?;
//! ```

use std::rc::Rc;

use super::render::{
    create_renderer, destroy_renderer, render, renderers_of, with_renderer, with_renderer_mut, MountMode, Render,
};
use crate::config::is_isolated_host;
use crate::engine::{
    attribute_value, attributes, class_of, is_mounted, reflect_attributes, slot_components,
    with_component, with_component_mut, ContentFn,
};
use crate::error::Result;
use crate::host::{with_host, NodeId, Owner};
use crate::types::{ComponentId, RendererId};

// =============================================================================
// Entry points
// =============================================================================

/// Mount `root` under `host` and render it.
pub fn mount(root: ComponentId, host: NodeId) -> Result<()> {
    mount_component(root, None, host, None)?;
    render_component(root)
}

/// Unmount `root` if it is mounted directly under `host`. Otherwise a no-op.
pub fn unmount(root: ComponentId, host: NodeId) -> Result<()> {
    let mounted_under = with_component(root, |c| c.mount_parent)?;
    if mounted_under != Some(host) {
        return Ok(());
    }
    unmount_component(root)
}

// =============================================================================
// Components
// =============================================================================

/// Create the element of `id` under `host` at `index`, set up its content
/// renderer and mount its slot children. Does not render.
///
/// A component that is already mounted is unmounted first.
pub fn mount_component(
    id: ComponentId,
    parent: Option<ComponentId>,
    host: NodeId,
    index: Option<usize>,
) -> Result<()> {
    if is_mounted(id) {
        unmount_component(id)?;
    }
    let class = class_of(id)?;

    with_component_mut(id, |c| {
        if parent.is_some() {
            c.parent = parent;
        }
        c.mount_parent = Some(host);
    })?;
    if let Some(pre_mount) = &class.hooks().pre_mount {
        pre_mount(id)?;
    }

    let tag = class.tag().unwrap_or("div");
    let element = with_host(|h| {
        let element = h.create_element(tag);
        h.insert_child(host, element, index);
        h.set_owner(element, Owner::Component(id));
        element
    });
    with_component_mut(id, |c| c.element = Some(element))?;
    reflect_attributes(id)?;
    log::debug!("[mount] {} {:?} under {:?}", class.name(), id, host);

    if let Some(content) = content_of(id)? {
        let renderer = create_renderer(id, content)?;
        mount_renderer(renderer, element, None)?;
    }

    for child in slot_components(id)? {
        mount_component(child, Some(id), element, None)?;
    }

    if let Some(mount_hook) = &class.hooks().mount {
        mount_hook(id)?;
    }
    Ok(())
}

/// The class content function, or the first constructor argument as text.
fn content_of(id: ComponentId) -> Result<Option<ContentFn>> {
    let (class, text) = with_component(id, |c| {
        (c.class.clone(), c.args.get().and_then(|a| a.text().cloned()))
    })?;
    if let Some(content) = class.content() {
        return Ok(Some(content));
    }
    Ok(text.map(|text| {
        let text = text.to_string();
        let content: ContentFn = Rc::new(move |_: ComponentId| -> Result<Render> { Ok(Render::Text(text.clone())) });
        content
    }))
}

/// Render every renderer of `id`, then its mounted slot children that no
/// renderer delegates to.
pub fn render_component(id: ComponentId) -> Result<()> {
    if !is_mounted(id) {
        return Ok(());
    }
    let renderers = renderers_of(id);
    for renderer in &renderers {
        render(*renderer)?;
    }

    let delegated: Vec<ComponentId> = renderers
        .iter()
        .flat_map(|r| super::render::renderer_children(*r))
        .collect();
    for child in slot_components(id)? {
        if is_mounted(child) && !delegated.contains(&child) {
            render_component(child)?;
        }
    }
    Ok(())
}

/// Tear down `id`: slot children, renderers, then its element.
pub fn unmount_component(id: ComponentId) -> Result<()> {
    for child in slot_components(id)? {
        if is_mounted(child) {
            unmount_component(child)?;
        }
    }

    for renderer in renderers_of(id) {
        for child in super::render::renderer_children(renderer) {
            if is_mounted(child) {
                unmount_component(child)?;
            }
        }
        unmount_renderer(renderer)?;
        destroy_renderer(renderer)?;
    }

    let (element, host) = with_component_mut(id, |c| {
        c.shadow_root = None;
        (c.element.take(), c.mount_parent.take())
    })?;
    if let (Some(element), Some(host)) = (element, host) {
        with_host(|h| h.remove_child(host, element));
    }
    log::debug!("[unmount] {:?}", id);
    Ok(())
}

// =============================================================================
// Renderers
// =============================================================================

/// Pick the mount point of `renderer` inside `host` (the component's element)
/// and record it. Does not render.
pub fn mount_renderer(renderer: RendererId, host: NodeId, index: Option<usize>) -> Result<()> {
    let component = with_renderer(renderer, |r| r.component)?;
    let class = class_of(component)?;
    let host_tag = with_host(|h| h.tag_name(host)).unwrap_or_default();

    let (mode, mount_element, anchored) = if let Some(content_tag) = class.content_tag() {
        let element = with_host(|h| {
            let element = h.create_element(content_tag);
            h.insert_child(host, element, index);
            element
        });
        (MountMode::Element, element, false)
    } else if is_isolated_host(&host_tag) {
        let existing = with_component(component, |c| c.shadow_root)?;
        let root = with_host(|h| match existing.or_else(|| h.shadow_root(host)) {
            Some(root) if h.parent(root) == Some(host) => root,
            _ => h.attach_shadow(host),
        });
        with_component_mut(component, |c| c.shadow_root = Some(root))?;
        (MountMode::Isolated, root, false)
    } else if class.slot_names().next().is_some() {
        let anchor = with_host(|h| {
            let anchor = h.create_markup("");
            h.insert_child(host, anchor, index);
            anchor
        });
        (MountMode::Fragment, anchor, true)
    } else {
        let fragment = with_host(|h| {
            let fragment = h.create_fragment();
            h.insert_child(host, fragment, index);
            fragment
        });
        (MountMode::Fragment, fragment, false)
    };

    with_host(|h| {
        if h.owner(mount_element).is_none() || mode != MountMode::Isolated {
            h.set_owner(mount_element, Owner::Renderer(renderer));
        }
    });
    with_renderer_mut(renderer, |r| {
        r.mode = Some(mode);
        r.mount_element = Some(mount_element);
        r.mount_parent = Some(host);
        r.anchored = anchored;
        r.children.clear();
        r.last_markup = None;
    })?;
    log::debug!("[mount] {:?} as {:?} in <{}>", renderer, mode, host_tag);
    Ok(())
}

/// Detach `renderer` from its mount point.
///
/// Element mounts and anchored fragment nodes are removed. Isolated roots are
/// emptied but stay attached for reuse. Fragment output is cleared from the
/// parent only while the parent still shows exactly what this renderer last
/// wrote.
pub fn unmount_renderer(renderer: RendererId) -> Result<()> {
    let (mode, mount_element, host, anchored, last) = with_renderer(renderer, |r| {
        (r.mode, r.mount_element, r.mount_parent, r.anchored, r.last_markup.clone())
    })?;

    match (mode, mount_element, host) {
        (Some(MountMode::Element), Some(element), Some(host)) => {
            with_host(|h| h.remove_child(host, element));
        }
        (Some(MountMode::Fragment), Some(anchor), Some(host)) if anchored => {
            with_host(|h| h.remove_child(host, anchor));
        }
        (Some(MountMode::Isolated), Some(root), _) => {
            with_host(|h| h.set_inner_markup(root, ""));
        }
        (Some(MountMode::Fragment), fragment, Some(host)) => {
            with_host(|h| {
                if last.as_deref().is_some_and(|last| h.inner_markup(host) == last) {
                    h.set_inner_markup(host, "");
                }
                if let Some(fragment) = fragment {
                    h.release(fragment);
                }
            });
        }
        _ => {}
    }

    with_renderer_mut(renderer, |r| {
        r.mode = None;
        r.mount_element = None;
        r.mount_parent = None;
        r.anchored = false;
        r.children.clear();
    })
}

// =============================================================================
// Static markup
// =============================================================================

/// `<tag attrs>text</tag>` for a component that is not mounted on its own.
pub fn static_markup(id: ComponentId) -> Result<String> {
    let class = class_of(id)?;
    let tag = class.tag().unwrap_or("div");
    let text = with_component(id, |c| c.args.get().and_then(|a| a.text().cloned()))?.unwrap_or_default();

    let mut out = format!("<{tag}");
    for (name, value) in attributes(id)? {
        let Some(value) = attribute_value(&value) else {
            continue;
        };
        out.push(' ');
        out.push_str(&crate::utils::to_kebab_case(name.trim_start_matches('_')));
        if !value.is_empty() {
            out.push_str(&format!("=\"{}\"", value.replace('"', "&quot;")));
        }
    }
    out.push('>');
    out.push_str(&text.to_string());
    out.push_str(&format!("</{tag}>"));
    Ok(out)
}

// =============================================================================
// Tests
// =============================================================================
