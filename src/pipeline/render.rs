//! Render Engine - Dependency-tracked renderers.
//!
//! A renderer binds a component's content function to a place in the host
//! tree. Rendering pushes the renderer onto two thread-local stacks:
//!
//! - the **render stack**: its top is the renderer whose reads are tracked.
//!   Every tracked field read while a renderer is on top adds that renderer to
//!   the dependent list the read component keeps for that field.
//! - the **re-render stack**: renderers currently in flight.
//!   [`rerender_dependents`] skips them, so a renderer that writes a field it
//!   reads cannot re-trigger itself.
//!
//! ```text
//! set(counter, "count", 3)
//!   └─ rerender_dependents(counter, "count")
//!        └─ render(R)            push R
//!             ├─ content(counter)  get("count") → R already a dependent
//!             └─ write "Count: 3"  pop R
//! ```
//!
//! Content produces a [`Render`]: text is written as inner markup, a list of
//! components is mounted and the renderer delegates to those components on
//! later passes.

use std::cell::RefCell;

use slab::Slab;

use super::mount::{mount_component, render_component, static_markup};
use crate::config::config;
use crate::engine::{class_of, with_component, with_component_mut, ContentFn};
use crate::error::{Result, WebError};
use crate::host::{with_host, NodeId};
use crate::types::{ComponentId, RendererId};

// =============================================================================
// Render Result
// =============================================================================

/// Output of a content function.
#[derive(Debug, Clone, PartialEq)]
pub enum Render {
    /// Markup written into the renderer's mount point.
    Text(String),
    /// Components mounted under the renderer's mount point.
    Children(Vec<ComponentId>),
    /// Text and components. Only components: same as `Children`.
    /// Otherwise components contribute their static markup.
    Mixed(Vec<Piece>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Piece {
    Text(String),
    Component(ComponentId),
}

impl Render {
    pub fn text(text: impl ToString) -> Self {
        Render::Text(text.to_string())
    }
}

impl From<String> for Render {
    fn from(text: String) -> Self {
        Render::Text(text)
    }
}

impl From<&str> for Render {
    fn from(text: &str) -> Self {
        Render::Text(text.to_string())
    }
}

impl From<ComponentId> for Render {
    fn from(id: ComponentId) -> Self {
        Render::Children(vec![id])
    }
}

impl From<Vec<ComponentId>> for Render {
    fn from(ids: Vec<ComponentId>) -> Self {
        Render::Children(ids)
    }
}

impl From<Vec<Piece>> for Render {
    fn from(pieces: Vec<Piece>) -> Self {
        Render::Mixed(pieces)
    }
}

impl From<&str> for Piece {
    fn from(text: &str) -> Self {
        Piece::Text(text.to_string())
    }
}

impl From<String> for Piece {
    fn from(text: String) -> Self {
        Piece::Text(text)
    }
}

impl From<ComponentId> for Piece {
    fn from(id: ComponentId) -> Self {
        Piece::Component(id)
    }
}

// =============================================================================
// Renderer State
// =============================================================================

/// Where a mounted renderer writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountMode {
    /// Own content element inserted into the component's element.
    Element,
    /// Isolated subtree root attached to the component's element.
    Isolated,
    /// Detached fragment, reconciled into the component's element. When the
    /// element also holds slot children, the output keeps a markup node of
    /// its own ahead of them instead.
    Fragment,
}

pub(crate) struct RendererState {
    pub(crate) component: ComponentId,
    content: ContentFn,
    pub(crate) mode: Option<MountMode>,
    pub(crate) mount_element: Option<NodeId>,
    pub(crate) mount_parent: Option<NodeId>,
    /// The mount element is a markup node attached to the mount parent.
    pub(crate) anchored: bool,
    /// Components the content resolved to; later passes delegate to them.
    pub(crate) children: Vec<ComponentId>,
    pub(crate) last_markup: Option<String>,
    render_count: usize,
    /// (component, key) pairs whose dependent lists hold this renderer.
    sources: Vec<(ComponentId, String)>,
}

thread_local! {
    static RENDERERS: RefCell<Slab<RendererState>> = RefCell::new(Slab::new());

    /// Renderers currently executing, innermost last.
    static RENDER_STACK: RefCell<Vec<RendererId>> = const { RefCell::new(Vec::new()) };

    /// Renderers with a pass in flight.
    static RERENDER_STACK: RefCell<Vec<RendererId>> = const { RefCell::new(Vec::new()) };
}

pub(crate) fn with_renderer<R>(id: RendererId, f: impl FnOnce(&RendererState) -> R) -> Result<R> {
    RENDERERS.with(|renderers| {
        renderers
            .borrow()
            .get(id.0)
            .map(f)
            .ok_or(WebError::UnknownRenderer(id))
    })
}

pub(crate) fn with_renderer_mut<R>(id: RendererId, f: impl FnOnce(&mut RendererState) -> R) -> Result<R> {
    RENDERERS.with(|renderers| {
        renderers
            .borrow_mut()
            .get_mut(id.0)
            .map(f)
            .ok_or(WebError::UnknownRenderer(id))
    })
}

/// Create an unmounted renderer of `content` bound to `component`.
pub fn create_renderer(component: ComponentId, content: ContentFn) -> Result<RendererId> {
    // fails for unknown components before anything is allocated
    class_of(component)?;
    let id = RendererId(RENDERERS.with(|renderers| {
        renderers.borrow_mut().insert(RendererState {
            component,
            content,
            mode: None,
            mount_element: None,
            mount_parent: None,
            anchored: false,
            children: Vec::new(),
            last_markup: None,
            render_count: 0,
            sources: Vec::new(),
        })
    }));
    with_component_mut(component, |c| c.renderers.push(id))?;
    Ok(id)
}

/// Drop a renderer and remove it from every dependent list it joined.
pub fn destroy_renderer(id: RendererId) -> Result<()> {
    let state = RENDERERS
        .with(|renderers| renderers.borrow_mut().try_remove(id.0))
        .ok_or(WebError::UnknownRenderer(id))?;
    for (component, key) in &state.sources {
        let _ = with_component_mut(*component, |c| {
            if let Some(list) = c.dependents.get_mut(key) {
                list.retain(|r| *r != id);
            }
        });
    }
    let _ = with_component_mut(state.component, |c| c.renderers.retain(|r| *r != id));
    Ok(())
}

pub fn renderer_exists(id: RendererId) -> bool {
    RENDERERS.with(|renderers| renderers.borrow().contains(id.0))
}

/// Number of passes `id` has run (0 for unknown renderers).
pub fn render_count(id: RendererId) -> usize {
    with_renderer(id, |r| r.render_count).unwrap_or(0)
}

pub fn renderer_count() -> usize {
    RENDERERS.with(|renderers| renderers.borrow().len())
}

pub fn renderer_component(id: RendererId) -> Result<ComponentId> {
    with_renderer(id, |r| r.component)
}

/// Mount mode, `None` while unmounted.
pub fn mount_mode(id: RendererId) -> Option<MountMode> {
    with_renderer(id, |r| r.mode).ok().flatten()
}

/// Host node the renderer writes into.
pub fn mount_element(id: RendererId) -> Option<NodeId> {
    with_renderer(id, |r| r.mount_element).ok().flatten()
}

/// Components the renderer delegates to.
pub fn renderer_children(id: RendererId) -> Vec<ComponentId> {
    with_renderer(id, |r| r.children.clone()).unwrap_or_default()
}

/// Renderers of `component`, in creation order.
pub fn renderers_of(component: ComponentId) -> Vec<RendererId> {
    with_component(component, |c| c.renderers.clone()).unwrap_or_default()
}

// =============================================================================
// Stacks & Tracking
// =============================================================================

/// Pushes a renderer onto both stacks; pops on drop, but only while it is
/// still the top entry.
struct StackGuard(RendererId);

impl StackGuard {
    fn push(id: RendererId) -> Self {
        RENDER_STACK.with(|stack| stack.borrow_mut().push(id));
        RERENDER_STACK.with(|stack| stack.borrow_mut().push(id));
        StackGuard(id)
    }
}

impl Drop for StackGuard {
    fn drop(&mut self) {
        for stack in [&RENDER_STACK, &RERENDER_STACK] {
            stack.with(|stack| {
                let mut stack = stack.borrow_mut();
                if stack.last() == Some(&self.0) {
                    stack.pop();
                }
            });
        }
    }
}

/// The renderer whose reads are being tracked.
pub fn current_renderer() -> Option<RendererId> {
    RENDER_STACK.with(|stack| stack.borrow().last().copied())
}

pub fn render_depth() -> usize {
    RENDER_STACK.with(|stack| stack.borrow().len())
}

fn in_flight(id: RendererId) -> bool {
    RERENDER_STACK.with(|stack| stack.borrow().contains(&id))
}

/// Register the current renderer as a dependent of `component`'s `key`.
///
/// A renderer joins a list at most once.
pub fn track_read(component: ComponentId, key: &str) {
    let Some(renderer) = current_renderer() else {
        return;
    };
    let added = with_component_mut(component, |c| {
        let list = c.dependents.entry(key.to_string()).or_default();
        if list.contains(&renderer) {
            false
        } else {
            list.push(renderer);
            true
        }
    })
    .unwrap_or(false);

    if added {
        let _ = with_renderer_mut(renderer, |r| r.sources.push((component, key.to_string())));
    }
}

/// Renderers registered on `component`'s `key`, in registration order.
pub fn dependents(component: ComponentId, key: &str) -> Vec<RendererId> {
    with_component(component, |c| c.dependents.get(key).cloned().unwrap_or_default()).unwrap_or_default()
}

/// Re-render every dependent of `component`'s `key`, in registration order.
///
/// Renderers already in flight are skipped.
pub fn rerender_dependents(component: ComponentId, key: &str) -> Result<()> {
    for renderer in dependents(component, key) {
        if !renderer_exists(renderer) || in_flight(renderer) {
            continue;
        }
        render(renderer)?;
    }
    Ok(())
}

// =============================================================================
// Render Protocol
// =============================================================================

enum Resolved {
    Markup(String),
    Children(Vec<ComponentId>),
}

fn not_renderable(component: ComponentId, reason: impl Into<String>) -> WebError {
    let name = class_of(component).map(|c| c.name().to_string()).unwrap_or_default();
    WebError::NotRenderable {
        component: name,
        reason: reason.into(),
    }
}

fn check_child(component: ComponentId, child: ComponentId) -> Result<()> {
    if child == component {
        return Err(not_renderable(component, "a component cannot render itself"));
    }
    if class_of(child).is_err() {
        return Err(not_renderable(component, format!("{child:?} does not exist")));
    }
    Ok(())
}

fn resolve(component: ComponentId, output: Render) -> Result<Resolved> {
    match output {
        Render::Text(text) => Ok(Resolved::Markup(text)),
        Render::Children(ids) if ids.is_empty() => Ok(Resolved::Markup(String::new())),
        Render::Children(ids) => {
            for id in &ids {
                check_child(component, *id)?;
            }
            Ok(Resolved::Children(ids))
        }
        Render::Mixed(pieces) => {
            if !pieces.is_empty() && pieces.iter().all(|p| matches!(p, Piece::Component(_))) {
                let ids = pieces
                    .into_iter()
                    .filter_map(|p| match p {
                        Piece::Component(id) => Some(id),
                        Piece::Text(_) => None,
                    })
                    .collect();
                return resolve(component, Render::Children(ids));
            }
            let mut markup = String::new();
            for piece in pieces {
                match piece {
                    Piece::Text(text) => markup.push_str(&text),
                    Piece::Component(id) => {
                        check_child(component, id)?;
                        markup.push_str(&static_markup(id)?);
                    }
                }
            }
            Ok(Resolved::Markup(markup))
        }
    }
}

/// Run one render pass of `id`. Unmounted renderers are skipped.
pub fn render(id: RendererId) -> Result<()> {
    let pass = with_renderer_mut(id, |r| {
        r.mode?;
        r.render_count += 1;
        Some((r.component, r.content.clone(), r.children.clone()))
    })?;
    let Some((component, content, delegated)) = pass else {
        return Ok(());
    };

    let _guard = StackGuard::push(id);
    log::debug!("[render] {:?} of {:?} (depth {})", id, component, render_depth());

    if !delegated.is_empty() {
        for child in delegated {
            render_component(child)?;
        }
        return Ok(());
    }

    match resolve(component, content(component)?)? {
        Resolved::Markup(markup) => write(id, markup.trim()),
        Resolved::Children(ids) => mount_children(id, component, ids),
    }
}

fn mount_children(id: RendererId, component: ComponentId, ids: Vec<ComponentId>) -> Result<()> {
    let target = with_renderer(id, |r| match r.mode {
        Some(MountMode::Fragment) => r.mount_parent,
        _ => r.mount_element,
    })?;
    let Some(target) = target else {
        return Ok(());
    };
    for child in &ids {
        mount_component(*child, Some(component), target, None)?;
    }
    with_renderer_mut(id, |r| r.children = ids.clone())?;
    for child in ids {
        render_component(child)?;
    }
    Ok(())
}

/// Write markup to the renderer's mount point.
///
/// Fragment output is reconciled into the component's element: it replaces
/// the element's content only when it differs and is non-empty. Anchored
/// fragments only rewrite their own markup node.
fn write(id: RendererId, markup: &str) -> Result<()> {
    let (component, mode, element, parent, anchored, last) = with_renderer(id, |r| {
        (r.component, r.mode, r.mount_element, r.mount_parent, r.anchored, r.last_markup.clone())
    })?;
    let Some(element) = element else {
        return Ok(());
    };

    match mode {
        Some(MountMode::Element) | Some(MountMode::Isolated) => {
            with_host(|host| host.set_inner_markup(element, markup));
        }
        Some(MountMode::Fragment) if anchored => {
            with_host(|host| host.set_inner_markup(element, markup));
        }
        Some(MountMode::Fragment) => {
            with_host(|host| host.set_inner_markup(element, markup));
            let Some(parent) = parent else {
                return Ok(());
            };
            let current = with_host(|host| host.inner_markup(parent));
            if current != markup && !markup.is_empty() {
                let own_output = last.as_deref() == Some(current.as_str());
                let raw_html = class_of(component).map(|c| c.raw_html()).unwrap_or(false);
                if !current.is_empty() && !own_output && !raw_html && config().warn_on_content_drift {
                    log::warn!(
                        "content `{current}` will be replaced with `{markup}`; \
                         give the component a content_tag to render next to existing content"
                    );
                }
                with_host(|host| host.set_inner_markup(parent, markup));
            }
        }
        None => return Ok(()),
    }

    with_renderer_mut(id, |r| r.last_markup = Some(markup.to_string()))
}

/// Clear the renderer arena and both stacks (for testing).
pub fn reset_renderers() {
    RENDERERS.with(|renderers| renderers.borrow_mut().clear());
    RENDER_STACK.with(|stack| stack.borrow_mut().clear());
    RERENDER_STACK.with(|stack| stack.borrow_mut().clear());
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::engine::{state, Args, ComponentClass};
    use crate::host::body;
    use crate::pipeline::{mount, mount_renderer};
    use crate::reset_runtime;

    fn counter() -> Rc<ComponentClass> {
        ComponentClass::builder("Counter")
            .tag("button")
            .field("count", state().with_default(0))
            .field("label", state().with_default("Count"))
            .content(|id| Ok(format!("{}: {}", id.get_str("label")?, id.get_int("count")?).into()))
            .build()
            .unwrap()
    }

    fn only_renderer(id: ComponentId) -> RendererId {
        let renderers = renderers_of(id);
        assert_eq!(renderers.len(), 1);
        renderers[0]
    }

    #[test]
    fn test_render_registers_dependents() {
        reset_runtime();
        let id = counter().instantiate().unwrap();
        mount(id, body().unwrap()).unwrap();

        let r = only_renderer(id);
        assert_eq!(render_count(r), 1);
        assert_eq!(dependents(id, "count"), vec![r]);
        assert_eq!(dependents(id, "label"), vec![r]);
        assert_eq!(current_renderer(), None);
        assert_eq!(render_depth(), 0);
    }

    #[test]
    fn test_write_rerenders_once() {
        reset_runtime();
        let id = counter().instantiate().unwrap();
        mount(id, body().unwrap()).unwrap();
        let r = only_renderer(id);

        id.set("count", 1).unwrap();
        assert_eq!(render_count(r), 2);
        // same value: no pass
        id.set("count", 1).unwrap();
        assert_eq!(render_count(r), 2);
        // reading repeatedly does not register twice
        assert_eq!(dependents(id, "count").len(), 1);

        let element = crate::engine::element(id).unwrap();
        let markup = with_host(|host| host.inner_markup(element));
        assert_eq!(markup, "Count: 1");
    }

    #[test]
    fn test_unread_fields_do_not_rerender() {
        reset_runtime();
        let class = ComponentClass::builder("Partial")
            .field("shown", state().with_default("a"))
            .field("hidden", state().with_default("b"))
            .content(|id| Ok(id.get_str("shown")?.into()))
            .build()
            .unwrap();
        let id = class.instantiate().unwrap();
        mount(id, body().unwrap()).unwrap();
        let r = only_renderer(id);

        id.set("hidden", "c").unwrap();
        assert_eq!(render_count(r), 1);
        id.set("shown", "d").unwrap();
        assert_eq!(render_count(r), 2);
    }

    #[test]
    fn test_self_write_does_not_loop() {
        reset_runtime();
        let class = ComponentClass::builder("Looping")
            .field("n", state().with_default(0))
            .content(|id| {
                let n = id.get_int("n")?;
                id.set("n", n + 1)?;
                Ok(Render::text(n))
            })
            .build()
            .unwrap();
        let id = class.instantiate().unwrap();
        mount(id, body().unwrap()).unwrap();
        let r = only_renderer(id);
        assert_eq!(render_count(r), 1);
        assert_eq!(id.peek("n").unwrap().as_int(), Some(1));
        assert_eq!(render_depth(), 0);
    }

    #[test]
    fn test_non_renderable_content() {
        reset_runtime();
        let class = ComponentClass::builder("Selfish")
            .content(|id| Ok(Render::Children(vec![id])))
            .build()
            .unwrap();
        let id = class.instantiate().unwrap();
        let err = mount(id, body().unwrap()).unwrap_err();
        assert!(matches!(err, WebError::NotRenderable { .. }));
        assert_eq!(render_depth(), 0);
    }

    #[test]
    fn test_children_content_delegates() {
        reset_runtime();
        let item = ComponentClass::builder("Item")
            .tag("li")
            .field("n", state().with_default(0))
            .content(|id| Ok(Render::text(id.get_int("n")?)))
            .build()
            .unwrap();
        let a = item.instantiate().unwrap();
        let b = item.instantiate().unwrap();
        let list = ComponentClass::builder("List")
            .tag("ul")
            .content(move |_| Ok(vec![a, b].into()))
            .build()
            .unwrap();
        let id = list.instantiate().unwrap();
        mount(id, body().unwrap()).unwrap();

        let r = only_renderer(id);
        assert_eq!(renderer_children(r), vec![a, b]);
        assert_eq!(a.parent(), Some(id));

        let ul = crate::engine::element(id).unwrap();
        let markup = with_host(|host| host.inner_markup(ul));
        assert_eq!(markup, "<li>0</li><li>0</li>");

        // child writes re-render the child only
        b.set("n", 7).unwrap();
        assert_eq!(render_count(r), 1);
        let markup = with_host(|host| host.inner_markup(ul));
        assert_eq!(markup, "<li>0</li><li>7</li>");
    }

    #[test]
    fn test_mixed_content_uses_static_markup() {
        reset_runtime();
        let badge = ComponentClass::builder("Badge").tag("b").build().unwrap();
        let inner = badge.create(Args::with_text("new")).unwrap();
        let class = ComponentClass::builder("Title")
            .content_tag("h1")
            .content(move |_| Ok(vec![Piece::from("Hello "), Piece::from(inner)].into()))
            .build()
            .unwrap();
        let id = class.instantiate().unwrap();
        mount(id, body().unwrap()).unwrap();
        let r = only_renderer(id);
        assert_eq!(mount_mode(r), Some(MountMode::Element));
        let h1 = mount_element(r).unwrap();
        let markup = with_host(|host| host.inner_markup(h1));
        assert_eq!(markup, "Hello <b>new</b>");
    }

    #[test]
    fn test_destroy_prunes_dependents() {
        reset_runtime();
        let id = counter().instantiate().unwrap();
        mount(id, body().unwrap()).unwrap();
        let r = only_renderer(id);
        crate::pipeline::unmount_renderer(r).unwrap();
        destroy_renderer(r).unwrap();
        assert!(dependents(id, "count").is_empty());
        assert!(renderers_of(id).is_empty());
        assert!(matches!(destroy_renderer(r), Err(WebError::UnknownRenderer(_))));
    }

    #[test]
    fn test_unmounted_renderer_is_skipped() {
        reset_runtime();
        let id = counter().instantiate().unwrap();
        let r = create_renderer(id, Rc::new(|_| Ok(Render::text("x")))).unwrap();
        render(r).unwrap();
        assert_eq!(render_count(r), 0);

        crate::pipeline::mount_component(id, None, body().unwrap(), None).unwrap();
        let element = crate::engine::element(id).unwrap();
        mount_renderer(r, element, None).unwrap();
        render(r).unwrap();
        assert_eq!(render_count(r), 1);
    }

    // =========================================================================
    // Fragment drift
    // =========================================================================

    struct CaptureWarnings;

    thread_local! {
        static WARNINGS: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
    }

    impl log::Log for CaptureWarnings {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            metadata.level() <= log::Level::Warn
        }

        fn log(&self, record: &log::Record) {
            if record.level() == log::Level::Warn {
                WARNINGS.with(|w| w.borrow_mut().push(record.args().to_string()));
            }
        }

        fn flush(&self) {}
    }

    static CAPTURE: CaptureWarnings = CaptureWarnings;

    /// Install the capturing logger and drop warnings seen so far.
    fn capture_warnings() {
        let _ = log::set_logger(&CAPTURE);
        log::set_max_level(log::LevelFilter::Warn);
        WARNINGS.with(|w| w.borrow_mut().clear());
    }

    fn take_warnings() -> Vec<String> {
        WARNINGS.with(|w| std::mem::take(&mut *w.borrow_mut()))
    }

    fn label(raw_html: bool) -> ComponentId {
        let mut builder = ComponentClass::builder("Label")
            .tag("label")
            .field("text", state().with_default("a"))
            .content(|id| Ok(id.get_str("text")?.into()));
        if raw_html {
            builder = builder.raw_html();
        }
        let id = builder.build().unwrap().instantiate().unwrap();
        mount(id, body().unwrap()).unwrap();
        assert_eq!(mount_mode(only_renderer(id)), Some(MountMode::Fragment));
        id
    }

    fn markup(node: NodeId) -> String {
        with_host(|host| host.inner_markup(node))
    }

    #[test]
    fn test_fragment_replaces_own_output_silently() {
        reset_runtime();
        capture_warnings();
        let id = label(false);
        let element = crate::engine::element(id).unwrap();
        assert_eq!(markup(element), "a");

        id.set("text", "b").unwrap();
        assert_eq!(markup(element), "b");
        assert!(take_warnings().is_empty());
    }

    #[test]
    fn test_fragment_empty_output_keeps_parent() {
        reset_runtime();
        capture_warnings();
        let id = label(false);
        let element = crate::engine::element(id).unwrap();

        id.set("text", "").unwrap();
        assert_eq!(render_count(only_renderer(id)), 2);
        assert_eq!(markup(element), "a");
        assert!(take_warnings().is_empty());
    }

    #[test]
    fn test_fragment_equal_content_is_left_alone() {
        reset_runtime();
        capture_warnings();
        let id = label(false);
        let element = crate::engine::element(id).unwrap();

        with_host(|host| host.set_inner_markup(element, "c"));
        id.set("text", "c").unwrap();
        assert_eq!(markup(element), "c");
        assert!(take_warnings().is_empty());
    }

    #[test]
    fn test_fragment_warns_when_replacing_foreign_content() {
        reset_runtime();
        capture_warnings();
        let id = label(false);
        let element = crate::engine::element(id).unwrap();

        with_host(|host| host.set_inner_markup(element, "typed"));
        id.set("text", "b").unwrap();
        assert_eq!(markup(element), "b");
        let warnings = take_warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("typed"));
    }

    #[test]
    fn test_fragment_warning_suppressed() {
        reset_runtime();
        capture_warnings();
        let raw = label(true);
        let element = crate::engine::element(raw).unwrap();
        with_host(|host| host.set_inner_markup(element, "typed"));
        raw.set("text", "b").unwrap();
        assert_eq!(markup(element), "b");
        assert!(take_warnings().is_empty());

        reset_runtime();
        crate::config::set_config(crate::config::RuntimeConfig {
            warn_on_content_drift: false,
            ..Default::default()
        });
        let quiet = label(false);
        let element = crate::engine::element(quiet).unwrap();
        with_host(|host| host.set_inner_markup(element, "typed"));
        quiet.set("text", "b").unwrap();
        assert_eq!(markup(element), "b");
        assert!(take_warnings().is_empty());
    }
}
