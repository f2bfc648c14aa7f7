//! End-to-end scenarios for the component runtime.
//!
//! Each test drives the public API only: declare classes, mount into the
//! in-memory document, then interact through host events and field writes.
//!
//! Run with: cargo test --test scenarios

use spark_web::pipeline::renderer_count;
use spark_web::*;

// =============================================================================
// HELPERS
// =============================================================================

fn markup(node: NodeId) -> String {
    with_host(|h| h.inner_markup(node))
}

fn counter_class() -> std::rc::Rc<ComponentClass> {
    ComponentClass::builder("Counter")
        .tag("button")
        .field("count", state().with_default(0))
        .on("click", |id, _| id.set("count", id.get_int("count")? + 1))
        .content(|id| Ok(format!("Count: {}", id.get_int("count")?).into()))
        .build()
        .unwrap()
}

// =============================================================================
// COUNTER
// =============================================================================

#[test]
fn test_counter_three_clicks() {
    reset_runtime();
    let counter = counter_class().instantiate().unwrap();
    mount(counter, body().unwrap()).unwrap();

    let button = element(counter).unwrap();
    let renderer = renderers_of(counter)[0];
    let before = render_count(renderer);

    for _ in 0..3 {
        assert!(dispatch(button, HostEvent::new("click")).unwrap());
    }

    assert_eq!(markup(button), "Count: 3");
    assert_eq!(render_count(renderer), before + 3);
}

#[test]
fn test_same_value_write_is_silent() {
    reset_runtime();
    let counter = counter_class().instantiate().unwrap();
    mount(counter, body().unwrap()).unwrap();
    let renderer = renderers_of(counter)[0];

    counter.set("count", 0).unwrap();
    assert_eq!(render_count(renderer), 1);
    assert_eq!(dependents(counter, "count"), vec![renderer]);
}

// =============================================================================
// TODO LIST
// =============================================================================

#[test]
fn test_todo_append_rerenders_summary_once() {
    reset_runtime();
    let todo = ComponentClass::builder("Todo")
        .tag("li")
        .field("completed", attr().with_default(false))
        .build()
        .unwrap();
    let seed = todo.create(Args::with_text("first").kw("completed", true)).unwrap();
    let todo_list = ComponentClass::builder("TodoList")
        .tag("ul")
        .content_tag("p")
        .children("todos", vec![seed])
        .content(|id| {
            let mut completed = 0;
            for todo in id.children("todos")? {
                if todo.get_bool("completed")? {
                    completed += 1;
                }
            }
            Ok(format!("{completed} completed").into())
        })
        .build()
        .unwrap();

    let list = todo_list.instantiate().unwrap();
    let body = body().unwrap();
    mount(list, body).unwrap();
    assert_eq!(markup(body), "<ul><p>1 completed</p><li completed>first</li></ul>");

    let summary = renderers_of(list)[0];
    let before = render_count(summary);

    let second = todo.create(Args::with_text("second")).unwrap();
    list.append_child("todos", second).unwrap();

    assert_eq!(children_len(list, "todos").unwrap(), 2);
    let todos = list.children("todos").unwrap();
    assert_eq!(todos[1], second);
    assert_eq!(second.parent(), Some(list));
    assert_eq!(second.position(), Some(1));
    assert_eq!(render_count(summary), before + 1);
    assert_eq!(
        markup(body),
        "<ul><p>1 completed</p><li completed>first</li><li>second</li></ul>"
    );

    // the summary read the new todo's field on its last pass
    second.set("completed", true).unwrap();
    assert_eq!(render_count(summary), before + 2);
    assert_eq!(markup(body), "<ul><p>2 completed</p><li completed>first</li><li completed>second</li></ul>");
}

#[test]
fn test_removed_child_keeps_order() {
    reset_runtime();
    let item = ComponentClass::builder("Item").tag("li").build().unwrap();
    let templates = ["a", "b", "c"]
        .into_iter()
        .map(|t| item.create(Args::with_text(t)).unwrap())
        .collect();
    let list = ComponentClass::builder("Items")
        .tag("ol")
        .children("items", templates)
        .build()
        .unwrap()
        .instantiate()
        .unwrap();
    let body = body().unwrap();
    mount(list, body).unwrap();

    let middle = list.children("items").unwrap()[1];
    assert!(list.remove_child("items", middle).unwrap());

    let remaining = list.children("items").unwrap();
    assert_eq!(remaining.len(), 2);
    assert!(!remaining.contains(&middle));
    assert_eq!(remaining.iter().map(|id| id.position()).collect::<Vec<_>>(), vec![Some(0), Some(1)]);
    assert_eq!(markup(body), "<ol><li>a</li><li>c</li></ol>");
}

// =============================================================================
// ISOLATED SUBTREES
// =============================================================================

#[test]
fn test_isolated_root_created_once() {
    reset_runtime();
    let panel = ComponentClass::builder("Panel")
        .tag("section")
        .field("title", state().with_default("Inbox"))
        .content(|id| Ok(id.get_str("title")?.into()))
        .build()
        .unwrap()
        .instantiate()
        .unwrap();
    mount(panel, body().unwrap()).unwrap();
    assert_eq!(with_document(|d| d.shadow_roots_created()), Some(1));

    let section = element(panel).unwrap();
    let first = renderers_of(panel)[0];
    let second = create_renderer(panel, std::rc::Rc::new(|_| Ok("footer".into()))).unwrap();
    mount_renderer(second, section, None).unwrap();

    assert_eq!(with_document(|d| d.shadow_roots_created()), Some(1));
    assert_eq!(pipeline::mount_element(first), pipeline::mount_element(second));
    assert_eq!(pipeline::mount_mode(second), Some(MountMode::Isolated));
}

// =============================================================================
// CONSTRUCTION ERRORS
// =============================================================================

#[test]
fn test_required_field_fails_before_render() {
    reset_runtime();
    let class = ComponentClass::builder("Avatar")
        .tag("img")
        .field("src", attr().required())
        .content(|_| panic!("content must not run"))
        .build()
        .unwrap();

    let err = class.instantiate().unwrap_err();
    assert!(matches!(err, WebError::MissingRequired { ref field, .. } if field == "src"));
    assert_eq!(renderer_count(), 0);
    assert_eq!(component_count(), 0);
}

// =============================================================================
// INHERITANCE
// =============================================================================

#[test]
fn test_overridden_default_is_still_a_field() {
    reset_runtime();
    let button = ComponentClass::builder("Button")
        .tag("button")
        .field("kind", attr().with_default("button").one_of(["submit", "reset", "button"]))
        .content(|id| Ok(id.get_str("kind")?.into()))
        .build()
        .unwrap();
    let submit = ComponentClass::builder("SubmitButton")
        .extends(&button)
        .value("kind", "submit")
        .build()
        .unwrap();

    let id = submit.instantiate().unwrap();
    mount(id, body().unwrap()).unwrap();
    let element = element(id).unwrap();
    assert_eq!(markup(element), "submit");
    assert_eq!(with_host(|h| h.attribute(element, "kind")).as_deref(), Some("submit"));

    id.set("kind", "reset").unwrap();
    assert_eq!(markup(element), "reset");
    assert!(id.set("kind", "link").unwrap_err().is_validation());
    assert_eq!(id.get_str("kind").unwrap(), "reset");
}

#[test]
fn test_single_child_copies_are_independent() {
    reset_runtime();
    let badge = ComponentClass::builder("Badge")
        .tag("span")
        .field("count", state().with_default(0))
        .build()
        .unwrap();
    let card = ComponentClass::builder("Card")
        .child("badge", badge.instantiate().unwrap())
        .build()
        .unwrap();

    let a = card.instantiate().unwrap();
    let b = card.instantiate().unwrap();
    a.child("badge").unwrap().set("count", 9).unwrap();

    assert_eq!(b.child("badge").unwrap().get_int("count").unwrap(), 0);
    assert_eq!(a.child("badge").unwrap().get_int("count").unwrap(), 9);
}
