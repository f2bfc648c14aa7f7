//! Todos Demo - List slots, attribute reflection, dependency tracking
//!
//! This demo demonstrates:
//! - A class-level template list cloned per owning instance
//! - Appending to the list and toggling items
//! - A summary renderer that re-renders only when its inputs change
//!
//! Run with: RUST_LOG=debug cargo run --example todos

use spark_web::{
    attr, body, dispatch, element, init_logging, mount, render_count, renderers_of, with_document, Args,
    ComponentClass, ComponentId, HostEvent, NodeId, Result,
};

fn print_tree(label: &str, body: NodeId, summary_renders: usize) {
    let html = with_document(|doc| doc.outer_markup(body)).unwrap_or_default();
    println!("{label:<16} {html}");
    println!("{:<16} summary renders: {summary_renders}\n", "");
}

fn main() -> Result<()> {
    init_logging();

    println!("=== spark-web Todos Demo ===\n");

    let todo = ComponentClass::builder("Todo")
        .tag("li")
        .field("completed", attr().with_default(false))
        .on("click", |id, _| id.set("completed", !id.get_bool("completed")?))
        .build()?;

    let todo_list = ComponentClass::builder("TodoList")
        .tag("ul")
        .content_tag("p")
        .children("todos", vec![todo.create(Args::with_text("Write the runtime"))?])
        .content(|id| {
            let todos = id.children("todos")?;
            let mut completed = 0;
            for todo in &todos {
                if todo.get_bool("completed")? {
                    completed += 1;
                }
            }
            Ok(format!("{completed} of {} completed", todos.len()).into())
        })
        .build()?;

    let list = todo_list.instantiate()?;
    let Some(body) = body() else {
        return Ok(());
    };
    mount(list, body)?;
    let summary = renderers_of(list)[0];
    print_tree("mounted:", body, render_count(summary));

    list.append_child("todos", todo.create(Args::with_text("Write the tests"))?)?;
    print_tree("appended:", body, render_count(summary));

    let todos: Vec<ComponentId> = list.children("todos")?;
    for todo in &todos {
        if let Some(li) = element(*todo) {
            dispatch(li, HostEvent::new("click"))?;
        }
    }
    print_tree("all clicked:", body, render_count(summary));

    println!("=== Demo Complete ===");
    Ok(())
}
