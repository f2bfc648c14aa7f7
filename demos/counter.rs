//! Counter Demo - One reactive field, one click handler
//!
//! This demo shows the smallest reactive loop:
//! - A `count` state field read by the content function
//! - A click handler writing the field
//! - Exactly one render pass per write
//!
//! Run with: RUST_LOG=debug cargo run --example counter

use spark_web::{
    body, dispatch, element, init_logging, mount, render_count, renderers_of, state, with_document,
    ComponentClass, HostEvent, Result,
};

fn main() -> Result<()> {
    init_logging();

    println!("=== spark-web Counter Demo ===\n");

    let counter = ComponentClass::builder("Counter")
        .tag("button")
        .field("count", state().with_default(0))
        .on("click", |id, _| id.set("count", id.get_int("count")? + 1))
        .content(|id| Ok(format!("Count: {}", id.get_int("count")?).into()))
        .build()?;

    let id = counter.instantiate()?;
    let Some(body) = body() else {
        return Ok(());
    };
    mount(id, body)?;

    let button = element(id).unwrap_or(body);
    let renderer = renderers_of(id)[0];

    for click in 1..=3 {
        dispatch(button, HostEvent::new("click"))?;
        let html = with_document(|doc| doc.outer_markup(body)).unwrap_or_default();
        println!("click {click}: {html}  (renders: {})", render_count(renderer));
    }

    println!("\n=== Demo Complete ===");
    Ok(())
}
