//! Todo list demo binary
//!
//! Runs a short scripted session against a store with logging middleware.
//! Set `RUST_LOG=statecell_runtime=trace` to see every dispatch.

use statecell_runtime::{Store, apply_middleware, bind_action_creator, create_store_with, middleware};
use todo_list::{AppState, Visibility, add_todo, all_todos, app_reducer, set_visibility, toggle_todo, visible_todos};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todo_list=info,statecell_runtime=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Todo List: statecell demo ===\n");

    let store: Store<AppState> = create_store_with(
        app_reducer(),
        None,
        apply_middleware(vec![middleware::logging()]),
    )?;

    let _unsubscribe = store.subscribe({
        let store = store.downgrade();
        move || {
            if let Some(Ok(state)) = store.upgrade().map(|store| store.get_state()) {
                tracing::info!(
                    total = all_todos(&state).len(),
                    visible = visible_todos(&state).len(),
                    "State updated"
                );
            }
        }
    })?;

    let add = bind_action_creator(add_todo(), store.dispatcher());
    let toggle = bind_action_creator(toggle_todo(), store.dispatcher());
    let show = bind_action_creator(set_visibility(), store.dispatcher());

    println!(">>> Adding three todos");
    add.call("Buy milk".to_string())?;
    add.call("Write docs".to_string())?;
    add.call("Ship release".to_string())?;

    println!(">>> Completing \"Buy milk\"");
    toggle.call(0)?;

    println!(">>> Showing active todos only");
    show.call(Visibility::Active)?;

    let state = store.get_state()?;
    println!("\nVisible todos:");
    for item in visible_todos(&state) {
        println!("  [{}] {}", item.id, item.text);
    }

    println!("\n=== Done ===");
    Ok(())
}
