//! Todo List Example
//!
//! Demonstrates a reflux store with reducers, selectors, effects, router
//! state and devtools export. Set `RUST_LOG` to change the log output.

use reflux_core::{Action, BoxError, Effect, Reducers, Selector, Store};
use reflux_devtools::{ExportFormat, Exporter, Inspector};
use reflux_router::{
    router_reducers, HasRouter, NavigationEvent, NavigationListener, RouterBridge, RouterState,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq, Serialize)]
struct TodoItem {
    id: u32,
    title: String,
    done: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
struct AppState {
    todos: Vec<TodoItem>,
    current_user: Option<String>,
    next_id: u32,
    router: RouterState,
}

impl HasRouter for AppState {
    fn router(&self) -> &RouterState {
        &self.router
    }

    fn with_router(&self, router: RouterState) -> Self {
        Self {
            router,
            ..self.clone()
        }
    }
}

#[derive(Debug)]
struct AddTodo {
    title: String,
}
impl Action for AddTodo {}

#[derive(Debug)]
struct CompleteTodo {
    id: u32,
}
impl Action for CompleteTodo {}

#[derive(Debug)]
struct SwitchUser {
    name: String,
}
impl Action for SwitchUser {}

fn reducers() -> Reducers<AppState> {
    Reducers::new()
        .on(|state: &AppState, action: &AddTodo| {
            let mut todos = state.todos.clone();
            todos.push(TodoItem {
                id: state.next_id,
                title: action.title.clone(),
                done: false,
            });
            AppState {
                todos,
                next_id: state.next_id + 1,
                ..state.clone()
            }
        })
        .try_on(|state: &AppState, action: &CompleteTodo| {
            if !state.todos.iter().any(|todo| todo.id == action.id) {
                return Err(BoxError::from(format!("no todo with id {}", action.id)));
            }
            let todos = state
                .todos
                .iter()
                .map(|todo| TodoItem {
                    done: todo.done || todo.id == action.id,
                    ..todo.clone()
                })
                .collect();
            Ok(AppState {
                todos,
                ..state.clone()
            })
        })
        .on(|state: &AppState, action: &SwitchUser| AppState {
            current_user: Some(action.name.clone()),
            ..state.clone()
        })
        .merge(router_reducers())
}

fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("reflux_core=debug,reflux_router=debug")),
        )
        .init();

    println!("=== Reflux Todo List Example ===\n");

    let store = Store::new(reducers(), AppState::default());

    // Derived views
    let open_count = Selector::new(|state: &AppState| {
        state.todos.iter().filter(|todo| !todo.done).count()
    });
    let user = Selector::new(|state: &AppState| state.current_user.clone());
    let summary = Selector::combine2(&open_count, &user, |open, user| {
        format!(
            "{} open for {}",
            open,
            user.as_deref().unwrap_or("nobody")
        )
    });

    let _summary = store.select(&summary).subscribe(|line| println!("  [view] {}", line));

    // Greets every new user with a starter todo
    store.register_effects([
        Effect::dispatching("welcome", |store: &Store<AppState>| {
            store.observe::<SwitchUser>().map(|action| AddTodo {
                title: format!("Say hello to {}", action.name),
            })
        }),
        Effect::non_dispatching("audit", |store: &Store<AppState>| {
            store
                .observe_action()
                .inspect(|action| tracing::info!(tag = action.tag(), "audit"))
        }),
    ])?;

    let bridge = RouterBridge::new(&store);
    bridge.on_navigating(NavigationEvent::new("/todos"))?;
    bridge.on_navigated(NavigationEvent::new("/todos"))?;

    println!("\nDispatching actions...\n");
    store.dispatch(AddTodo {
        title: "Create unit tests".into(),
    })?;
    store.dispatch(AddTodo {
        title: "Create Models".into(),
    })?;
    store.dispatch(SwitchUser {
        name: "Emily".into(),
    })?;
    store.dispatch(CompleteTodo { id: 0 })?;

    if let Err(error) = store.dispatch(CompleteTodo { id: 42 }) {
        println!("  rejected: {}", error);
    }

    let state = store.state();
    println!("\nFinal state on {:?}:", state.router.current_path());
    for todo in &state.todos {
        println!(
            "  [{}] #{} {}",
            if todo.done { "x" } else { " " },
            todo.id,
            todo.title
        );
    }

    println!("\nTime travel...\n");
    let mut inspector = Inspector::new(store.clone())?;
    inspector.step_backward()?;
    inspector.goto(3)?;
    println!("  showing seq {}", inspector.current_seq());
    inspector.fast_forward()?;

    let history = inspector.history();
    println!("\n{}", Exporter::new(&history).export(ExportFormat::Text)?);

    Ok(())
}
