//! Todo-list store shared by the integration tests

#![allow(dead_code)]

use reflux_core::{Action, BoxError, Reducers, Selector, Store};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoItem {
    pub id: u32,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TodoListState {
    pub todo_list: Vec<TodoItem>,
    pub current_user: Option<String>,
    pub useless_property: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AddTodoItem {
    pub item: TodoItem,
}
impl Action for AddTodoItem {}

#[derive(Debug, Clone)]
pub struct SwitchUser {
    pub name: String,
}
impl Action for SwitchUser {}

/// Adds an item and switches user in one transition
#[derive(Debug, Clone)]
pub struct AddTodoItemAs {
    pub item: TodoItem,
    pub user: String,
}
impl Action for AddTodoItemAs {}

/// Rejected by the reducer when the title is empty
#[derive(Debug, Clone)]
pub struct RenameTodoItem {
    pub id: u32,
    pub title: String,
}
impl Action for RenameTodoItem {}

/// Handled by no reducer
#[derive(Debug, Clone)]
pub struct Unhandled;
impl Action for Unhandled {}

pub fn item(id: u32, title: &str) -> TodoItem {
    TodoItem {
        id,
        title: title.to_string(),
    }
}

pub fn reducers() -> Reducers<TodoListState> {
    Reducers::new()
        .on(|state: &TodoListState, action: &AddTodoItem| {
            let mut todo_list = state.todo_list.clone();
            todo_list.push(action.item.clone());
            TodoListState {
                todo_list,
                ..state.clone()
            }
        })
        .on(|state: &TodoListState, action: &SwitchUser| TodoListState {
            current_user: Some(action.name.clone()),
            ..state.clone()
        })
        .on(|state: &TodoListState, action: &AddTodoItemAs| {
            let mut todo_list = state.todo_list.clone();
            todo_list.push(action.item.clone());
            TodoListState {
                todo_list,
                current_user: Some(action.user.clone()),
                ..state.clone()
            }
        })
        .try_on(|state: &TodoListState, action: &RenameTodoItem| {
            if action.title.is_empty() {
                return Err(BoxError::from("empty title"));
            }
            let todo_list = state
                .todo_list
                .iter()
                .map(|item| {
                    if item.id == action.id {
                        TodoItem {
                            title: action.title.clone(),
                            ..item.clone()
                        }
                    } else {
                        item.clone()
                    }
                })
                .collect();
            Ok(TodoListState {
                todo_list,
                ..state.clone()
            })
        })
}

pub fn create_store() -> Store<TodoListState> {
    Store::new(reducers(), TodoListState::default())
}

pub fn select_todo_list() -> Selector<TodoListState, Vec<TodoItem>> {
    Selector::new(|state: &TodoListState| state.todo_list.clone())
}

pub fn select_current_user() -> Selector<TodoListState, Option<String>> {
    Selector::new(|state: &TodoListState| state.current_user.clone())
}

pub fn select_useless_property() -> Selector<TodoListState, Option<String>> {
    Selector::new(|state: &TodoListState| state.useless_property.clone())
}

pub fn add_todo_item(store: &Store<TodoListState>, id: u32, title: &str) {
    store
        .dispatch(AddTodoItem {
            item: item(id, title),
        })
        .unwrap();
}

pub fn switch_user(store: &Store<TodoListState>, name: &str) {
    store
        .dispatch(SwitchUser {
            name: name.to_string(),
        })
        .unwrap();
}

/// Three items and one user switch; the last action is an `AddTodoItem`
pub fn dispatch_all_actions(store: &Store<TodoListState>) {
    add_todo_item(store, 1, "Create unit tests");
    add_todo_item(store, 2, "Create Models");
    switch_user(store, "Emily");
    add_todo_item(store, 3, "Refactor tests");
}

/// Thread-safe collector for subscriber callbacks
pub struct Recorder<T> {
    values: Arc<Mutex<Vec<T>>>,
}

impl<T> Clone for Recorder<T> {
    fn clone(&self) -> Self {
        Self {
            values: Arc::clone(&self.values),
        }
    }
}

impl<T: Clone + Send + 'static> Recorder<T> {
    pub fn new() -> Self {
        Self {
            values: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn sink(&self) -> impl FnMut(T) + Send + 'static {
        let values = Arc::clone(&self.values);
        move |value| values.lock().push(value)
    }

    pub fn count(&self) -> usize {
        self.values.lock().len()
    }

    pub fn values(&self) -> Vec<T> {
        self.values.lock().clone()
    }

    pub fn last(&self) -> Option<T> {
        self.values.lock().last().cloned()
    }
}
