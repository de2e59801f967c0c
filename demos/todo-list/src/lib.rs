//! Todo list demo built on statecell.
//!
//! The application state is a [`CombinedState`] of two JSON slices:
//!
//! - `todos`: an array of [`TodoItem`]
//! - `visibility`: the active [`Visibility`] filter
//!
//! Each slice reducer leaves its `Arc` untouched for actions it does not
//! handle, so the combined reducer reports "no change" for foreign actions.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use statecell_core::{Action, CombinedReducer, CombinedState, SliceReducer, combine_reducers, slice};
use statecell_runtime::{ActionCreator, action_creator};
use std::sync::Arc;

/// Add a todo; carries `text`
pub const ADD_TODO: &str = "todos/add";
/// Flip a todo's completion; carries `id`
pub const TOGGLE_TODO: &str = "todos/toggle";
/// Change the visibility filter; carries `filter`
pub const SET_VISIBILITY: &str = "visibility/set";

/// Application state
pub type AppState = CombinedState<Value>;

/// One entry of the list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Stable identifier, assigned on creation
    pub id: u64,
    /// What to do
    pub text: String,
    /// Whether it is done
    pub completed: bool,
}

/// Which todos to show
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Everything
    #[default]
    All,
    /// Not yet completed
    Active,
    /// Completed only
    Completed,
}

impl Visibility {
    /// The serialized name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }

    const fn admits(self, item: &TodoItem) -> bool {
        match self {
            Self::All => true,
            Self::Active => !item.completed,
            Self::Completed => item.completed,
        }
    }
}

fn decode<T: serde::de::DeserializeOwned + Default>(value: Option<&Arc<Value>>) -> T {
    value
        .and_then(|value| serde_json::from_value(Value::clone(value)).ok())
        .unwrap_or_default()
}

fn apply_todo_action(items: &[TodoItem], action: &Action) -> Option<Vec<TodoItem>> {
    let mut next = items.to_vec();
    match action.action_type() {
        ADD_TODO => {
            let text = action.get("text")?.as_str()?;
            let id = items.iter().map(|item| item.id + 1).max().unwrap_or(0);
            next.push(TodoItem {
                id,
                text: text.to_string(),
                completed: false,
            });
        }
        TOGGLE_TODO => {
            let id = action.get("id")?.as_u64()?;
            let item = next.iter_mut().find(|item| item.id == id)?;
            item.completed = !item.completed;
        }
        _ => return None,
    }
    Some(next)
}

/// Slice reducer for the todo list.
#[must_use]
pub fn todos() -> SliceReducer<Value> {
    slice(|state: Option<&Arc<Value>>, action: &Action| {
        let Some(current) = state else {
            return Some(Arc::new(Value::Array(Vec::new())));
        };
        if !matches!(action.action_type(), ADD_TODO | TOGGLE_TODO) {
            return Some(Arc::clone(current));
        }

        let items: Vec<TodoItem> = decode(Some(current));
        match apply_todo_action(&items, action) {
            Some(next) => serde_json::to_value(next).ok().map(Arc::new),
            None => Some(Arc::clone(current)),
        }
    })
}

/// Slice reducer for the visibility filter.
#[must_use]
pub fn visibility() -> SliceReducer<Value> {
    slice(|state: Option<&Arc<Value>>, action: &Action| {
        if action.action_type() == SET_VISIBILITY {
            let requested = action
                .get("filter")
                .and_then(|filter| serde_json::from_value::<Visibility>(filter.clone()).ok());
            if let Some(filter) = requested {
                return Some(Arc::new(Value::from(filter.as_str())));
            }
        }

        Some(
            state
                .cloned()
                .unwrap_or_else(|| Arc::new(Value::from(Visibility::default().as_str()))),
        )
    })
}

/// The application's root reducer
#[must_use]
pub fn app_reducer() -> CombinedReducer<Value> {
    combine_reducers([("todos", todos()), ("visibility", visibility())])
}

/// Creates [`ADD_TODO`] actions
#[must_use]
pub fn add_todo() -> ActionCreator<String> {
    action_creator(|text: String| Action::new(ADD_TODO).with("text", text))
}

/// Creates [`TOGGLE_TODO`] actions
#[must_use]
pub fn toggle_todo() -> ActionCreator<u64> {
    action_creator(|id: u64| Action::new(TOGGLE_TODO).with("id", id))
}

/// Creates [`SET_VISIBILITY`] actions
#[must_use]
pub fn set_visibility() -> ActionCreator<Visibility> {
    action_creator(|filter: Visibility| Action::new(SET_VISIBILITY).with("filter", filter.as_str()))
}

/// All todos
#[must_use]
pub fn all_todos(state: &AppState) -> Vec<TodoItem> {
    decode(state.get("todos"))
}

/// The todos that pass the current visibility filter
#[must_use]
pub fn visible_todos(state: &AppState) -> Vec<TodoItem> {
    let filter: Visibility = decode(state.get("visibility"));
    all_todos(state)
        .into_iter()
        .filter(|item| filter.admits(item))
        .collect()
}
