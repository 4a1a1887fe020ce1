use serde::{Deserialize, Serialize};

/// One task in the list.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Todo {
    pub id: u64,
    pub text: String,
    pub completed: bool,
}

impl Todo {
    pub fn new(id: u64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
        }
    }
}

/// Totals derived from a list, shown under the rendered todos.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Counts {
    pub total: usize,
    pub completed: usize,
    pub remaining: usize,
}

impl Counts {
    pub fn of(todos: &[Todo]) -> Self {
        let total = todos.len();
        let completed = todos.iter().filter(|todo| todo.completed).count();

        Self {
            total,
            completed,
            remaining: total - completed,
        }
    }
}

/// Serializes a list into the persisted slot layout, a JSON array of
/// `{id, text, completed}` objects in display order.
pub fn encode_todos(todos: &[Todo]) -> serde_json::Result<String> {
    serde_json::to_string(todos)
}

/// Parses the persisted slot layout.
pub fn decode_todos(text: &str) -> serde_json::Result<Vec<Todo>> {
    serde_json::from_str(text)
}
