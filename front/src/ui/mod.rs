pub mod todo;
pub mod todo_input;

use std::fmt::Write;

use tick_back::{IdSource, Slot};

use crate::Data;

const EMPTY: &str = "No todos yet. Add one to get started!";

/// Renders the whole widget.
pub fn view<S: Slot, I: IdSource>(data: &Data<S, I>) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "My Todo List");
    let _ = writeln!(out, "Stay organized and productive");
    let _ = writeln!(out);

    let todos = data.store.todos();

    if todos.is_empty() {
        let _ = writeln!(out, "{}", EMPTY);
    }

    for (i, todo) in todos.iter().enumerate() {
        todo::view(i + 1, todo, &mut out);
    }

    if !todos.is_empty() {
        let counts = data.store.counts();

        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Total: {}  Completed: {}  Remaining: {}",
            counts.total, counts.completed, counts.remaining
        );
    }

    if data.input.open {
        let _ = writeln!(out);
        todo_input::view(&data.input, &mut out);
    }

    out
}
