use std::fmt::Write;

use tick_back::{IdSource, Slot, TodoStore};

const PLACEHOLDER: &str = "Enter todo text...";

/// The "add todo" dialog and the text typed into it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TodoInput {
    pub open: bool,
    pub draft: String,
}

impl TodoInput {
    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn cancel(&mut self) {
        self.open = false;
        self.draft.clear();
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Adds the draft to the store.
    ///
    /// Returns `false` and leaves the dialog untouched when the draft is
    /// blank. Otherwise the dialog closes even if persisting failed, since
    /// the todo is already in the list.
    pub fn submit<S: Slot, I: IdSource>(
        &mut self,
        store: &mut TodoStore<S, I>,
    ) -> eyre::Result<bool> {
        if self.draft.trim().is_empty() {
            return Ok(false);
        }

        let result = store.add(&self.draft).map(|_| true);

        self.open = false;
        self.draft.clear();

        result
    }
}

pub fn view(input: &TodoInput, out: &mut String) {
    if !input.open {
        return;
    }

    let text = match input.draft.is_empty() {
        true => PLACEHOLDER,
        false => input.draft.as_str(),
    };

    let _ = writeln!(out, "Add New Todo");
    let _ = writeln!(out, "Create a new task to add to your list");
    let _ = writeln!(out, "> {}", text);
    let _ = writeln!(out, "(submit to add, cancel to close)");
}
