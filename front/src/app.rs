use std::io::Write;

use tick_back::{IdSource, Slot, TodoStore};
use tracing::error;

use crate::{
    command::{Command, HELP},
    ui::{self, todo_input::TodoInput},
};

/// Everything the terminal view owns.
pub struct Data<S, I> {
    pub store: TodoStore<S, I>,
    pub input: TodoInput,
}

impl<S: Slot, I: IdSource> Data<S, I> {
    pub fn new(store: TodoStore<S, I>) -> Self {
        Self {
            store,
            input: TodoInput::default(),
        }
    }

    fn id_at(&self, position: usize) -> Option<u64> {
        let todo = self.store.todos().get(position.checked_sub(1)?)?;
        Some(todo.id)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Applies one command and redraws when the list or the dialog changed.
pub fn event<S: Slot, I: IdSource>(
    data: &mut Data<S, I>,
    command: Command,
    out: &mut impl Write,
) -> eyre::Result<Flow> {
    let generation = data.store.generation();
    let input = data.input.clone();
    let mut redraw = false;

    match command {
        Command::Add(text) => {
            data.input.open();
            data.input.set_text(text);

            if let Err(err) = data.input.submit(&mut data.store) {
                error!("failed to store todos: {:?}", err);
            }

            if data.input.open {
                writeln!(out, "nothing to add")?;
                data.input = input.clone();
            }
        }
        Command::New => data.input.open(),
        Command::Type(text) if data.input.open => data.input.set_text(text),
        Command::Submit if data.input.open => match data.input.submit(&mut data.store) {
            Ok(true) => {}
            Ok(false) => writeln!(out, "type some text first")?,
            Err(err) => error!("failed to store todos: {:?}", err),
        },
        Command::Type(_) | Command::Submit => writeln!(out, "open the dialog with `new` first")?,
        Command::Cancel => data.input.cancel(),
        Command::Toggle(position) => match data.id_at(position) {
            Some(id) => {
                if let Err(err) = data.store.toggle(id) {
                    error!("failed to store todos: {:?}", err);
                }
            }
            None => writeln!(out, "no todo at {}", position)?,
        },
        Command::Delete(position) => match data.id_at(position) {
            Some(id) => {
                if let Err(err) = data.store.delete(id) {
                    error!("failed to store todos: {:?}", err);
                }
            }
            None => writeln!(out, "no todo at {}", position)?,
        },
        Command::Clear => {
            if let Err(err) = data.store.clear_completed() {
                error!("failed to store todos: {:?}", err);
            }
        }
        Command::List => redraw = true,
        Command::Help => writeln!(out, "{}", HELP)?,
        Command::Quit => return Ok(Flow::Quit),
    }

    if redraw || data.store.generation() != generation || data.input != input {
        write!(out, "{}", ui::view(data))?;
    }

    Ok(Flow::Continue)
}
