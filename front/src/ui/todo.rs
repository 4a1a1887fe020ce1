use std::fmt::Write;

use tick_api::v1::Todo;

/// One row: position, checkbox and text.
pub fn view(position: usize, todo: &Todo, out: &mut String) {
    let check = match todo.completed {
        true => 'x',
        false => ' ',
    };

    let _ = writeln!(out, "{:>3}. [{}] {}", position, check, todo.text);
}
