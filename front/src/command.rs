/// One line typed at the prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Open the dialog, type and submit in one go.
    Add(String),
    New,
    Type(String),
    Submit,
    Cancel,
    Toggle(usize),
    Delete(usize),
    Clear,
    List,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  add <text>     add a todo
  new            open the add dialog
  type <text>    set the dialog text
  submit         add the dialog text
  cancel         close the dialog
  toggle <n>     complete or reopen todo n
  delete <n>     delete todo n
  clear          delete completed todos
  list           show the list
  help           show this help
  quit           exit";

impl Command {
    /// Parses a line, `None` for a blank one.
    pub fn parse(line: &str) -> eyre::Result<Option<Self>> {
        let line = line.trim_start();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

        let command = match word.to_ascii_lowercase().as_str() {
            "" => return Ok(None),
            "add" | "a" => Self::Add(rest.to_owned()),
            "new" | "n" => Self::New,
            "type" => Self::Type(rest.to_owned()),
            "submit" | "ok" => Self::Submit,
            "cancel" => Self::Cancel,
            "toggle" | "t" => Self::Toggle(position(rest)?),
            "delete" | "d" | "rm" => Self::Delete(position(rest)?),
            "clear" => Self::Clear,
            "list" | "ls" => Self::List,
            "help" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            other => eyre::bail!("unknown command `{}`, try `help`", other),
        };

        Ok(Some(command))
    }
}

fn position(text: &str) -> eyre::Result<usize> {
    match text.trim().parse::<usize>() {
        Ok(position) if position > 0 => Ok(position),
        _ => eyre::bail!("expected a todo number, got `{}`", text.trim()),
    }
}
