mod app;
mod command;
mod settings;
mod ui;

use std::{
    io::{self, BufRead, Write},
    thread,
};

use clap::Parser;
use tick_back::{FileSlot, MemorySlot, MonotonicIds, Slot, TodoStore};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use app::{Data, Flow};
use command::Command;
use settings::{Args, Settings};

#[tokio::main(flavor = "current_thread")]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let settings = Settings::resolve(Args::parse())?;

    let slot: Box<dyn Slot> = match settings.memory {
        true => Box::new(MemorySlot::new()),
        false => {
            let slot = FileSlot::new(&settings.data_dir);
            slot.path(&settings.key)?;
            Box::new(slot)
        }
    };

    info!(
        data_dir = %settings.data_dir.display(),
        key = %settings.key,
        memory = settings.memory,
        "starting"
    );

    let store = TodoStore::load(slot, settings.key, MonotonicIds::new());
    let mut data = Data::new(store);

    let mut stdout = io::stdout();
    write!(stdout, "{}", ui::view(&data))?;
    stdout.flush()?;

    let mut lines = read_lines(io::stdin());

    loop {
        let line = tokio::select! {
            line = lines.recv() => line,
            _ = tokio::signal::ctrl_c() => None,
        };

        let line = match line {
            Some(Ok(line)) => line,
            Some(Err(err)) => return Err(err.into()),
            None => break,
        };

        match Command::parse(&line) {
            Ok(Some(command)) => {
                if app::event(&mut data, command, &mut stdout)? == Flow::Quit {
                    break;
                }
            }
            Ok(None) => {}
            Err(err) => writeln!(stdout, "{}", err)?,
        }

        stdout.flush()?;
    }

    Ok(())
}

/// Reads lines on a detached thread so a pending read never holds up exit.
fn read_lines<R>(input: R) -> mpsc::UnboundedReceiver<io::Result<String>>
where
    R: io::Read + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();

    thread::spawn(move || {
        for line in io::BufReader::new(input).lines() {
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    rx
}
