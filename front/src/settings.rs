use std::{
    fs, io,
    path::{Path, PathBuf},
};

use clap::Parser;
use eyre::Context;
use serde::{Deserialize, Serialize};
use tick_back::DEFAULT_KEY;

const DATA_DIR: &str = ".tick";
const SETTINGS_FILE: &str = "tick.ron";

/// A todo list in your terminal.
#[derive(Debug, Default, Parser)]
#[command(name = "tick", version)]
pub struct Args {
    /// Directory the list is stored in.
    #[arg(long, env = "TICK_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Name of the list.
    #[arg(long)]
    pub key: Option<String>,

    /// Settings file, defaults to `tick.ron` inside the data directory.
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Keep the list in memory only.
    #[arg(long)]
    pub memory: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub key: String,
    pub memory: bool,
}

#[derive(Debug, Serialize, Deserialize)]
enum SettingsFile {
    V1 {
        #[serde(default)]
        data_dir: Option<PathBuf>,
        #[serde(default)]
        key: Option<String>,
    },
}

impl Settings {
    /// Combines the command line with the settings file, flags win.
    pub fn resolve(args: Args) -> eyre::Result<Self> {
        let dir = args.data_dir.clone().unwrap_or_else(|| PathBuf::from(DATA_DIR));

        let file = match &args.settings {
            Some(path) => Some(read_file(path)?.ok_or_else(|| {
                eyre::eyre!("settings file {} does not exist", path.display())
            })?),
            None => read_file(&dir.join(SETTINGS_FILE))?,
        };

        let (file_dir, file_key) = match file {
            Some(SettingsFile::V1 { data_dir, key }) => (data_dir, key),
            None => (None, None),
        };

        Ok(Self {
            data_dir: args.data_dir.or(file_dir).unwrap_or(dir),
            key: (args.key.or(file_key)).unwrap_or_else(|| String::from(DEFAULT_KEY)),
            memory: args.memory,
        })
    }
}

fn read_file(path: &Path) -> eyre::Result<Option<SettingsFile>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err)
                .wrap_err_with(|| format!("failed to read settings in {}", path.display()))
        }
    };

    let file = ron::from_str(&text)
        .wrap_err_with(|| format!("failed to parse settings in {}", path.display()))?;

    Ok(Some(file))
}
