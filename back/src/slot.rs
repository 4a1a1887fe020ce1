use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

use eyre::Context;
use tracing::debug;

/// A named key-value location holding persisted text.
pub trait Slot {
    /// Returns `None` when nothing has been written under `key`.
    fn read(&self, key: &str) -> eyre::Result<Option<String>>;

    /// Replaces whatever is stored under `key`.
    fn write(&mut self, key: &str, text: &str) -> eyre::Result<()>;
}

impl<S: Slot + ?Sized> Slot for Box<S> {
    fn read(&self, key: &str) -> eyre::Result<Option<String>> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, text: &str) -> eyre::Result<()> {
        (**self).write(key, text)
    }
}

/// In-memory slot, lost when dropped.
#[derive(Clone, Debug, Default)]
pub struct MemorySlot {
    values: HashMap<String, String>,
    writes: usize,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: impl Into<String>, text: impl Into<String>) -> Self {
        let mut slot = Self::default();
        slot.values.insert(key.into(), text.into());
        slot
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Number of writes performed since creation.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl Slot for MemorySlot {
    fn read(&self, key: &str) -> eyre::Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, text: &str) -> eyre::Result<()> {
        self.values.insert(key.to_owned(), text.to_owned());
        self.writes += 1;
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory.
#[derive(Clone, Debug)]
pub struct FileSlot {
    dir: PathBuf,
}

impl FileSlot {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, key: &str) -> eyre::Result<PathBuf> {
        let valid = !key.is_empty()
            && (key.chars()).all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        if !valid {
            eyre::bail!("invalid slot key `{}`", key);
        }

        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl Slot for FileSlot {
    fn read(&self, key: &str) -> eyre::Result<Option<String>> {
        let path = self.path(key)?;

        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).wrap_err_with(|| format!("failed to read {}", path.display()))
            }
        };

        debug!(path = %path.display(), bytes = text.len(), "read slot");

        Ok(Some(text))
    }

    fn write(&mut self, key: &str, text: &str) -> eyre::Result<()> {
        let path = self.path(key)?;
        let tmp = path.with_extension("json.tmp");

        fs::create_dir_all(&self.dir)
            .wrap_err_with(|| format!("failed to create {}", self.dir.display()))?;
        fs::write(&tmp, text).wrap_err_with(|| format!("failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .wrap_err_with(|| format!("failed to replace {}", path.display()))?;

        debug!(path = %path.display(), bytes = text.len(), "wrote slot");

        Ok(())
    }
}
