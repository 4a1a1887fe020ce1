use chrono::Utc;

/// Hands out ids for new todos.
pub trait IdSource {
    /// `None` once the source has run out of ids.
    fn next_id(&mut self) -> Option<u64>;

    /// Called with every id already present in a loaded list.
    fn observe(&mut self, _id: u64) {}
}

/// Millisecond timestamps, bumped past the previous id when two todos land
/// in the same tick.
#[derive(Clone, Debug, Default)]
pub struct MonotonicIds {
    last: u64,
}

impl MonotonicIds {
    pub fn new() -> Self {
        Self::default()
    }

    fn now() -> u64 {
        u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
    }
}

impl IdSource for MonotonicIds {
    fn next_id(&mut self) -> Option<u64> {
        let id = Self::now().max(self.last.checked_add(1)?);
        self.last = id;
        Some(id)
    }

    fn observe(&mut self, id: u64) {
        self.last = self.last.max(id);
    }
}

/// Plain counter starting at 1.
#[derive(Clone, Debug, Default)]
pub struct SequentialIds {
    last: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> Option<u64> {
        self.last = self.last.checked_add(1)?;
        Some(self.last)
    }

    fn observe(&mut self, id: u64) {
        self.last = self.last.max(id);
    }
}
