mod id;
mod slot;
mod store;

pub use id::{IdSource, MonotonicIds, SequentialIds};
pub use slot::{FileSlot, MemorySlot, Slot};
pub use store::{TodoStore, DEFAULT_KEY};
