use std::collections::HashSet;

use eyre::Context;
use tick_api::v1::{decode_todos, encode_todos, Counts, Todo};
use tracing::{info, warn};

use crate::{IdSource, MonotonicIds, Slot};

/// Key the list is persisted under unless configured otherwise.
pub const DEFAULT_KEY: &str = "todos";

/// Owns the todo list and keeps the persisted slot in sync with it.
///
/// Every call that changes the list rewrites the whole list to the slot
/// before returning. Calls that change nothing (blank text, unknown id) do
/// not touch the slot.
#[derive(Debug)]
pub struct TodoStore<S, I = MonotonicIds> {
    slot: S,
    ids: I,
    key: String,
    todos: Vec<Todo>,
    generation: u64,
}

impl<S: Slot, I: IdSource> TodoStore<S, I> {
    /// Loads the list stored under `key`.
    ///
    /// A missing, unreadable or malformed value yields an empty list.
    pub fn load(slot: S, key: impl Into<String>, mut ids: I) -> Self {
        let key = key.into();
        let todos = read_todos(&slot, &key);

        for todo in &todos {
            ids.observe(todo.id);
        }

        info!(key = %key, count = todos.len(), "loaded todos");

        Self {
            slot,
            ids,
            key,
            todos,
            generation: 0,
        }
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn get(&self, id: u64) -> Option<&Todo> {
        self.todos.iter().find(|todo| todo.id == id)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    /// Bumped by every call that changed the list.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn counts(&self) -> Counts {
        Counts::of(&self.todos)
    }

    pub fn add(&mut self, text: &str) -> eyre::Result<&[Todo]> {
        let text = text.trim();

        if text.is_empty() {
            return Ok(&self.todos);
        }

        let todo = Todo::new(self.fresh_id(), text);

        info!(id = todo.id, text = %todo.text, "created todo");

        self.todos.push(todo);
        self.persist()?;

        Ok(&self.todos)
    }

    pub fn toggle(&mut self, id: u64) -> eyre::Result<&[Todo]> {
        let Some(index) = self.todos.iter().position(|todo| todo.id == id) else {
            return Ok(&self.todos);
        };

        let todo = &mut self.todos[index];
        todo.completed = !todo.completed;

        info!(id = todo.id, completed = todo.completed, "toggled todo");

        self.persist()?;

        Ok(&self.todos)
    }

    pub fn delete(&mut self, id: u64) -> eyre::Result<&[Todo]> {
        let Some(index) = self.todos.iter().position(|todo| todo.id == id) else {
            return Ok(&self.todos);
        };

        let todo = self.todos.remove(index);

        info!(id = todo.id, text = %todo.text, "deleted todo");

        self.persist()?;

        Ok(&self.todos)
    }

    /// Removes every completed todo.
    pub fn clear_completed(&mut self) -> eyre::Result<&[Todo]> {
        let before = self.todos.len();
        self.todos.retain(|todo| !todo.completed);
        let removed = before - self.todos.len();

        if removed == 0 {
            return Ok(&self.todos);
        }

        info!(removed, "cleared completed todos");

        self.persist()?;

        Ok(&self.todos)
    }

    /// An id not used by any current todo.
    ///
    /// Asks the id source at most once per todo plus one; when that runs
    /// out or keeps colliding, takes the smallest unused id instead.
    fn fresh_id(&mut self) -> u64 {
        for _ in 0..=self.todos.len() {
            match self.ids.next_id() {
                Some(id) if self.get(id).is_none() => return id,
                Some(_) => continue,
                None => break,
            }
        }

        let used: HashSet<u64> = self.todos.iter().map(|todo| todo.id).collect();
        let id = (0..=u64::MAX).find(|id| !used.contains(id)).unwrap_or_default();

        warn!(id, "id source exhausted, reusing smallest free id");

        id
    }

    fn persist(&mut self) -> eyre::Result<()> {
        // the list already changed, even if the write below fails
        self.generation += 1;

        let text = encode_todos(&self.todos).wrap_err("failed to encode todos")?;

        self.slot
            .write(&self.key, &text)
            .wrap_err_with(|| format!("failed to store todos under `{}`", self.key))
    }
}

fn read_todos(slot: &impl Slot, key: &str) -> Vec<Todo> {
    let text = match slot.read(key) {
        Ok(Some(text)) => text,
        Ok(None) => return Vec::new(),
        Err(err) => {
            warn!(key = %key, "failed to read todos, starting empty: {:?}", err);
            return Vec::new();
        }
    };

    let todos = match decode_todos(&text) {
        Ok(todos) => todos,
        Err(err) => {
            warn!(key = %key, "discarding malformed todos: {}", err);
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    let before = todos.len();

    let todos: Vec<_> = (todos.into_iter())
        .filter(|todo| !todo.text.trim().is_empty() && seen.insert(todo.id))
        .collect();

    if todos.len() != before {
        warn!(
            key = %key,
            dropped = before - todos.len(),
            "dropped blank or duplicate todos"
        );
    }

    todos
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemorySlot, SequentialIds};

    fn store() -> TodoStore<MemorySlot, SequentialIds> {
        TodoStore::load(MemorySlot::new(), DEFAULT_KEY, SequentialIds::new())
    }

    fn persisted(store: &TodoStore<MemorySlot, SequentialIds>) -> Vec<Todo> {
        persisted_in(store.slot())
    }

    fn persisted_in(slot: &MemorySlot) -> Vec<Todo> {
        let text = slot.get(DEFAULT_KEY).unwrap();
        decode_todos(text).unwrap()
    }

    #[test]
    fn add_appends_active_todo() {
        let mut store = store();

        let todos = store.add("Buy milk").unwrap();

        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].text, "Buy milk");
        assert!(!todos[0].completed);
        assert_eq!(persisted(&store), store.todos());
    }

    #[test]
    fn add_trims_text() {
        let mut store = store();

        store.add("  walk the dog \n").unwrap();

        assert_eq!(store.todos()[0].text, "walk the dog");
    }

    #[test]
    fn add_blank_is_noop() {
        let mut store = store();

        store.add("   ").unwrap();
        store.add("").unwrap();

        assert!(store.todos().is_empty());
        assert_eq!(store.slot().writes(), 0);
        assert_eq!(store.generation(), 0);
    }

    #[test]
    fn add_keeps_insertion_order() {
        let mut store = store();

        store.add("one").unwrap();
        store.add("two").unwrap();
        store.add("three").unwrap();

        let texts: Vec<_> = store.todos().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, ["one", "two", "three"]);
    }

    #[test]
    fn add_skips_ids_already_in_use() {
        let slot = MemorySlot::with_value(
            DEFAULT_KEY,
            r#"[{"id":1,"text":"a","completed":false}]"#,
        );

        struct Scripted(Vec<u64>);

        impl IdSource for Scripted {
            fn next_id(&mut self) -> Option<u64> {
                Some(self.0.remove(0))
            }
        }

        let mut store = TodoStore::load(slot, DEFAULT_KEY, Scripted(vec![1, 1, 5]));
        store.add("b").unwrap();

        assert_eq!(store.todos()[1].id, 5);
    }

    #[test]
    fn add_after_largest_possible_id() {
        let text = format!(r#"[{{"id":{},"text":"last","completed":false}}]"#, u64::MAX);

        let slot = MemorySlot::with_value(DEFAULT_KEY, text.clone());
        let mut store = TodoStore::load(slot, DEFAULT_KEY, SequentialIds::new());
        store.add("b").unwrap();
        store.add("c").unwrap();

        let ids: Vec<_> = store.todos().iter().map(|t| t.id).collect();
        assert_eq!(ids, [u64::MAX, 0, 1]);

        let slot = MemorySlot::with_value(DEFAULT_KEY, text);
        let mut store = TodoStore::load(slot, DEFAULT_KEY, MonotonicIds::new());
        store.add("b").unwrap();

        assert_eq!(store.todos()[1].id, 0);
        assert_eq!(persisted_in(store.slot()).len(), 2);
    }

    #[test]
    fn add_gives_up_on_a_source_that_keeps_colliding() {
        let slot = MemorySlot::with_value(
            DEFAULT_KEY,
            r#"[{"id":0,"text":"a","completed":false},{"id":7,"text":"b","completed":false}]"#,
        );

        struct Stuck;

        impl IdSource for Stuck {
            fn next_id(&mut self) -> Option<u64> {
                Some(7)
            }
        }

        let mut store = TodoStore::load(slot, DEFAULT_KEY, Stuck);
        store.add("c").unwrap();

        assert_eq!(store.todos()[2].id, 1);
    }

    #[test]
    fn toggle_flips_and_flips_back() {
        let mut store = store();
        store.add("a").unwrap();
        let id = store.todos()[0].id;

        store.toggle(id).unwrap();
        assert!(store.get(id).unwrap().completed);
        assert!(persisted(&store)[0].completed);

        store.toggle(id).unwrap();
        assert!(!store.get(id).unwrap().completed);
        assert!(!persisted(&store)[0].completed);
    }

    #[test]
    fn toggle_unknown_id_is_noop() {
        let mut store = store();
        store.add("a").unwrap();
        let before = store.todos().to_vec();
        let writes = store.slot().writes();

        let todos = store.toggle(999).unwrap();

        assert_eq!(todos, before);
        assert_eq!(store.slot().writes(), writes);
    }

    #[test]
    fn delete_removes_exactly_one() {
        let mut store = store();
        store.add("a").unwrap();
        store.add("b").unwrap();
        store.add("c").unwrap();
        let id = store.todos()[1].id;

        let todos = store.delete(id).unwrap();

        assert_eq!(todos.len(), 2);
        assert!(todos.iter().all(|todo| todo.id != id));
        assert_eq!(persisted(&store), store.todos());
    }

    #[test]
    fn delete_unknown_id_is_noop() {
        let mut store = store();
        store.add("a").unwrap();
        let id = store.todos()[0].id;
        store.delete(id).unwrap();
        let writes = store.slot().writes();

        store.delete(id).unwrap();
        store.toggle(id).unwrap();

        assert!(store.todos().is_empty());
        assert_eq!(store.slot().writes(), writes);
    }

    #[test]
    fn counts_after_completing_one_of_three() {
        let mut store = store();
        store.add("a").unwrap();
        store.add("b").unwrap();
        store.add("c").unwrap();
        let id = store.todos()[0].id;
        store.toggle(id).unwrap();

        assert_eq!(
            store.counts(),
            Counts {
                total: 3,
                completed: 1,
                remaining: 2,
            }
        );
    }

    #[test]
    fn clear_completed_only_writes_when_something_changed() {
        let mut store = store();
        store.add("a").unwrap();
        store.add("b").unwrap();
        let writes = store.slot().writes();

        store.clear_completed().unwrap();
        assert_eq!(store.slot().writes(), writes);

        let id = store.todos()[0].id;
        store.toggle(id).unwrap();
        let todos = store.clear_completed().unwrap();

        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].text, "b");
        assert_eq!(persisted(&store), store.todos());
    }

    #[test]
    fn generation_tracks_changes() {
        let mut store = store();
        store.add("a").unwrap();
        store.add(" ").unwrap();
        store.toggle(42).unwrap();
        assert_eq!(store.generation(), 1);

        let id = store.todos()[0].id;
        store.toggle(id).unwrap();
        store.delete(id).unwrap();
        assert_eq!(store.generation(), 3);
    }

    #[test]
    fn load_absent_is_empty() {
        let store = store();

        assert!(store.todos().is_empty());
    }

    #[test]
    fn load_malformed_is_empty() {
        let slot = MemorySlot::with_value(DEFAULT_KEY, "{oops");

        let store = TodoStore::load(slot, DEFAULT_KEY, SequentialIds::new());

        assert!(store.todos().is_empty());
    }

    #[test]
    fn load_drops_blank_and_duplicate_entries() {
        let slot = MemorySlot::with_value(
            DEFAULT_KEY,
            r#"[
                {"id":1,"text":"keep","completed":false},
                {"id":2,"text":"   ","completed":false},
                {"id":1,"text":"dupe","completed":true},
                {"id":3,"text":"also","completed":true}
            ]"#,
        );

        let store = TodoStore::load(slot, DEFAULT_KEY, SequentialIds::new());

        let ids: Vec<_> = store.todos().iter().map(|t| t.id).collect();
        assert_eq!(ids, [1, 3]);
        assert_eq!(store.todos()[0].text, "keep");
    }

    #[test]
    fn load_round_trips_persisted_list() {
        let mut first = store();
        first.add("a").unwrap();
        first.add("b").unwrap();
        let id = first.todos()[1].id;
        first.toggle(id).unwrap();

        let slot = first.slot().clone();
        let second = TodoStore::load(slot, DEFAULT_KEY, SequentialIds::new());

        assert_eq!(second.todos(), first.todos());
    }

    #[test]
    fn ids_continue_above_loaded_ids() {
        let slot = MemorySlot::with_value(
            DEFAULT_KEY,
            r#"[{"id":10,"text":"a","completed":false}]"#,
        );
        let mut store = TodoStore::load(slot, DEFAULT_KEY, SequentialIds::new());

        store.add("b").unwrap();

        assert_eq!(store.todos()[1].id, 11);
    }

    struct FailingSlot;

    impl Slot for FailingSlot {
        fn read(&self, _key: &str) -> eyre::Result<Option<String>> {
            eyre::bail!("storage unavailable")
        }

        fn write(&mut self, _key: &str, _text: &str) -> eyre::Result<()> {
            eyre::bail!("storage full")
        }
    }

    #[test]
    fn unreadable_slot_loads_empty() {
        let store = TodoStore::load(FailingSlot, DEFAULT_KEY, SequentialIds::new());

        assert!(store.todos().is_empty());
    }

    #[test]
    fn failed_write_is_reported_and_keeps_mutation() {
        let mut store = TodoStore::load(FailingSlot, DEFAULT_KEY, SequentialIds::new());

        let err = store.add("a").unwrap_err();

        assert!(format!("{:?}", err).contains("storage full"));
        assert_eq!(store.todos().len(), 1);
        assert_eq!(store.generation(), 1);
    }
}
