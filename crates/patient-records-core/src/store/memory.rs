//! In-memory store (for testing and embedding).

use std::cell::{Cell, RefCell};

use super::{Collection, RecordStore, StoreResult};

/// Keeps the collection in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collection: RefCell<Collection>,
    saves: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times `save` has been called.
    pub fn save_count(&self) -> usize {
        self.saves.get()
    }
}

impl RecordStore for MemoryStore {
    fn load(&self) -> StoreResult<Collection> {
        Ok(self.collection.borrow().clone())
    }

    fn save(&self, collection: &Collection) -> StoreResult<()> {
        *self.collection.borrow_mut() = collection.clone();
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}
