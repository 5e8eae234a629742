use espressivo_ports::note_map::NoteMapEntry;
use espressivo_ports::storage::{NoteMapStore, StorageError};
use espressivo_ports::types::NoteMapRef;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Note maps kept for the lifetime of the process.
#[derive(Default)]
pub struct InMemoryNoteMapStore {
    maps: RwLock<HashMap<NoteMapRef, Vec<NoteMapEntry>>>,
}

impl InMemoryNoteMapStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.maps.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.read().is_empty()
    }
}

impl NoteMapStore for InMemoryNoteMapStore {
    fn save_note_map(&self, key: &NoteMapRef, entries: &[NoteMapEntry]) -> Result<(), StorageError> {
        self.maps.write().insert(key.clone(), entries.to_vec());
        Ok(())
    }

    fn load_note_map(&self, key: &NoteMapRef) -> Result<Option<Vec<NoteMapEntry>>, StorageError> {
        Ok(self.maps.read().get(key).cloned())
    }
}
