//! In-memory persistence slot.

use std::collections::HashMap;

use od_spi::PersistenceSlot;
use parking_lot::RwLock;

/// A [`PersistenceSlot`] backed by a plain in-memory map.
#[derive(Debug, Default)]
pub struct InMemoryPersistenceSlot {
    values: RwLock<HashMap<String, String>>,
}

impl InMemoryPersistenceSlot {
    /// Creates an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistenceSlot for InMemoryPersistenceSlot {
    fn read(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    fn write(&self, key: &str, value: &str) {
        self.values.write().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.values.write().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_write_remove() {
        let slot = InMemoryPersistenceSlot::new();
        assert_eq!(slot.read("k"), None);

        slot.write("k", "v1");
        assert_eq!(slot.read("k"), Some("v1".to_string()));

        slot.write("k", "v2");
        assert_eq!(slot.read("k"), Some("v2".to_string()));

        slot.remove("k");
        assert_eq!(slot.read("k"), None);
    }
}
