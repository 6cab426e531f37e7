//! Local durable key-value storage.

/// A durable key-value persistence slot.
///
/// The session coordinator owns exactly one key in the slot and is the
/// only writer. Operations are synchronous and must not block on I/O for
/// longer than a local storage access.
pub trait PersistenceSlot: Send + Sync {
    /// Reads the value stored under `key`, if any.
    fn read(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any existing value.
    fn write(&self, key: &str, value: &str);

    /// Removes the value stored under `key`, if any.
    fn remove(&self, key: &str);
}
