//! Controller key lookup.
//!
//! The protocol layer never stores keys itself. It asks a [`KeyStore`] for the
//! key of each packet's device id, uses it for that one exchange and drops it.

use std::collections::HashMap;

use crate::core::codec::Key;
use crate::core::device_id::DeviceId;

/// Read-only mapping from controller id to key.
///
/// Lookups may run concurrently from several in-flight requests.
pub trait KeyStore: Send + Sync {
    /// Key for `device`, or `None` if the controller is unknown.
    fn key_for(&self, device: &DeviceId) -> Option<Key>;
}

impl<F> KeyStore for F
where
    F: Fn(&DeviceId) -> Option<Key> + Send + Sync,
{
    fn key_for(&self, device: &DeviceId) -> Option<Key> {
        self(device)
    }
}

/// Key store backed by a `HashMap`, filled at startup.
#[derive(Debug, Default, Clone)]
pub struct MemoryKeyStore {
    keys: HashMap<DeviceId, Key>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the key of `device`.
    pub fn insert(&mut self, device: DeviceId, key: Key) -> Option<Key> {
        self.keys.insert(device, key)
    }

    pub fn with_device(mut self, device: DeviceId, key: Key) -> Self {
        self.insert(device, key);
        self
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl KeyStore for MemoryKeyStore {
    fn key_for(&self, device: &DeviceId) -> Option<Key> {
        self.keys.get(device).cloned()
    }
}
