//! Process-wide connection registry.
//!
//! Maps connection identifiers to the observer handles of their active
//! bridges. The registry only tracks lifecycle; it never sees message
//! content. Its size feeds the health endpoint and must equal the number of
//! currently-open client connections.

use dashmap::DashMap;
use uuid::Uuid;

use crate::core::live::BridgeHandle;

/// Concurrent table of live connections.
///
/// Registrations and removals race across independent connection lifecycles,
/// so the table is a `DashMap`; `size()` is a consistent snapshot.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: DashMap<Uuid, BridgeHandle>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a newly-accepted connection and its bridge handle.
    pub fn register(&self, id: Uuid, handle: BridgeHandle) {
        self.connections.insert(id, handle);
        tracing::debug!(connection_id = %id, connections = self.size(), "connection registered");
    }

    /// Remove a connection. Idempotent; returns the handle if it was present.
    pub fn unregister(&self, id: &Uuid) -> Option<BridgeHandle> {
        let removed = self.connections.remove(id).map(|(_, handle)| handle);
        if removed.is_some() {
            tracing::debug!(connection_id = %id, connections = self.size(), "connection removed");
        }
        removed
    }

    /// Number of currently-open connections.
    pub fn size(&self) -> usize {
        self.connections.len()
    }

    /// Observer handle for one connection, if still open.
    pub fn get(&self, id: &Uuid) -> Option<BridgeHandle> {
        self.connections.get(id).map(|entry| entry.value().clone())
    }
}
