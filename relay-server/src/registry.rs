//! Session Registry
//!
//! Tracks connected clients and their display names. Each session owns the
//! sending half of its connection's outbound channel; removing a session
//! drops that sender, which ends the connection's writer task and closes the
//! socket's write side.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tracing::debug;

/// Writable endpoint of one connection: lines queued here are written to
/// the socket by that connection's writer task
pub type ConnectionHandle = mpsc::Sender<String>;

/// Unique session identifier
///
/// Identifiers increase monotonically, so ordering by id is join order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(u64);

impl SessionId {
    /// Create a SessionId from a raw value (mainly for testing)
    #[cfg(test)]
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Session({})", self.0)
    }
}

/// Point-in-time copy of a registered session
#[derive(Clone)]
pub struct Session {
    pub id: SessionId,
    pub name: String,
    pub handle: ConnectionHandle,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("handle_closed", &self.handle.is_closed())
            .finish()
    }
}

/// Registry of all live sessions
///
/// Thread-safe for concurrent access from multiple connection tasks. Locks
/// are held only for the map operation itself, never across I/O.
pub struct SessionRegistry {
    /// Session ID -> Session, in join order
    sessions: RwLock<BTreeMap<SessionId, Session>>,
    /// Counter for generating unique session IDs
    next_session_id: AtomicU64,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(BTreeMap::new()),
            next_session_id: AtomicU64::new(1),
        }
    }

    /// Register a new session
    pub fn add(&self, handle: ConnectionHandle, initial_name: impl Into<String>) -> Session {
        let id = SessionId(self.next_session_id.fetch_add(1, Ordering::SeqCst));
        let session = Session {
            id,
            name: initial_name.into(),
            handle,
        };

        self.sessions.write().insert(id, session.clone());
        debug!("Registered {} as {:?}", id, session.name);

        session
    }

    /// Change a session's display name
    ///
    /// Names are not required to be unique. Returns the previous name, or
    /// `None` if the session is no longer registered.
    pub fn rename(&self, id: SessionId, new_name: impl Into<String>) -> Option<String> {
        let mut sessions = self.sessions.write();
        let session = sessions.get_mut(&id)?;
        let old = std::mem::replace(&mut session.name, new_name.into());
        debug!("Renamed {} from {:?} to {:?}", id, old, session.name);
        Some(old)
    }

    /// Remove a session
    ///
    /// Idempotent: only the first call for a given id returns the session.
    /// Later calls are no-ops returning `None`, so a racing teardown path can
    /// tell it lost.
    pub fn remove(&self, id: SessionId) -> Option<Session> {
        let removed = self.sessions.write().remove(&id);
        if removed.is_some() {
            debug!("Unregistered {}", id);
        }
        removed
    }

    /// Snapshot of all sessions in join order
    ///
    /// Later additions and removals do not affect the returned list.
    pub fn list(&self) -> Vec<Session> {
        self.sessions.read().values().cloned().collect()
    }

    /// Display names of all sessions in join order
    pub fn names(&self) -> Vec<String> {
        self.sessions
            .read()
            .values()
            .map(|s| s.name.clone())
            .collect()
    }

    /// Get a copy of one session
    pub fn get(&self, id: SessionId) -> Option<Session> {
        self.sessions.read().get(&id).cloned()
    }

    #[cfg(test)]
    pub fn contains(&self, id: SessionId) -> bool {
        self.sessions.read().contains_key(&id)
    }

    /// Get the number of registered sessions
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("session_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_session(registry: &SessionRegistry, name: &str) -> (Session, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(10);
        (registry.add(tx, name), rx)
    }

    #[test]
    fn test_registry_new() {
        let registry = SessionRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.list().is_empty());
    }

    #[test]
    fn test_session_id_display() {
        assert_eq!(SessionId::new(42).to_string(), "Session(42)");
        assert_eq!(SessionId::new(42).value(), 42);
    }

    #[test]
    fn test_add_assigns_unique_ids() {
        let registry = SessionRegistry::new();
        let (a, _rx_a) = setup_session(&registry, "127.0.0.1:1000");
        let (b, _rx_b) = setup_session(&registry, "127.0.0.1:1000");

        assert_ne!(a.id, b.id);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_list_preserves_join_order() {
        let registry = SessionRegistry::new();
        let (_a, _rx_a) = setup_session(&registry, "first");
        let (_b, _rx_b) = setup_session(&registry, "second");
        let (_c, _rx_c) = setup_session(&registry, "third");

        assert_eq!(registry.names(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_rename() {
        let registry = SessionRegistry::new();
        let (session, _rx) = setup_session(&registry, "127.0.0.1:1000");

        let old = registry.rename(session.id, "alice");
        assert_eq!(old.as_deref(), Some("127.0.0.1:1000"));
        assert_eq!(registry.get(session.id).unwrap().name, "alice");
    }

    #[test]
    fn test_rename_allows_duplicate_names() {
        let registry = SessionRegistry::new();
        let (a, _rx_a) = setup_session(&registry, "a");
        let (b, _rx_b) = setup_session(&registry, "b");

        registry.rename(a.id, "same");
        registry.rename(b.id, "same");

        assert_eq!(registry.names(), vec!["same", "same"]);
    }

    #[test]
    fn test_rename_removed_session() {
        let registry = SessionRegistry::new();
        let (session, _rx) = setup_session(&registry, "gone");
        registry.remove(session.id);

        assert!(registry.rename(session.id, "ghost").is_none());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let registry = SessionRegistry::new();
        let (session, _rx) = setup_session(&registry, "a");
        let (_other, _rx_other) = setup_session(&registry, "b");

        let first = registry.remove(session.id);
        assert_eq!(first.map(|s| s.name), Some("a".to_string()));
        assert!(registry.remove(session.id).is_none());

        assert_eq!(registry.names(), vec!["b"]);
        assert!(!registry.contains(session.id));
    }

    #[test]
    fn test_remove_nonexistent_session() {
        let registry = SessionRegistry::new();
        assert!(registry.remove(SessionId::new(999)).is_none());
    }

    #[test]
    fn test_list_is_snapshot() {
        let registry = SessionRegistry::new();
        let (a, _rx_a) = setup_session(&registry, "a");
        let (_b, _rx_b) = setup_session(&registry, "b");

        let snapshot = registry.list();
        registry.remove(a.id);

        assert_eq!(snapshot.len(), 2);
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_closes_handle() {
        let registry = SessionRegistry::new();
        let (tx, mut rx) = mpsc::channel(10);
        let id = registry.add(tx, "a").id;

        // The registry now holds the only sender
        registry.remove(id);

        assert!(rx.recv().await.is_none());
    }
}
