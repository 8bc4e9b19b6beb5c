//! Role registry shared by all relay connections.
//!
//! The registry maps each [`Role`] to the single connection currently
//! holding it. It is the only shared mutable state in the relay; every read
//! and write goes through one async mutex, and the lock is never held
//! across a socket write: callers clone a [`PeerHandle`] out and write to it
//! after the lock is released.

use crate::error::RelayError;
use kodi_core::{ConnectionId, Role};
use kodi_core::Result;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::debug;

type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Write side of one relay connection.
///
/// Cloning a handle shares the underlying writer. Writes are serialized per
/// connection, so a forwarded message and a local notice never interleave.
/// Handles compare equal only when they belong to the same connection.
#[derive(Clone)]
pub struct PeerHandle {
    id: ConnectionId,
    writer: Arc<Mutex<BoxedWriter>>,
}

impl PeerHandle {
    /// Wraps the write half of a new connection.
    pub fn new<W>(writer: W) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self::with_id(ConnectionId::new(), writer)
    }

    /// Wraps a writer under a known connection ID.
    pub fn with_id<W>(id: ConnectionId, writer: W) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            id,
            writer: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// Returns the connection ID.
    #[must_use]
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Writes one text message to the connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the write or flush fails; callers treat that as
    /// the connection having gone away.
    pub async fn send(&self, message: &str) -> Result<(), RelayError> {
        self.send_bytes(message.as_bytes()).await
    }

    /// Writes one message to the connection exactly as given.
    ///
    /// # Errors
    ///
    /// Returns an error if the write or flush fails.
    pub async fn send_bytes(&self, message: &[u8]) -> Result<(), RelayError> {
        let mut writer = self.writer.lock().await;
        writer
            .write_all(message)
            .await
            .map_err(|e| RelayError::Write {
                connection_id: self.id,
                details: e.to_string(),
            })?;
        writer.flush().await.map_err(|e| RelayError::Write {
            connection_id: self.id,
            details: e.to_string(),
        })?;
        Ok(())
    }

    /// Shuts down the write side of the connection.
    pub async fn close(&self) {
        let mut writer = self.writer.lock().await;
        if let Err(e) = writer.shutdown().await {
            debug!(connection = %self.id, error = %e, "shutdown failed");
        }
    }
}

impl PartialEq for PeerHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for PeerHandle {}

impl fmt::Debug for PeerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeerHandle")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Shared map from role to the connection currently holding it.
///
/// Cloning the registry shares the underlying table.
#[derive(Debug, Clone, Default)]
pub struct RoleRegistry {
    holders: Arc<Mutex<HashMap<Role, PeerHandle>>>,
}

impl RoleRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `handle` the holder of `role`.
    ///
    /// Any previous holder is replaced without notice and returned.
    pub async fn register(&self, role: Role, handle: PeerHandle) -> Option<PeerHandle> {
        self.holders.lock().await.insert(role, handle)
    }

    /// Returns the current holder of `role`, if any.
    pub async fn lookup(&self, role: Role) -> Option<PeerHandle> {
        self.holders.lock().await.get(&role).cloned()
    }

    /// Removes `role` only if `handle` still holds it.
    ///
    /// A stale handle, one that has since been replaced by a newer
    /// registration, leaves the table untouched. Returns whether an entry
    /// was removed.
    pub async fn unregister(&self, role: Role, handle: &PeerHandle) -> bool {
        let mut holders = self.holders.lock().await;
        match holders.get(&role) {
            Some(current) if current == handle => {
                holders.remove(&role);
                true
            }
            _ => false,
        }
    }

    /// Removes every role `handle` holds, returning the removed roles.
    ///
    /// Used when a connection task dies before it could unregister itself.
    pub async fn unregister_all(&self, handle: &PeerHandle) -> Vec<Role> {
        let mut holders = self.holders.lock().await;
        let roles: Vec<Role> = holders
            .iter()
            .filter(|(_, current)| *current == handle)
            .map(|(role, _)| *role)
            .collect();
        for role in &roles {
            holders.remove(role);
        }
        roles
    }

    /// Returns the number of registered roles.
    pub async fn len(&self) -> usize {
        self.holders.lock().await.len()
    }

    /// Returns whether no role is registered.
    pub async fn is_empty(&self) -> bool {
        self.holders.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    fn sink_handle() -> PeerHandle {
        PeerHandle::new(tokio::io::sink())
    }

    #[tokio::test]
    async fn lookup_on_empty_registry() {
        let registry = RoleRegistry::new();
        assert!(registry.lookup(Role::Initiator).await.is_none());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn register_then_lookup() {
        let registry = RoleRegistry::new();
        let handle = sink_handle();

        assert!(registry.register(Role::Responder, handle.clone()).await.is_none());

        assert_eq!(registry.lookup(Role::Responder).await, Some(handle));
        assert!(registry.lookup(Role::Initiator).await.is_none());
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn last_registration_wins() {
        let registry = RoleRegistry::new();
        let first = sink_handle();
        let second = sink_handle();

        registry.register(Role::Initiator, first.clone()).await;
        let evicted = registry.register(Role::Initiator, second.clone()).await;

        assert_eq!(evicted, Some(first.clone()));
        assert_eq!(registry.lookup(Role::Initiator).await, Some(second.clone()));

        // The evicted connection cleaning up must not remove its successor.
        assert!(!registry.unregister(Role::Initiator, &first).await);
        assert_eq!(registry.lookup(Role::Initiator).await, Some(second.clone()));

        assert!(registry.unregister(Role::Initiator, &second).await);
        assert!(registry.lookup(Role::Initiator).await.is_none());
    }

    #[tokio::test]
    async fn unregister_leaves_other_role() {
        let registry = RoleRegistry::new();
        let initiator = sink_handle();
        let responder = sink_handle();

        registry.register(Role::Initiator, initiator.clone()).await;
        registry.register(Role::Responder, responder.clone()).await;

        assert!(registry.unregister(Role::Initiator, &initiator).await);
        assert!(registry.lookup(Role::Initiator).await.is_none());
        assert_eq!(registry.lookup(Role::Responder).await, Some(responder));
    }

    #[tokio::test]
    async fn unregister_with_wrong_role_is_noop() {
        let registry = RoleRegistry::new();
        let handle = sink_handle();
        registry.register(Role::Responder, handle.clone()).await;

        assert!(!registry.unregister(Role::Initiator, &handle).await);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn unregister_all_removes_only_that_handle() {
        let registry = RoleRegistry::new();
        let handle = sink_handle();
        let other = sink_handle();

        registry.register(Role::Initiator, handle.clone()).await;
        registry.register(Role::Responder, other.clone()).await;

        assert_eq!(registry.unregister_all(&handle).await, vec![Role::Initiator]);
        assert_eq!(registry.lookup(Role::Responder).await, Some(other));
    }

    #[tokio::test]
    async fn clones_share_the_table() {
        let registry = RoleRegistry::new();
        let clone = registry.clone();
        clone.register(Role::Responder, sink_handle()).await;
        assert!(registry.lookup(Role::Responder).await.is_some());
    }

    #[tokio::test]
    async fn concurrent_registrations_keep_one_holder() {
        let registry = RoleRegistry::new();
        let mut tasks = Vec::new();
        for _ in 0..32 {
            let registry = registry.clone();
            tasks.push(tokio::spawn(async move {
                let handle = sink_handle();
                registry.register(Role::Initiator, handle.clone()).await;
                registry.unregister(Role::Initiator, &handle).await;
            }));
        }
        for task in tasks {
            task.await.expect("task");
        }
        assert!(registry.len().await <= 1);
    }

    #[tokio::test]
    async fn handle_send_writes_verbatim() {
        let (client, server) = tokio::io::duplex(256);
        let handle = PeerHandle::new(server);

        handle.send("Hello there!").await.expect("send");
        handle.close().await;

        let mut received = String::new();
        let mut client = client;
        client.read_to_string(&mut received).await.expect("read");
        assert_eq!(received, "Hello there!");
    }

    #[tokio::test]
    async fn handle_send_fails_when_peer_gone() {
        let (client, server) = tokio::io::duplex(256);
        drop(client);
        let handle = PeerHandle::new(server);
        assert!(handle.send("anyone?").await.is_err());
    }

    #[test]
    fn handles_compare_by_connection() {
        let id = ConnectionId::new();
        let a = PeerHandle::with_id(id, tokio::io::sink());
        let b = PeerHandle::with_id(id, tokio::io::sink());
        assert_eq!(a, b);
        assert_ne!(a, sink_handle());
    }
}
