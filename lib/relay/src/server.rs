//! TCP relay server.
//!
//! Accepts connections and runs [`handle_connection`] for each one on its
//! own task. A connection task that panics is caught at the task boundary
//! and its registry entries are released; the accept loop keeps going.

use crate::config::RelayConfig;
use crate::connection::handle_connection;
use crate::error::RelayError;
use crate::registry::{PeerHandle, RoleRegistry};
use kodi_core::Result;
use std::future::Future;
use std::net::SocketAddr;
use tokio::io::AsyncRead;
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info, warn};

/// The relay process: a bound listener plus the shared role registry.
pub struct RelayServer {
    listener: TcpListener,
    registry: RoleRegistry,
    read_buffer_size: usize,
}

impl RelayServer {
    /// Binds the relay to the configured address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound.
    pub async fn bind(config: &RelayConfig) -> Result<Self, RelayError> {
        let addr = config.address();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| RelayError::Bind {
                addr: addr.clone(),
                details: e.to_string(),
            })?;

        Ok(Self {
            listener,
            registry: RoleRegistry::new(),
            read_buffer_size: config.read_buffer_size,
        })
    }

    /// Returns the address the relay is listening on.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket address cannot be read.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Returns a handle to the shared role registry.
    #[must_use]
    pub fn registry(&self) -> RoleRegistry {
        self.registry.clone()
    }

    /// Accepts connections forever.
    pub async fn run(self) {
        self.run_until(std::future::pending()).await;
    }

    /// Accepts connections until `shutdown` resolves.
    ///
    /// Connections already being served keep running on their own tasks.
    pub async fn run_until<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!(addr = ?self.listener.local_addr().ok(), "relay listening");

        loop {
            tokio::select! {
                () = &mut shutdown => {
                    info!("relay shutting down");
                    break;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => self.spawn_connection(stream, peer),
                    Err(e) => warn!(error = %e, "accept failed"),
                },
            }
        }
    }

    fn spawn_connection(&self, stream: TcpStream, peer: SocketAddr) {
        let (reader, writer) = stream.into_split();
        let handle = PeerHandle::new(writer);
        info!(%peer, connection = %handle.id(), "accepted connection");

        tokio::spawn(supervise(
            reader,
            handle,
            self.registry.clone(),
            self.read_buffer_size,
        ));
    }
}

/// Runs one connection on its own task and cleans up after a panic.
async fn supervise<R>(
    reader: R,
    handle: PeerHandle,
    registry: RoleRegistry,
    read_buffer_size: usize,
) where
    R: AsyncRead + Unpin + Send + 'static,
{
    let task = tokio::spawn(handle_connection(
        reader,
        handle.clone(),
        registry.clone(),
        read_buffer_size,
    ));

    if let Err(e) = task.await {
        error!(connection = %handle.id(), error = %e, "connection task failed");
        let released = registry.unregister_all(&handle).await;
        if !released.is_empty() {
            info!(connection = %handle.id(), roles = ?released, "released roles");
        }
        handle.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::NO_PARTNER_NOTICE;
    use crate::peer::PeerClient;
    use kodi_core::Role;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, ReadBuf};

    fn loopback_config() -> RelayConfig {
        RelayConfig {
            port: 0,
            ..RelayConfig::default()
        }
    }

    async fn wait_until_registered(registry: &RoleRegistry, role: Role) {
        for _ in 0..500 {
            if registry.lookup(role).await.is_some() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        panic!("{role} was never registered");
    }

    async fn wait_until_vacant(registry: &RoleRegistry, role: Role) {
        for _ in 0..500 {
            if registry.lookup(role).await.is_none() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        panic!("{role} was never released");
    }

    /// Declares a role on the first read, then panics.
    struct PanicsAfterDeclaring {
        declaration: &'static [u8],
        declared: bool,
    }

    impl AsyncRead for PanicsAfterDeclaring {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<std::io::Result<()>> {
            if self.declared {
                panic!("reader failed mid-conversation");
            }
            self.declared = true;
            buf.put_slice(self.declaration);
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn panicking_connection_releases_its_role() {
        let registry = RoleRegistry::new();
        let (mut peer_side, relay_side) = tokio::io::duplex(256);
        let handle = PeerHandle::new(relay_side);
        let bystander = PeerHandle::new(tokio::io::sink());
        registry.register(Role::Initiator, bystander.clone()).await;

        let reader = PanicsAfterDeclaring {
            declaration: b"BOT",
            declared: false,
        };
        supervise(reader, handle, registry.clone(), 1024).await;

        assert!(registry.lookup(Role::Responder).await.is_none());
        assert_eq!(registry.lookup(Role::Initiator).await, Some(bystander));

        // The write half was shut down, so the peer sees end of stream.
        let mut buf = [0u8; 16];
        let read = tokio::time::timeout(Duration::from_secs(5), peer_side.read(&mut buf))
            .await
            .expect("timed out waiting for shutdown")
            .expect("read");
        assert_eq!(read, 0);
    }

    #[tokio::test]
    async fn bind_failure_is_reported() {
        let server = RelayServer::bind(&loopback_config()).await.expect("bind");
        let taken = RelayConfig {
            port: server.local_addr().expect("addr").port(),
            ..RelayConfig::default()
        };
        assert!(RelayServer::bind(&taken).await.is_err());
    }

    #[tokio::test]
    async fn relays_between_tcp_peers() {
        let server = RelayServer::bind(&loopback_config()).await.expect("bind");
        let addr = server.local_addr().expect("addr").to_string();
        let registry = server.registry();
        let (stop, stopped) = tokio::sync::oneshot::channel::<()>();
        let relay = tokio::spawn(server.run_until(async {
            let _ = stopped.await;
        }));

        let mut user = PeerClient::connect(&addr, Role::Initiator, 1024)
            .await
            .expect("user connects");
        wait_until_registered(&registry, Role::Initiator).await;

        user.send("hi").await.expect("send");
        assert_eq!(
            user.receive().await.expect("receive").as_deref(),
            Some(NO_PARTNER_NOTICE)
        );

        let mut bot = PeerClient::connect(&addr, Role::Responder, 1024)
            .await
            .expect("bot connects");
        wait_until_registered(&registry, Role::Responder).await;

        user.send("hi").await.expect("send");
        assert_eq!(bot.receive().await.expect("receive").as_deref(), Some("hi"));

        bot.send("Hello! How can I help you?").await.expect("send");
        assert_eq!(
            user.receive().await.expect("receive").as_deref(),
            Some("Hello! How can I help you?")
        );

        drop(bot);
        wait_until_vacant(&registry, Role::Responder).await;
        assert!(registry.lookup(Role::Initiator).await.is_some());

        stop.send(()).expect("stop relay");
        relay.await.expect("relay task");
    }
}
