//! Per-connection relay loop.
//!
//! A connection declares its role in its first message, is registered under
//! that role, and from then on every message it sends is forwarded verbatim
//! to whichever connection holds the opposite role. With no partner
//! registered the sender gets [`NO_PARTNER_NOTICE`] back; nothing is queued.

use crate::registry::{PeerHandle, RoleRegistry};
use kodi_core::Role;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, info, instrument, warn};

/// Reply sent to a peer whose partner role is not registered.
pub const NO_PARTNER_NOTICE: &str = "No partner connected yet.";

/// Reads application messages from a stream.
///
/// Framing is read-atomic: each successful read of up to the buffer size is
/// one message. The relay forwards the raw bytes; peers decode them as
/// UTF-8, replacing invalid sequences.
#[derive(Debug)]
pub struct MessageReader<R> {
    inner: R,
    buffer: Vec<u8>,
}

impl<R: AsyncRead + Unpin> MessageReader<R> {
    /// Creates a reader with the given per-message buffer size.
    pub fn new(inner: R, buffer_size: usize) -> Self {
        Self {
            inner,
            buffer: vec![0; buffer_size.max(1)],
        }
    }

    /// Reads the next message as raw bytes, or `None` once the stream is
    /// closed.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the read fails.
    pub async fn read_bytes(&mut self) -> std::io::Result<Option<&[u8]>> {
        let read = self.inner.read(&mut self.buffer).await?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(&self.buffer[..read]))
    }

    /// Reads the next message as text, or `None` once the stream is closed.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the read fails.
    pub async fn read_message(&mut self) -> std::io::Result<Option<String>> {
        let message = self.read_bytes().await?;
        Ok(message.map(|bytes| String::from_utf8_lossy(bytes).into_owned()))
    }
}

/// Serves one relay connection until it disconnects.
///
/// `handle` is the write side of the same connection `reader` reads from.
/// Returns the role the connection declared, or `None` if it closed before
/// declaring one. Read failures end the connection like a clean close;
/// either way the role entry is released and the write side shut down.
#[instrument(skip_all, fields(connection = %handle.id()))]
pub async fn handle_connection<R>(
    reader: R,
    handle: PeerHandle,
    registry: RoleRegistry,
    read_buffer_size: usize,
) -> Option<Role>
where
    R: AsyncRead + Unpin,
{
    let mut reader = MessageReader::new(reader, read_buffer_size);

    let declaration = match reader.read_message().await {
        Ok(Some(declaration)) => declaration,
        Ok(None) => {
            debug!("connection closed before declaring a role");
            handle.close().await;
            return None;
        }
        Err(e) => {
            warn!(error = %e, "failed to read role declaration");
            handle.close().await;
            return None;
        }
    };

    let role = Role::from_declaration(&declaration);
    if let Some(evicted) = registry.register(role, handle.clone()).await {
        info!(%role, evicted = %evicted.id(), "replaced previous holder");
    }
    info!(%role, "registered");

    relay_messages(&mut reader, role, &handle, &registry).await;

    registry.unregister(role, &handle).await;
    handle.close().await;
    info!(%role, "connection closed");
    Some(role)
}

async fn relay_messages<R>(
    reader: &mut MessageReader<R>,
    role: Role,
    handle: &PeerHandle,
    registry: &RoleRegistry,
) where
    R: AsyncRead + Unpin,
{
    let partner_role = role.opposite();

    loop {
        let message = match reader.read_bytes().await {
            Ok(Some(message)) => message,
            Ok(None) => {
                debug!(%role, "peer closed the stream");
                return;
            }
            Err(e) => {
                warn!(%role, error = %e, "read failed");
                return;
            }
        };

        match registry.lookup(partner_role).await {
            Some(partner) => {
                if let Err(report) = partner.send_bytes(message).await {
                    warn!(
                        partner = %partner.id(),
                        error = ?report,
                        "forward failed, dropping partner"
                    );
                    registry.unregister(partner_role, &partner).await;
                } else {
                    debug!(partner = %partner.id(), bytes = message.len(), "forwarded");
                }
            }
            None => {
                if let Err(report) = handle.send(NO_PARTNER_NOTICE).await {
                    warn!(error = ?report, "failed to send notice");
                    return;
                }
            }
        }
    }
}
