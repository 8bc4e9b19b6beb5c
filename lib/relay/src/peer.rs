//! Client side of the relay protocol.
//!
//! A peer connects, declares its role as its first message, and then
//! exchanges free-form text with whoever holds the opposite role.

use crate::connection::MessageReader;
use crate::error::PeerError;
use kodi_core::Role;
use kodi_core::Result;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tracing::debug;

/// A peer's connection to the relay.
#[derive(Debug)]
pub struct PeerClient<R, W> {
    role: Role,
    reader: MessageReader<R>,
    writer: W,
}

impl PeerClient<OwnedReadHalf, OwnedWriteHalf> {
    /// Connects to the relay at `addr` and declares `role`.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or the declaration fails.
    pub async fn connect(
        addr: &str,
        role: Role,
        read_buffer_size: usize,
    ) -> Result<Self, PeerError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| PeerError::Connect {
                addr: addr.to_string(),
                details: e.to_string(),
            })?;
        let (reader, writer) = stream.into_split();

        let mut client = Self::from_parts(role, reader, writer, read_buffer_size);
        client.send(role.declaration()).await?;
        debug!(%addr, %role, "connected to relay");
        Ok(client)
    }
}

impl<R, W> PeerClient<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Wraps an already-open stream whose role declaration has been sent.
    pub fn from_parts(role: Role, reader: R, writer: W, read_buffer_size: usize) -> Self {
        Self {
            role,
            reader: MessageReader::new(reader, read_buffer_size),
            writer,
        }
    }

    /// Returns the role this peer declared.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Sends one message.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn send(&mut self, text: &str) -> Result<(), PeerError> {
        self.writer
            .write_all(text.as_bytes())
            .await
            .map_err(|e| PeerError::Send {
                details: e.to_string(),
            })?;
        self.writer.flush().await.map_err(|e| PeerError::Send {
            details: e.to_string(),
        })?;
        Ok(())
    }

    /// Receives the next message, or `None` once the relay has closed.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    pub async fn receive(&mut self) -> Result<Option<String>, PeerError> {
        let message = self
            .reader
            .read_message()
            .await
            .map_err(|e| PeerError::Receive {
                details: e.to_string(),
            })?;
        Ok(message)
    }
}
