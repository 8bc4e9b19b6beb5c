//! Responder peer loop.
//!
//! Every message relayed to the responder is run through its dialogue
//! engine and the reply sent back. The conversation ends once a reply
//! carries the terminal marker, or when the relay closes the stream.

use crate::connection::NO_PARTNER_NOTICE;
use crate::error::PeerError;
use crate::peer::PeerClient;
use kodi_conversation::{ConversationContext, DialogueEngine, contains_terminal_marker};
use kodi_core::Result;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info};

/// Answers relayed messages until the conversation ends.
///
/// Blank messages and the relay's own no-partner notice are skipped rather
/// than fed to the engine. Returns the final conversation context.
///
/// # Errors
///
/// Returns an error if sending or receiving fails.
pub async fn run_responder<R, W>(
    client: &mut PeerClient<R, W>,
    mut engine: DialogueEngine,
) -> Result<ConversationContext, PeerError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    while let Some(message) = client.receive().await? {
        let text = message.trim();
        if text.is_empty() || text == NO_PARTNER_NOTICE {
            debug!(message = %text, "skipping");
            continue;
        }

        let reply = engine.respond(text);
        debug!(state = ?engine.state(), "replying");
        client.send(&reply).await?;

        if contains_terminal_marker(&reply) {
            info!("conversation ended");
            return Ok(engine.into_context());
        }
    }

    info!(state = ?engine.state(), "relay closed the connection");
    Ok(engine.into_context())
}
