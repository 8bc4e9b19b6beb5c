use kodi_conversation::contains_terminal_marker;
use kodi_core::Role;
use kodi_relay::{PeerClient, RelayConfig};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Logs go to stderr so they stay out of the chat.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match RelayConfig::from_env() {
        Ok(config) => config,
        Err(report) => {
            tracing::error!(error = ?report, "failed to load configuration");
            std::process::exit(1);
        }
    };

    let mut client =
        match PeerClient::connect(&config.address(), Role::Initiator, config.read_buffer_size)
            .await
        {
            Ok(client) => client,
            Err(report) => {
                tracing::error!(error = ?report, "failed to reach relay");
                std::process::exit(1);
            }
        };
    println!("[USER] Connected to the server. Type your messages below.");
    tracing::debug!(role = %client.role(), "declared role");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("You: ");
        if let Err(e) = std::io::stdout().flush() {
            tracing::warn!(error = %e, "failed to flush prompt");
        }

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "failed to read input");
                break;
            }
        };
        let Some(text) = outgoing_message(&line) else {
            continue;
        };

        if let Err(report) = client.send(text).await {
            tracing::error!(error = ?report, "failed to send message");
            break;
        }

        match client.receive().await {
            Ok(Some(reply)) => {
                println!("Kodi: {reply}");
                if contains_terminal_marker(&reply) {
                    println!("[USER] Ending conversation as Kodi said goodbye.");
                    break;
                }
            }
            Ok(None) => {
                println!("[USER] Server closed the connection.");
                break;
            }
            Err(report) => {
                tracing::error!(error = ?report, "failed to receive reply");
                break;
            }
        }
    }
}

/// Returns the text to send for one input line, or `None` for a blank line.
///
/// Kodi does not answer blank messages, so sending one would leave the
/// client waiting for a reply that never comes.
fn outgoing_message(line: &str) -> Option<&str> {
    if line.trim().is_empty() {
        None
    } else {
        Some(line)
    }
}
