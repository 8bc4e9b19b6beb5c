use kodi_conversation::{DialogueEngine, Lexicon, Tokenizer};
use kodi_core::Role;
use kodi_relay::{PeerClient, RelayConfig, run_responder};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match RelayConfig::from_env() {
        Ok(config) => config,
        Err(report) => {
            tracing::error!(error = ?report, "failed to load configuration");
            std::process::exit(1);
        }
    };

    let mut client =
        match PeerClient::connect(&config.address(), Role::Responder, config.read_buffer_size)
            .await
        {
            Ok(client) => client,
            Err(report) => {
                tracing::error!(error = ?report, "failed to reach relay");
                std::process::exit(1);
            }
        };
    tracing::info!(
        addr = %config.address(),
        role = %client.role(),
        "connected to the relay"
    );

    let engine = DialogueEngine::new(Tokenizer::new(Lexicon::clinic()));
    match run_responder(&mut client, engine).await {
        Ok(context) => tracing::info!(
            state = ?context.state,
            symptom = ?context.symptom,
            appointment_time = ?context.appointment_time,
            "shutting down"
        ),
        Err(report) => {
            tracing::error!(error = ?report, "responder failed");
            std::process::exit(1);
        }
    }
}
