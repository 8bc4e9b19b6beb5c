use kodi_relay::{RelayConfig, RelayServer};
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

    // Load configuration from environment
    let config = match RelayConfig::from_env() {
        Ok(config) => config,
        Err(report) => {
            tracing::error!(error = ?report, "failed to load configuration");
            std::process::exit(1);
        }
    };
    tracing::info!(addr = %config.address(), "Loaded configuration");

    let server = match RelayServer::bind(&config).await {
        Ok(server) => server,
        Err(report) => {
            tracing::error!(error = ?report, "failed to start relay");
            std::process::exit(1);
        }
    };

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        })
        .await;
}
