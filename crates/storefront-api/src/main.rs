//! Storefront API server
//!
//! ```bash
//! storefront-api --config storefront.toml
//! STOREFRONT_COMMERCE_ENDPOINT=https://store.example.com/graphql storefront-api
//! ```

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use storefront_api::{build_router, AppConfig, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "storefront-api")]
#[command(version)]
#[command(about = "Storefront review and country API", long_about = None)]
struct Cli {
    /// TOML config file
    #[arg(long, short, env = "STOREFRONT_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, overrides server.bind
    #[arg(long, env = "STOREFRONT_BIND")]
    bind: Option<String>,

    /// Commerce GraphQL endpoint, overrides commerce.endpoint
    #[arg(long, env = "STOREFRONT_COMMERCE_ENDPOINT")]
    commerce_endpoint: Option<String>,

    /// Commerce API token, overrides commerce.token
    #[arg(long, env = "STOREFRONT_COMMERCE_TOKEN", hide_env_values = true)]
    commerce_token: Option<String>,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<AppConfig> {
        let mut config = AppConfig::load(self.config.as_deref())?;
        if let Some(bind) = self.bind {
            config.server.bind = bind;
        }
        if let Some(endpoint) = self.commerce_endpoint {
            config.commerce.endpoint = Some(endpoint);
        }
        if let Some(token) = self.commerce_token {
            config.commerce.token = Some(token);
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Cli::parse().into_config()?;
    let state = AppState::from_config(&config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("cannot bind {}", config.server.bind))?;
    tracing::info!("Storefront API listening on {}", config.server.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
