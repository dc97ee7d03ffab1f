//! # `docbot-server`
//!
//! The HTTP face of the bot: a webhook the (already authenticated) messaging
//! transport posts each inbound message to, answered synchronously with the
//! generated reply.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod router;
pub mod state;

use config::Config;
use router::create_router;
use state::build_app_state;
use tracing::info;

/// Builds the application state and serves on `listener` until shutdown.
pub async fn run(listener: tokio::net::TcpListener, config: Config) -> anyhow::Result<()> {
    let app_state = build_app_state(config).await?;
    let app = create_router(app_state);

    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
