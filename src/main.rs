use std::net::SocketAddr;
use std::sync::Arc;

use daraja_gateway::api::{self, AppState};
use daraja_gateway::config::Config;
use daraja_gateway::payments::providers::MpesaProvider;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;

    // Log startup info
    tracing::info!("Starting Daraja Gateway");
    tracing::info!("Environment: {}", config.server.environment);
    tracing::info!("M-Pesa mode: {}", config.mpesa.mode.as_str());
    tracing::info!("Daraja base URL: {}", config.mpesa.base_url);

    // Build router
    let provider = Arc::new(MpesaProvider::new(config.mpesa.clone()));
    let app = api::router(AppState {
        config: config.clone(),
        provider,
    });

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
