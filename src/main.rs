use aquaflow::{AppState, Config, insights::InsightsClient, load_data, router};
use std::net::SocketAddr;
use tokio::fs;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    fs::create_dir_all(&config.data_dir).await?;

    let data = load_data(&config.data_dir).await;
    info!(
        "loaded {} entries from {}",
        data.entries.len(),
        config.data_dir.display()
    );
    if config.llm.api_key.is_none() {
        warn!("AQUAFLOW_LLM_API_KEY not set, insights will return the fallback message");
    }

    let insights = InsightsClient::new(config.llm.clone())?;
    let state = AppState::new(config.data_dir.clone(), data, insights);
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
