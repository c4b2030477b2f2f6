mod api;
mod error;
mod router;
mod state;

use std::sync::Arc;

use tracing::info;

use calcgrid_compute::Scheduler;

use crate::state::AppState;

fn load_config() -> anyhow::Result<calcgrid_core::Config> {
    calcgrid_core::config::load_dotenv();
    Ok(calcgrid_core::Config::from_env()?)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = load_config()?;
    config.log_summary();

    let addr = config.server.bind_addr();
    let state = Arc::new(AppState::new(Scheduler::with_calculator(), config));
    let app = router::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Orchestrator listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
