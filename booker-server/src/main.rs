use booker_server::config::ServerConfig;
use booker_server::store::Store;
use booker_server::web::{AppState, create_router};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "booker_server=info,tower_http=info";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let store = Store::connect(&config.store).await?;

    let state = AppState::new(store, config.policy.build(), config.public_url);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, policy = ?config.policy, "booker server listening");
    info!("  GET  /              - API root");
    info!("  GET  /health        - Health check");
    info!("  *    /passenger/ /driver/ /bus/ /routes/ /booking/");
    info!("  GET  /admin/        - Administration console");

    axum::serve(listener, app).await?;
    Ok(())
}
