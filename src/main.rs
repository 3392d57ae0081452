use sqlx::migrate::Migrator;
use std::net::SocketAddr;
use std::path::Path;
use tokio::net::TcpListener;
use tracing_subscriber::prelude::*;

use zapix_core::{AppState, config, create_app, db, gateway::AsaasClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::Config::from_env()?;

    // Setup logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database pool
    let pool = db::create_pool(&config).await?;

    // Run migrations
    let migrator = Migrator::new(Path::new("./migrations")).await?;
    migrator.run(&pool).await?;
    tracing::info!("Database migrations completed");

    // Payment gateway client
    let gateway = AsaasClient::new(
        config.asaas_base_url.clone(),
        config.asaas_api_key.clone(),
        config.gateway_timeout_secs,
    );
    tracing::info!("Asaas client initialized with URL: {}", config.asaas_base_url);

    let app_state = AppState {
        db: pool,
        gateway,
    };
    let app = create_app(app_state, &config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
