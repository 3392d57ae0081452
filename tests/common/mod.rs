use axum::Router;
use sqlx::PgPool;
use uuid::Uuid;

use zapix_core::{AppState, config::Config, create_app, gateway::AsaasClient};

pub const TEST_SECRET: &str = "integration-test-secret";

pub fn test_config(database_url: &str, gateway_url: &str) -> Config {
    Config {
        server_port: 0,
        database_url: database_url.to_string(),
        asaas_base_url: gateway_url.to_string(),
        asaas_api_key: "test-key".to_string(),
        auth_token_secret: TEST_SECRET.to_string(),
        gateway_timeout_secs: 5,
    }
}

pub fn build_app(pool: PgPool, config: &Config) -> Router {
    let gateway = AsaasClient::new(
        config.asaas_base_url.clone(),
        config.asaas_api_key.clone(),
        config.gateway_timeout_secs,
    );
    create_app(AppState { db: pool, gateway }, config)
}

pub fn bearer_token(user_id: Uuid) -> String {
    format!(
        "Bearer {}",
        zapix_core::middleware::auth::mint_token(TEST_SECRET, user_id)
    )
}
