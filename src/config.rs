use dotenvy::dotenv;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server_port: u16,
    pub database_url: String,
    pub asaas_base_url: String,
    pub asaas_api_key: String,
    pub auth_token_secret: String,
    pub gateway_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok(); // Load .env file if present

        Ok(Config {
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            database_url: env::var("DATABASE_URL")?,
            asaas_base_url: env::var("ASAAS_BASE_URL")
                .unwrap_or_else(|_| "https://www.asaas.com/api/v3".to_string()),
            asaas_api_key: env::var("ASAAS_API_KEY")?,
            auth_token_secret: env::var("AUTH_TOKEN_SECRET")?,
            gateway_timeout_secs: env::var("GATEWAY_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()?,
        })
    }
}
