pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod validation;

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::gateway::AsaasClient;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub gateway: AsaasClient,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::pix::generate_qr,
        handlers::pix::check_status,
        handlers::transfers::create_transfer,
        handlers::transactions::list_transactions,
    ),
    components(schemas(
        handlers::HealthStatus,
        handlers::DbPoolStats,
        handlers::pix::GenerateQrRequest,
        handlers::pix::GenerateQrResponse,
        handlers::pix::CheckStatusRequest,
        handlers::pix::CheckStatusResponse,
        handlers::transfers::TransferRequest,
        handlers::transactions::TransactionListResponse,
        db::models::Transaction,
        db::models::TransactionKind,
        db::models::TransactionStatus,
        services::balance::BalanceSummary,
        services::transfer::TransferReceipt,
    )),
    tags(
        (name = "Health", description = "Service health"),
        (name = "PIX", description = "PIX charge creation and status polling"),
        (name = "Transfers", description = "Balance transfers to the external exchange"),
        (name = "Transactions", description = "Per-user transaction ledger"),
    )
)]
pub struct ApiDoc;

pub fn create_app(state: AppState, config: &config::Config) -> Router {
    // Every business route requires an authenticated user; /health and the
    // API docs stay open.
    let protected = Router::new()
        .route("/pix/qr", post(handlers::pix::generate_qr))
        .route("/pix/status", post(handlers::pix::check_status))
        .route("/transfers", post(handlers::transfers::create_transfer))
        .route("/transactions", get(handlers::transactions::list_transactions))
        .route_layer(axum_middleware::from_fn_with_state(
            config.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(protected)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(axum_middleware::from_fn(
            middleware::request_logger::request_logger_middleware,
        ))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
