use axum::{Extension, Json, extract::State, response::IntoResponse};
use bigdecimal::BigDecimal;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::AppState;
use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::services::transfer::{self, TransferReceipt};

#[derive(Debug, Deserialize, ToSchema)]
pub struct TransferRequest {
    #[schema(value_type = f64)]
    pub amount: BigDecimal,
    pub description: Option<String>,
}

#[utoipa::path(
    post,
    path = "/transfers",
    request_body = TransferRequest,
    responses(
        (status = 200, description = "Transfer settled", body = TransferReceipt),
        (status = 400, description = "Invalid or below-minimum amount"),
        (status = 422, description = "Amount exceeds available balance")
    ),
    tag = "Transfers"
)]
pub async fn create_transfer(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(payload): Json<TransferRequest>,
) -> Result<impl IntoResponse, AppError> {
    let receipt =
        transfer::request_transfer(&state.db, user_id, payload.amount, payload.description)
            .await?;

    Ok(Json(receipt))
}
