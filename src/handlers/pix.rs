//! PIX charge endpoints: QR generation and on-demand status polling.

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::AppState;
use crate::db::{models::Transaction, queries};
use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::validation;

#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateQrRequest {
    #[schema(value_type = f64)]
    pub value: BigDecimal,
    pub description: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GenerateQrResponse {
    pub charge_id: String,
    pub qr_code: String,
    /// Base64-encoded PNG.
    pub qr_code_image: String,
    pub expires_at: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckStatusRequest {
    pub charge_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckStatusResponse {
    pub status: String,
    #[schema(value_type = Option<String>)]
    pub value: Option<BigDecimal>,
    pub paid_at: Option<String>,
}

#[utoipa::path(
    post,
    path = "/pix/qr",
    request_body = GenerateQrRequest,
    responses(
        (status = 201, description = "Charge created", body = GenerateQrResponse),
        (status = 400, description = "Invalid value or description"),
        (status = 502, description = "Payment gateway failure")
    ),
    tag = "PIX"
)]
pub async fn generate_qr(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(payload): Json<GenerateQrRequest>,
) -> Result<impl IntoResponse, AppError> {
    let value = validation::normalize_amount(&payload.value);
    validation::validate_positive_amount("value", &value)?;

    let description = validation::sanitize_string(&payload.description);
    validation::validate_required("description", &description)?;
    validation::validate_max_len("description", &description, validation::DESCRIPTION_MAX_LEN)?;

    // Charge first, ledger second: an upstream failure leaves no partial
    // ledger write.
    let charge = state
        .gateway
        .create_pix_charge(&value, &description)
        .await?;

    let tx = Transaction::income(
        user_id,
        value.clone(),
        description,
        charge.charge_id.clone(),
    );

    if let Err(e) = queries::insert_transaction(&state.db, &tx).await {
        // The charge already exists upstream; log its id so the operator can
        // reconcile the orphaned charge.
        tracing::error!(
            charge_id = %charge.charge_id,
            user_id = %user_id,
            error = %e,
            "ledger write failed after charge creation"
        );
        return Err(e.into());
    }

    tracing::info!(
        charge_id = %charge.charge_id,
        user_id = %user_id,
        value = %value,
        "PIX charge created"
    );

    Ok((
        StatusCode::CREATED,
        Json(GenerateQrResponse {
            charge_id: charge.charge_id,
            qr_code: charge.qr_payload,
            qr_code_image: charge.qr_image,
            expires_at: charge.expires_at,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/pix/status",
    request_body = CheckStatusRequest,
    responses(
        (status = 200, description = "Current charge status", body = CheckStatusResponse),
        (status = 404, description = "Unknown charge"),
        (status = 502, description = "Payment gateway failure")
    ),
    tag = "PIX"
)]
pub async fn check_status(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(payload): Json<CheckStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let charge_id = validation::sanitize_string(&payload.charge_id);
    validation::validate_required("charge_id", &charge_id)?;
    validation::validate_max_len("charge_id", &charge_id, validation::CHARGE_ID_MAX_LEN)?;

    let status = state.gateway.get_payment_status(&charge_id).await?;

    if status.is_received() {
        // Idempotent: a second poll after completion updates nothing.
        let updated = queries::complete_income_payment(&state.db, &charge_id).await?;
        if updated > 0 {
            tracing::info!(
                charge_id = %charge_id,
                user_id = %user_id,
                "income payment confirmed"
            );
        }
    }

    Ok(Json(CheckStatusResponse {
        status: status.status,
        value: status.value,
        paid_at: status.paid_at,
    }))
}
