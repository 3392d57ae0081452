use axum::{Extension, Json, extract::{Query, State}, response::IntoResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::AppState;
use crate::db::{models::Transaction, queries};
use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::services::balance::{self, BalanceSummary};

#[derive(Debug, Deserialize, ToSchema)]
pub struct Pagination {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionListResponse {
    /// One page of the ledger, newest first.
    pub transactions: Vec<Transaction>,
    /// Derived from the user's full snapshot, not just this page.
    pub summary: BalanceSummary,
}

#[utoipa::path(
    get,
    path = "/transactions",
    params(
        ("limit" = Option<i64>, Query, description = "Page size, default 50"),
        ("offset" = Option<i64>, Query, description = "Page offset, default 0")
    ),
    responses(
        (status = 200, description = "Ledger page and balance summary", body = TransactionListResponse)
    ),
    tag = "Transactions"
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Query(pagination): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let limit = pagination.limit.unwrap_or(50).clamp(1, 500);
    let offset = pagination.offset.unwrap_or(0).max(0);

    let transactions = queries::list_transactions(&state.db, user_id, limit, offset).await?;

    // Balance must come from the full snapshot, never from the page or a
    // client-supplied value.
    let snapshot = queries::ledger_snapshot(&state.db, user_id).await?;
    let summary = balance::summarize(&snapshot, Utc::now());

    Ok(Json(TransactionListResponse {
        transactions,
        summary,
    }))
}
