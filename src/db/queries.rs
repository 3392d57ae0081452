use bigdecimal::BigDecimal;
use sqlx::{PgPool, Result};
use uuid::Uuid;

use crate::db::models::Transaction;

// --- Ledger queries ---
//
// The ledger is append-only. The only update path is the idempotent
// PENDING -> COMPLETED flip on INCOME rows driven by a gateway status poll.

pub async fn insert_transaction(pool: &PgPool, tx: &Transaction) -> Result<Transaction> {
    sqlx::query_as::<_, Transaction>(
        r#"
        INSERT INTO transactions (
            id, user_id, value, kind, status, description,
            external_payment_id, retained_amount, sent_amount, destination_address, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING *
        "#,
    )
    .bind(tx.id)
    .bind(tx.user_id)
    .bind(&tx.value)
    .bind(tx.kind)
    .bind(tx.status)
    .bind(&tx.description)
    .bind(&tx.external_payment_id)
    .bind(&tx.retained_amount)
    .bind(&tx.sent_amount)
    .bind(&tx.destination_address)
    .bind(tx.created_at)
    .fetch_one(pool)
    .await
}

/// One page of a user's ledger, newest first.
pub async fn list_transactions(
    pool: &PgPool,
    user_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<Transaction>> {
    sqlx::query_as::<_, Transaction>(
        "SELECT * FROM transactions WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
    )
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

/// The user's full ledger snapshot, newest first. Balance and the derived
/// metrics are always computed from this, never from a cached value.
pub async fn ledger_snapshot(pool: &PgPool, user_id: Uuid) -> Result<Vec<Transaction>> {
    sqlx::query_as::<_, Transaction>(
        "SELECT * FROM transactions WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Flip the INCOME row matching a gateway charge to COMPLETED. Idempotent:
/// already-completed rows match nothing and the call is a no-op. Returns the
/// number of rows updated (0 or 1).
pub async fn complete_income_payment(pool: &PgPool, external_payment_id: &str) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE transactions
        SET status = 'COMPLETED'
        WHERE external_payment_id = $1
          AND kind = 'INCOME'
          AND status = 'PENDING'
        "#,
    )
    .bind(external_payment_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Append a TRANSFER row only if the user's completed balance covers the
/// amount, as one guarded statement under a per-user advisory lock.
///
/// The lock serializes concurrent transfer requests for the same user, so
/// two requests cannot both pass a stale balance check and jointly overdraw.
/// Returns `None` when the balance does not cover the amount.
pub async fn insert_transfer_if_covered(
    pool: &PgPool,
    tx: &Transaction,
) -> Result<Option<Transaction>> {
    let mut db_tx = pool.begin().await?;

    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::text, 0))")
        .bind(tx.user_id)
        .execute(&mut *db_tx)
        .await?;

    let inserted = sqlx::query_as::<_, Transaction>(
        r#"
        INSERT INTO transactions (
            id, user_id, value, kind, status, description,
            external_payment_id, retained_amount, sent_amount, destination_address, created_at
        )
        SELECT $1, $2, $3, 'TRANSFER'::transaction_kind, 'COMPLETED'::transaction_status,
               $4, NULL, $5, $6, $7, $8
        WHERE (
            SELECT COALESCE(SUM(CASE WHEN kind = 'INCOME' THEN value ELSE -value END), 0)
            FROM transactions
            WHERE user_id = $2 AND status = 'COMPLETED'
        ) >= $3
        RETURNING *
        "#,
    )
    .bind(tx.id)
    .bind(tx.user_id)
    .bind(&tx.value)
    .bind(&tx.description)
    .bind(&tx.retained_amount)
    .bind(&tx.sent_amount)
    .bind(&tx.destination_address)
    .bind(tx.created_at)
    .fetch_optional(&mut *db_tx)
    .await?;

    db_tx.commit().await?;
    Ok(inserted)
}

/// Completed balance for a user, computed in SQL. Matches the guard inside
/// [`insert_transfer_if_covered`]; request paths derive balance from the
/// full snapshot instead.
pub async fn completed_balance(pool: &PgPool, user_id: Uuid) -> Result<BigDecimal> {
    let (balance,): (BigDecimal,) = sqlx::query_as(
        r#"
        SELECT COALESCE(SUM(CASE WHEN kind = 'INCOME' THEN value ELSE -value END), 0)
        FROM transactions
        WHERE user_id = $1 AND status = 'COMPLETED'
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(balance)
}
