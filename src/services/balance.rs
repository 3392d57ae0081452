//! Balance derivation over a user's ledger snapshot.
//!
//! Balance is never stored. Every read recomputes it from the completed
//! ledger rows so a stale cached value can never be trusted by a caller.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::db::models::{Transaction, TransactionKind, TransactionStatus};
use crate::validation::AMOUNT_SCALE;

/// Derived view of a ledger snapshot. All money fields are BRL.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BalanceSummary {
    /// Completed income minus completed transfers.
    #[schema(value_type = String)]
    pub balance: BigDecimal,
    #[schema(value_type = String)]
    pub total_income: BigDecimal,
    #[schema(value_type = String)]
    pub total_transfers: BigDecimal,
    /// Sum over PENDING rows of any kind.
    #[schema(value_type = String)]
    pub pending_amount: BigDecimal,
    /// Mean face value over every row regardless of kind or status.
    #[schema(value_type = String)]
    pub average_transaction: BigDecimal,
    /// Completed rows created in the trailing 7 days as a percentage of all
    /// rows. Not a true period-over-period growth rate; kept as the source
    /// system defined it.
    pub weekly_growth: f64,
}

impl BalanceSummary {
    fn empty() -> Self {
        Self {
            balance: BigDecimal::from(0),
            total_income: BigDecimal::from(0),
            total_transfers: BigDecimal::from(0),
            pending_amount: BigDecimal::from(0),
            average_transaction: BigDecimal::from(0),
            weekly_growth: 0.0,
        }
    }
}

/// Compute the summary for one user's full snapshot. Pure: never mutates
/// rows, tolerates an empty slice (all outputs zero). `now` anchors the
/// weekly-growth window.
pub fn summarize(transactions: &[Transaction], now: DateTime<Utc>) -> BalanceSummary {
    if transactions.is_empty() {
        return BalanceSummary::empty();
    }

    let mut total_income = BigDecimal::from(0);
    let mut total_transfers = BigDecimal::from(0);
    let mut pending_amount = BigDecimal::from(0);
    let mut total_value = BigDecimal::from(0);
    let mut completed_this_week = 0usize;

    let week_ago = now - Duration::days(7);

    for tx in transactions {
        total_value += &tx.value;

        match tx.status {
            TransactionStatus::Completed => {
                match tx.kind {
                    TransactionKind::Income => total_income += &tx.value,
                    TransactionKind::Transfer => total_transfers += &tx.value,
                }
                if tx.created_at > week_ago {
                    completed_this_week += 1;
                }
            }
            TransactionStatus::Pending => pending_amount += &tx.value,
            TransactionStatus::Cancelled => {}
        }
    }

    let count = transactions.len();
    let average_transaction = (total_value / BigDecimal::from(count as i64)).round(AMOUNT_SCALE);
    let weekly_growth = completed_this_week as f64 / count as f64 * 100.0;

    BalanceSummary {
        balance: &total_income - &total_transfers,
        total_income,
        total_transfers,
        pending_amount,
        average_transaction,
        weekly_growth,
    }
}
