//! Transfer orchestration: validate, quote the fee, append the ledger row.
//!
//! Transfers settle synchronously: the row is created COMPLETED in the same
//! request, while INCOME rows wait for an external confirmation. That
//! asymmetry is inherited from the source system on purpose; there is no
//! pending state or confirmation leg for outbound transfers.

use bigdecimal::BigDecimal;
use serde::Serialize;
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::models::Transaction;
use crate::db::queries;
use crate::error::AppError;
use crate::services::fee;
use crate::validation;

/// Fixed label recorded as the destination of every transfer.
pub const TRANSFER_DESTINATION: &str = "Bitfinex Exchange";
pub const DEFAULT_TRANSFER_DESCRIPTION: &str = "Transfer to Bitfinex";

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransferReceipt {
    #[schema(value_type = String)]
    pub transferred_amount: BigDecimal,
    #[schema(value_type = String)]
    pub fee: BigDecimal,
    #[schema(value_type = String)]
    pub sent_amount: BigDecimal,
}

/// Checks that run before any ledger read or write. Failures here must leave
/// the ledger untouched.
pub fn validate_transfer_amount(amount: &BigDecimal) -> Result<(), AppError> {
    validation::validate_positive_amount("amount", amount)?;

    if amount < &fee::minimum_transfer() {
        return Err(AppError::Validation(format!(
            "amount: must be at least {} BRL",
            fee::MINIMUM_TRANSFER_BRL
        )));
    }

    Ok(())
}

/// Request a transfer of accumulated balance to the external exchange.
///
/// Balance is recomputed inside the ledger store at insert time, never taken
/// from the caller, so concurrent requests cannot jointly overdraw.
pub async fn request_transfer(
    pool: &PgPool,
    user_id: Uuid,
    amount: BigDecimal,
    description: Option<String>,
) -> Result<TransferReceipt, AppError> {
    let amount = validation::normalize_amount(&amount);
    validate_transfer_amount(&amount)?;

    let description = description
        .map(|d| validation::sanitize_string(&d))
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| DEFAULT_TRANSFER_DESCRIPTION.to_string());
    validation::validate_max_len("description", &description, validation::DESCRIPTION_MAX_LEN)?;

    let quote = fee::quote(&amount);
    let tx = Transaction::transfer(
        user_id,
        amount.clone(),
        Some(description),
        quote.fee.clone(),
        quote.net_amount.clone(),
        TRANSFER_DESTINATION.to_string(),
    );

    let Some(inserted) = queries::insert_transfer_if_covered(pool, &tx).await? else {
        return Err(AppError::InsufficientBalance(
            "amount exceeds available balance".to_string(),
        ));
    };

    tracing::info!(
        transaction_id = %inserted.id,
        user_id = %user_id,
        amount = %amount,
        fee = %quote.fee,
        "transfer recorded"
    );

    Ok(TransferReceipt {
        transferred_amount: amount,
        fee: quote.fee,
        sent_amount: quote.net_amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn rejects_non_positive_amounts() {
        assert!(matches!(
            validate_transfer_amount(&dec("0")),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_transfer_amount(&dec("-5")),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn rejects_amounts_below_minimum() {
        assert!(matches!(
            validate_transfer_amount(&dec("5")),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_transfer_amount(&dec("9.99")),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn accepts_minimum_and_above() {
        assert!(validate_transfer_amount(&dec("10")).is_ok());
        assert!(validate_transfer_amount(&dec("10.01")).is_ok());
        assert!(validate_transfer_amount(&dec("5000")).is_ok());
    }
}
