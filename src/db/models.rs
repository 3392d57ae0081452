use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Direction of a ledger entry: money received via PIX or sent to the
/// external exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "transaction_kind", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    Income,
    Transfer,
}

/// INCOME rows start PENDING and are flipped to COMPLETED once the gateway
/// confirms receipt. TRANSFER rows are created COMPLETED (synchronous
/// settlement). CANCELLED is terminal and never contributes to balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "transaction_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Cancelled,
}

/// A row in the per-user transaction ledger. Append-only except for the
/// single PENDING -> COMPLETED transition on INCOME rows.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    #[schema(value_type = String)]
    pub value: BigDecimal,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub description: Option<String>,
    pub external_payment_id: Option<String>,
    #[schema(value_type = Option<String>)]
    pub retained_amount: Option<BigDecimal>,
    #[schema(value_type = Option<String>)]
    pub sent_amount: Option<BigDecimal>,
    pub destination_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// A PIX charge awaiting payment. Linked to the gateway charge via
    /// `external_payment_id`.
    pub fn income(
        user_id: Uuid,
        value: BigDecimal,
        description: String,
        external_payment_id: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            value,
            kind: TransactionKind::Income,
            status: TransactionStatus::Pending,
            description: Some(description),
            external_payment_id: Some(external_payment_id),
            retained_amount: None,
            sent_amount: None,
            destination_address: None,
            created_at: Utc::now(),
        }
    }

    /// An outbound transfer, settled synchronously: created COMPLETED with
    /// the fee split recorded on the row.
    pub fn transfer(
        user_id: Uuid,
        value: BigDecimal,
        description: Option<String>,
        retained_amount: BigDecimal,
        sent_amount: BigDecimal,
        destination_address: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            value,
            kind: TransactionKind::Transfer,
            status: TransactionStatus::Completed,
            description,
            external_payment_id: None,
            retained_amount: Some(retained_amount),
            sent_amount: Some(sent_amount),
            destination_address: Some(destination_address),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn income_starts_pending() {
        let tx = Transaction::income(
            Uuid::new_v4(),
            BigDecimal::from(100),
            "PIX charge".to_string(),
            "pay_123".to_string(),
        );

        assert_eq!(tx.kind, TransactionKind::Income);
        assert_eq!(tx.status, TransactionStatus::Pending);
        assert_eq!(tx.external_payment_id.as_deref(), Some("pay_123"));
        assert!(tx.retained_amount.is_none());
        assert!(tx.sent_amount.is_none());
    }

    #[test]
    fn transfer_is_created_completed_with_fee_split() {
        let value = BigDecimal::from(50);
        let fee = BigDecimal::from_str("1.00").unwrap();
        let sent = BigDecimal::from_str("49.00").unwrap();

        let tx = Transaction::transfer(
            Uuid::new_v4(),
            value.clone(),
            None,
            fee.clone(),
            sent.clone(),
            "Bitfinex Exchange".to_string(),
        );

        assert_eq!(tx.kind, TransactionKind::Transfer);
        assert_eq!(tx.status, TransactionStatus::Completed);
        assert_eq!(tx.retained_amount.unwrap() + tx.sent_amount.unwrap(), value);
        assert_eq!(tx.destination_address.as_deref(), Some("Bitfinex Exchange"));
    }

    #[test]
    fn kind_serializes_uppercase() {
        assert_eq!(
            serde_json::to_string(&TransactionKind::Income).unwrap(),
            "\"INCOME\""
        );
        assert_eq!(
            serde_json::to_string(&TransactionStatus::Completed).unwrap(),
            "\"COMPLETED\""
        );
    }
}
