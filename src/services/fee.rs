//! Outbound transfer fee policy: a fixed 2% cut, rounded to BRL cents.

use bigdecimal::BigDecimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::validation::AMOUNT_SCALE;

/// Fee rate numerator over [`FEE_RATE_DENOMINATOR`]: 2%.
pub const FEE_RATE_NUMERATOR: i64 = 2;
pub const FEE_RATE_DENOMINATOR: i64 = 100;

/// Smallest transfer the orchestrator accepts, in BRL.
pub const MINIMUM_TRANSFER_BRL: i64 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FeeQuote {
    #[schema(value_type = String)]
    pub fee: BigDecimal,
    #[schema(value_type = String)]
    pub net_amount: BigDecimal,
}

pub fn minimum_transfer() -> BigDecimal {
    BigDecimal::from(MINIMUM_TRANSFER_BRL)
}

/// Quote the fee split for a requested amount: `fee = round(amount * 2%, 2)`
/// and `net_amount = amount - fee`, so the two always re-add to the amount.
pub fn quote(amount: &BigDecimal) -> FeeQuote {
    let rate = BigDecimal::from(FEE_RATE_NUMERATOR) / BigDecimal::from(FEE_RATE_DENOMINATOR);
    let fee = (amount * rate).round(AMOUNT_SCALE);
    let net_amount = amount - &fee;

    FeeQuote { fee, net_amount }
}
