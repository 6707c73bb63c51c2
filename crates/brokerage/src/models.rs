//! Source-agnostic models returned by brokerage providers.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single open position as reported by a brokerage on a given date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub quantity: Decimal,
    pub market_value: Decimal,
    pub cost_basis: Decimal,
    pub currency: String,
}

/// One transaction exactly as the brokerage reported it.
///
/// The payload is kept verbatim; classification into a canonical trade is
/// the reconciliation pipeline's job, not the provider's. `external_id`
/// together with the source identifier is the dedupe key downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
    pub external_id: String,
    pub transacted_on: Option<NaiveDate>,
    pub payload: serde_json::Value,
}
