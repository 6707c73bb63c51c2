//! Interactive Brokers Client Portal gateway response models.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;

/// One ledger line of `/portfolio/{account}/summary`.
#[derive(Debug, Clone, Deserialize)]
pub struct SummaryValue {
    pub amount: Option<f64>,
    pub currency: Option<String>,
}

/// The summary endpoint returns a map keyed by metric name
/// ("netliquidation", "totalcashvalue", ...).
pub type AccountSummary = HashMap<String, SummaryValue>;

#[derive(Debug, Clone, Deserialize)]
pub struct IbPosition {
    #[serde(rename = "contractDesc")]
    pub contract_desc: String,
    pub position: f64,
    #[serde(rename = "mktValue")]
    pub mkt_value: f64,
    #[serde(rename = "avgCost")]
    pub avg_cost: f64,
    #[serde(default)]
    pub currency: Option<String>,
}

impl IbPosition {
    pub fn quantity_decimal(&self) -> Decimal {
        Decimal::from_f64(self.position).unwrap_or_default()
    }

    pub fn market_value_decimal(&self) -> Decimal {
        Decimal::from_f64(self.mkt_value).unwrap_or_default()
    }

    pub fn cost_basis_decimal(&self) -> Decimal {
        Decimal::from_f64(self.avg_cost * self.position).unwrap_or_default()
    }
}

/// Envelope of `/pa/transactions`.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionsResponse {
    #[serde(default)]
    pub transactions: Vec<serde_json::Value>,
}
