//! Alpaca API response models.
//!
//! Alpaca serializes money and quantities as JSON strings; the accessors
//! parse them into `Decimal` on demand.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaAccount {
    pub id: String,
    pub status: String,
    pub currency: String,
    pub portfolio_value: String,
    pub cash: String,
}

impl AlpacaAccount {
    pub fn portfolio_value_decimal(&self) -> Option<Decimal> {
        Decimal::from_str(&self.portfolio_value).ok()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaPosition {
    pub symbol: String,
    pub qty: String,
    pub market_value: Option<String>,
    pub cost_basis: String,
    #[serde(default)]
    pub currency: Option<String>,
}

impl AlpacaPosition {
    pub fn qty_decimal(&self) -> Decimal {
        Decimal::from_str(&self.qty).unwrap_or_default()
    }

    pub fn market_value_decimal(&self) -> Decimal {
        self.market_value
            .as_deref()
            .and_then(|v| Decimal::from_str(v).ok())
            .unwrap_or_default()
    }

    pub fn cost_basis_decimal(&self) -> Decimal {
        Decimal::from_str(&self.cost_basis).unwrap_or_default()
    }
}

/// Daily equity series from `/v2/account/portfolio/history`.
///
/// `timestamp[i]` is the epoch-seconds bucket start paired with `equity[i]`.
/// Days the API has no value for come back as null.
#[derive(Debug, Clone, Deserialize)]
pub struct PortfolioHistory {
    pub timestamp: Vec<i64>,
    pub equity: Vec<Option<f64>>,
}
