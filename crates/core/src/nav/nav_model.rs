//! NAV domain models.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One published NAV per trading date; the date is the natural key.
///
/// This is a point-in-time fact, not a ledger entry: corrections are an
/// explicit in-place restatement by an administrator, never a second row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavRecord {
    pub nav_date: NaiveDate,
    /// Total account value reported by the brokerage, 2 decimal places.
    pub portfolio_value: Decimal,
    /// Shares outstanding across all investors at publication time, fixed at
    /// creation; 4 decimal places.
    pub total_shares: Decimal,
    /// `portfolio_value / total_shares`, 4 decimal places. Always positive.
    pub nav_per_share: Decimal,
    /// Percent change against the previous published record, when one exists.
    pub day_change_pct: Option<Decimal>,
    pub calculated_at: DateTime<Utc>,
}

/// One position line captured alongside a NAV publication.
///
/// Snapshots are diagnostic: they let an operator reconcile what the
/// brokerage reported against the published valuation. Capturing them is
/// never on the critical path of publication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionSnapshot {
    pub id: String,
    pub snapshot_date: NaiveDate,
    pub source: String,
    pub symbol: String,
    pub quantity: Decimal,
    pub market_value: Decimal,
    pub cost_basis: Decimal,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}
