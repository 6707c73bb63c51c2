//! Tax domain models and configuration.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::tax_errors::TaxError;

/// How realized gains are settled.
///
/// The policy in force when an event is booked is stored on the event, so
/// history stays interpretable after a policy change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaxPolicy {
    /// Tax is withheld from each withdrawal's proceeds.
    #[default]
    Withholding,
    /// Gains are recorded per withdrawal and settled in quarterly
    /// aggregates; nothing is withheld at redemption time.
    QuarterlySettlement,
}

impl TaxPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaxPolicy::Withholding => "WITHHOLDING",
            TaxPolicy::QuarterlySettlement => "QUARTERLY_SETTLEMENT",
        }
    }

    pub fn parse(value: &str) -> Result<Self, TaxError> {
        match value {
            "WITHHOLDING" => Ok(TaxPolicy::Withholding),
            "QUARTERLY_SETTLEMENT" => Ok(TaxPolicy::QuarterlySettlement),
            other => Err(TaxError::UnknownPolicy(other.to_string())),
        }
    }
}

/// Explicit configuration handed to the engines at construction time.
/// Nothing reads tax policy from ambient state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxConfig {
    pub policy: TaxPolicy,
    /// Capital-gains rate, e.g. 0.37.
    pub rate: Decimal,
}

/// A booked realized-gain record, created once per redemption with positive
/// gain. Never mutated; an erroneous event is undone by a compensating
/// event with negated amounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxEvent {
    pub id: String,
    pub investor_id: String,
    pub event_date: NaiveDate,
    pub withdrawal_amount: Decimal,
    pub realized_gain: Decimal,
    /// Zero under the quarterly-settlement policy.
    pub tax_due: Decimal,
    pub policy: TaxPolicy,
    /// The withdrawal (or reversal) ledger entry this event belongs to.
    pub ledger_entry_id: String,
    /// For compensating events, the event being reversed.
    pub reverses_event_id: Option<String>,
    pub created_at: DateTime<Utc>,
}
