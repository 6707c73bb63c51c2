//! Share ledger domain models.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::investors::Investor;

/// Kind of ownership-affecting event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerEntryKind {
    /// First issuance for a new investor.
    Initial,
    /// Subsequent issuance.
    Contribution,
    /// Redemption via proportional allocation.
    Withdrawal,
    /// Inverse of a prior entry; the only correction mechanism.
    Reversal,
}

impl LedgerEntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerEntryKind::Initial => "INITIAL",
            LedgerEntryKind::Contribution => "CONTRIBUTION",
            LedgerEntryKind::Withdrawal => "WITHDRAWAL",
            LedgerEntryKind::Reversal => "REVERSAL",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "INITIAL" => Some(LedgerEntryKind::Initial),
            "CONTRIBUTION" => Some(LedgerEntryKind::Contribution),
            "WITHDRAWAL" => Some(LedgerEntryKind::Withdrawal),
            "REVERSAL" => Some(LedgerEntryKind::Reversal),
            _ => None,
        }
    }

    /// True for kinds that add shares.
    pub fn is_issuance(&self) -> bool {
        matches!(self, LedgerEntryKind::Initial | LedgerEntryKind::Contribution)
    }
}

/// Immutable ledger record. Never edited or deleted once posted;
/// corrections are new `Reversal` entries with inverted signed fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub id: String,
    pub investor_id: String,
    pub entry_date: NaiveDate,
    pub kind: LedgerEntryKind,
    /// Dollar amount of the event. Negative on reversals of issuances.
    pub amount: Decimal,
    /// Price used for the share math.
    pub nav_per_share: Decimal,
    /// Signed share movement: positive for issuance, negative for redemption.
    pub shares_transacted: Decimal,
    /// Signed cost-basis movement applied to the investor's
    /// `net_investment`. Stored so a reversal can restore the basis exactly
    /// without recomputing a proportion that is no longer recoverable.
    pub basis_delta: Decimal,
    /// The fund-flow request that produced this entry, if any.
    pub fund_flow_id: Option<String>,
    /// For reversals, the entry being reversed.
    pub reverses_entry_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Aggregate movement applied to the investor row in the same transaction
/// as the entry insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateDelta {
    pub investor_id: String,
    pub shares_delta: Decimal,
    pub investment_delta: Decimal,
}

/// Result of an atomic post: the entry plus the investor row as updated by
/// the same transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostedEntry {
    pub entry: LedgerEntry,
    pub investor: Investor,
}
