use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by the NAV computation engine.
#[derive(Error, Debug)]
pub enum NavError {
    /// The fund has no shares outstanding, so a per-share price is undefined.
    #[error("Cannot compute NAV for {date}: total shares outstanding is {total_shares}")]
    NoSharesOutstanding {
        date: NaiveDate,
        total_shares: Decimal,
    },

    /// The computed per-share value would be zero or negative. NAV can never
    /// be negative; a non-positive valuation must be surfaced, not stored.
    #[error("Refusing NAV {nav_per_share} for {date} (portfolio value {portfolio_value})")]
    InvalidNav {
        date: NaiveDate,
        portfolio_value: Decimal,
        nav_per_share: Decimal,
    },

    /// A record for this date already exists; publishing is write-once and
    /// corrections go through the explicit admin operation.
    #[error("NAV for {0} is already published; use the correction operation to restate it")]
    AlreadyPublished(NaiveDate),

    /// No record exists on or before the requested date.
    #[error("No NAV available on or before {0}")]
    NotAvailable(NaiveDate),

    /// Fund-level share equality audit failed: the ledger total diverges
    /// from the latest record's shares outstanding.
    #[error("Shares outstanding mismatch: NAV record has {nav_total}, ledger total is {ledger_total}")]
    ShareMismatch {
        nav_total: Decimal,
        ledger_total: Decimal,
    },
}
