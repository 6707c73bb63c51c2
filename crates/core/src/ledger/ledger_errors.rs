use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by the share ledger.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// A withdrawal would drive the investor's share balance negative.
    /// Rejected outright, never clamped.
    #[error(
        "Insufficient shares for investor {investor_id}: withdrawal of {requested_amount} needs \
         {required_shares} shares, {current_shares} held"
    )]
    InsufficientShares {
        investor_id: String,
        requested_amount: Decimal,
        required_shares: Decimal,
        current_shares: Decimal,
    },

    /// The entry has already been reversed once; a second reversal would
    /// double-apply the inverse deltas.
    #[error("Ledger entry {0} has already been reversed")]
    AlreadyReversed(String),

    /// Reversal entries are terminal; undoing one means posting the original
    /// again, not reversing the reversal.
    #[error("Ledger entry {0} is itself a reversal and cannot be reversed")]
    CannotReverseReversal(String),

    /// Direct posting of reversal entries is not allowed; use `reverse`.
    #[error("Reversal entries are posted through reverse(), not post()")]
    DirectReversalPost,

    /// Share conservation audit failed for an investor.
    #[error(
        "Share conservation violated for investor {investor_id}: aggregate {aggregate}, \
         ledger sum {entries_total}"
    )]
    ConservationViolation {
        investor_id: String,
        aggregate: Decimal,
        entries_total: Decimal,
    },

    /// Posting against an investor who has been deactivated.
    #[error("Investor {0} is inactive")]
    InvestorInactive(String),
}
