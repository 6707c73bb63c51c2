use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::ledger_model::{AggregateDelta, LedgerEntry, PostedEntry};
use crate::tax::TaxEvent;
use crate::Result;

/// Trait defining the contract for share ledger repository operations.
///
/// Deliberately append-only: there is no update or delete for posted
/// entries anywhere in this contract. Corrections happen by posting
/// reversal entries.
#[async_trait]
pub trait LedgerRepositoryTrait: Send + Sync {
    fn get_entry(&self, entry_id: &str) -> Result<LedgerEntry>;
    fn get_entries(&self) -> Result<Vec<LedgerEntry>>;
    fn get_entries_for_investor(&self, investor_id: &str) -> Result<Vec<LedgerEntry>>;
    /// The reversal entry pointing at `entry_id`, if one was ever posted.
    fn find_reversal_of(&self, entry_id: &str) -> Result<Option<LedgerEntry>>;
    /// Sum of signed `shares_transacted` for one investor.
    fn sum_shares_for_investor(&self, investor_id: &str) -> Result<Decimal>;

    /// Atomically inserts the entry, applies the aggregate delta to the
    /// investor row, and (when present) records a compensating tax event.
    /// Either everything commits or nothing does.
    async fn post_entry(
        &self,
        entry: LedgerEntry,
        delta: AggregateDelta,
        tax_event: Option<TaxEvent>,
    ) -> Result<PostedEntry>;
}

/// Trait defining the contract for share ledger service operations.
#[async_trait]
pub trait LedgerServiceTrait: Send + Sync {
    /// Posts an issuance or redemption. `kind` must not be `Reversal`.
    async fn post(
        &self,
        investor_id: &str,
        kind: super::LedgerEntryKind,
        amount: Decimal,
        nav_per_share: Decimal,
        entry_date: NaiveDate,
        fund_flow_id: Option<String>,
    ) -> Result<PostedEntry>;

    /// Posts the inverse of an existing entry, restoring the investor's
    /// aggregates to their pre-entry values. If the entry was a withdrawal
    /// with a booked tax event, a compensating tax event is recorded in the
    /// same transaction.
    async fn reverse(&self, entry_id: &str) -> Result<PostedEntry>;

    fn get_entry(&self, entry_id: &str) -> Result<LedgerEntry>;
    fn get_entries(&self) -> Result<Vec<LedgerEntry>>;
    fn get_entries_for_investor(&self, investor_id: &str) -> Result<Vec<LedgerEntry>>;

    /// Audit: the investor's aggregate must equal the signed sum of their
    /// entries.
    fn verify_share_conservation(&self, investor_id: &str) -> Result<()>;
}
