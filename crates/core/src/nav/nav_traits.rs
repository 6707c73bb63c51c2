use async_trait::async_trait;
use chrono::NaiveDate;
use fundledger_brokerage::Position;
use rust_decimal::Decimal;

use super::nav_model::{NavRecord, PositionSnapshot};
use crate::Result;

/// Trait defining the contract for NAV repository operations.
#[async_trait]
pub trait NavRepositoryTrait: Send + Sync {
    fn get_by_date(&self, date: NaiveDate) -> Result<Option<NavRecord>>;
    /// Latest record with `nav_date <= date` - the backdating lookup.
    fn get_as_of(&self, date: NaiveDate) -> Result<Option<NavRecord>>;
    fn get_latest(&self) -> Result<Option<NavRecord>>;
    fn get_history(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<NavRecord>>;
    /// Inserts a new record; the date is the primary key, so publishing an
    /// existing date fails with a unique violation.
    async fn insert(&self, record: NavRecord) -> Result<NavRecord>;
    /// In-place restatement of an existing record (admin correction path).
    async fn update(&self, record: NavRecord) -> Result<NavRecord>;
    async fn save_position_snapshots(
        &self,
        date: NaiveDate,
        source: &str,
        positions: &[Position],
    ) -> Result<()>;
    /// What the brokerage reported alongside a publication, for operator
    /// reconciliation.
    fn get_position_snapshots(&self, date: NaiveDate) -> Result<Vec<PositionSnapshot>>;
}

/// Trait defining the contract for NAV service operations.
#[async_trait]
pub trait NavServiceTrait: Send + Sync {
    /// Computes and publishes the NAV for a trading date. One record per
    /// date; re-running for a published date is an error.
    async fn calculate_nav(&self, date: NaiveDate) -> Result<NavRecord>;

    /// Explicit admin correction: restates the portfolio value for an
    /// already-published date in place. `total_shares` stays as fixed at
    /// publication time.
    async fn correct_nav(&self, date: NaiveDate, portfolio_value: Decimal) -> Result<NavRecord>;

    /// Price in force on `date`: the latest record dated on or before it.
    fn get_nav_as_of(&self, date: NaiveDate) -> Result<NavRecord>;

    fn get_latest_nav(&self) -> Result<Option<NavRecord>>;

    fn get_nav_history(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<NavRecord>>;

    /// Audit check: the ledger's total outstanding shares must equal the
    /// latest record's `total_shares`.
    fn verify_fund_share_equality(&self) -> Result<()>;
}
