use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::investors_model::{Investor, InvestorUpdate, InvestorValuation, NewInvestor};
use crate::Result;

/// Trait defining the contract for Investor repository operations.
///
/// There is no method that writes `current_shares` or `net_investment`
/// directly; those aggregates move only through the ledger repository's
/// atomic posting call.
#[async_trait]
pub trait InvestorRepositoryTrait: Send + Sync {
    fn get_investor(&self, investor_id: &str) -> Result<Investor>;
    fn list_investors(&self, active_only: bool) -> Result<Vec<Investor>>;
    /// Sum of `current_shares` over all investors (including inactive ones,
    /// who may still hold shares).
    fn sum_outstanding_shares(&self) -> Result<Decimal>;
    async fn create_investor(&self, new_investor: NewInvestor) -> Result<Investor>;
    async fn update_investor(&self, update: InvestorUpdate) -> Result<Investor>;
}

/// Trait defining the contract for Investor service operations.
#[async_trait]
pub trait InvestorServiceTrait: Send + Sync {
    fn get_investor(&self, investor_id: &str) -> Result<Investor>;
    fn list_investors(&self, active_only: bool) -> Result<Vec<Investor>>;
    async fn create_investor(&self, new_investor: NewInvestor) -> Result<Investor>;
    async fn update_investor(&self, update: InvestorUpdate) -> Result<Investor>;
    /// Marks an investor inactive. Investors are never deleted: their ledger
    /// history must stay resolvable.
    async fn deactivate_investor(&self, investor_id: &str) -> Result<Investor>;
    /// Values the investor's position at the NAV in force on `as_of`.
    fn get_valuation(&self, investor_id: &str, as_of: NaiveDate) -> Result<InvestorValuation>;
}
