use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::tax_calculator::WithdrawalTaxFigures;
use super::tax_model::TaxEvent;
use crate::Result;

/// Trait defining the contract for tax event repository operations.
///
/// Inserts of events that accompany a ledger posting happen inside the
/// ledger/fund-flow atomic calls; this trait only adds the standalone
/// insert used by backfills, plus reads.
#[async_trait]
pub trait TaxEventRepositoryTrait: Send + Sync {
    fn get_event(&self, event_id: &str) -> Result<TaxEvent>;
    fn find_by_ledger_entry(&self, ledger_entry_id: &str) -> Result<Option<TaxEvent>>;
    fn get_events_for_investor(&self, investor_id: &str) -> Result<Vec<TaxEvent>>;
    fn get_events_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<TaxEvent>>;
    async fn insert(&self, event: TaxEvent) -> Result<TaxEvent>;
}

/// Realized gain and withholding totals for one calendar quarter.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuarterlyTaxSummary {
    pub year: i32,
    pub quarter: u32,
    pub total_realized_gain: Decimal,
    pub total_tax_due: Decimal,
    pub events: Vec<TaxEvent>,
}

/// Trait defining the contract for tax event service operations.
#[async_trait]
pub trait TaxEventServiceTrait: Send + Sync {
    /// Pure gain calculation under the configured policy.
    fn compute(
        &self,
        withdrawal_amount: Decimal,
        current_value: Decimal,
        net_investment_before: Decimal,
    ) -> WithdrawalTaxFigures;

    /// Builds the event to book for a withdrawal, or `None` when no gain was
    /// realized (break-even and loss withdrawals book nothing).
    fn build_event(
        &self,
        investor_id: &str,
        event_date: NaiveDate,
        withdrawal_amount: Decimal,
        figures: &WithdrawalTaxFigures,
        ledger_entry_id: &str,
    ) -> Option<TaxEvent>;

    /// Preview of the amount withdrawable after tax; never used for booking.
    fn estimate_eligible_withdrawal(
        &self,
        current_value: Decimal,
        net_investment: Decimal,
    ) -> Decimal;

    fn get_events_for_investor(&self, investor_id: &str) -> Result<Vec<TaxEvent>>;

    /// Aggregates booked events for a calendar quarter (1-4), the unit the
    /// quarterly-settlement policy settles on.
    fn get_quarterly_summary(&self, year: i32, quarter: u32) -> Result<QuarterlyTaxSummary>;
}
