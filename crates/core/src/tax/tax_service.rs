use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use super::tax_calculator::{eligible_withdrawal, withdrawal_figures, WithdrawalTaxFigures};
use super::tax_model::{TaxConfig, TaxEvent};
use super::tax_traits::{QuarterlyTaxSummary, TaxEventRepositoryTrait, TaxEventServiceTrait};
use crate::errors::ValidationError;
use crate::{Error, Result};

/// Service computing realized gains and reading back booked events.
///
/// The policy is injected at construction; changing policy means building a
/// new service, never flipping ambient state.
pub struct TaxEventService {
    tax_event_repository: Arc<dyn TaxEventRepositoryTrait>,
    config: TaxConfig,
}

impl TaxEventService {
    pub fn new(tax_event_repository: Arc<dyn TaxEventRepositoryTrait>, config: TaxConfig) -> Self {
        Self {
            tax_event_repository,
            config,
        }
    }

    fn quarter_bounds(year: i32, quarter: u32) -> Result<(NaiveDate, NaiveDate)> {
        if !(1..=4).contains(&quarter) {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Quarter must be 1-4, got {quarter}"
            ))));
        }
        let start_month = (quarter - 1) * 3 + 1;
        let start = NaiveDate::from_ymd_opt(year, start_month, 1).ok_or_else(|| {
            Error::Validation(ValidationError::InvalidInput(format!(
                "Invalid quarter start {year}-{start_month}"
            )))
        })?;
        let end = if quarter == 4 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, start_month + 3, 1)
        }
        .expect("first of a month is always valid")
        .pred_opt()
        .expect("day before the first of a month is always valid");
        Ok((start, end))
    }
}

#[async_trait]
impl TaxEventServiceTrait for TaxEventService {
    fn compute(
        &self,
        withdrawal_amount: Decimal,
        current_value: Decimal,
        net_investment_before: Decimal,
    ) -> WithdrawalTaxFigures {
        withdrawal_figures(
            &self.config,
            withdrawal_amount,
            current_value,
            net_investment_before,
        )
    }

    fn build_event(
        &self,
        investor_id: &str,
        event_date: NaiveDate,
        withdrawal_amount: Decimal,
        figures: &WithdrawalTaxFigures,
        ledger_entry_id: &str,
    ) -> Option<TaxEvent> {
        if figures.realized_gain <= Decimal::ZERO {
            return None;
        }
        Some(TaxEvent {
            id: Uuid::new_v4().to_string(),
            investor_id: investor_id.to_string(),
            event_date,
            withdrawal_amount,
            realized_gain: figures.realized_gain,
            tax_due: figures.tax_due,
            policy: self.config.policy,
            ledger_entry_id: ledger_entry_id.to_string(),
            reverses_event_id: None,
            created_at: Utc::now(),
        })
    }

    fn estimate_eligible_withdrawal(
        &self,
        current_value: Decimal,
        net_investment: Decimal,
    ) -> Decimal {
        eligible_withdrawal(&self.config, current_value, net_investment)
    }

    fn get_events_for_investor(&self, investor_id: &str) -> Result<Vec<TaxEvent>> {
        self.tax_event_repository.get_events_for_investor(investor_id)
    }

    fn get_quarterly_summary(&self, year: i32, quarter: u32) -> Result<QuarterlyTaxSummary> {
        let (start, end) = Self::quarter_bounds(year, quarter)?;
        let events = self.tax_event_repository.get_events_in_range(start, end)?;

        let total_realized_gain = events.iter().map(|e| e.realized_gain).sum();
        let total_tax_due = events.iter().map(|e| e.tax_due).sum();

        Ok(QuarterlyTaxSummary {
            year,
            quarter,
            total_realized_gain,
            total_tax_due,
            events,
        })
    }
}
