use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use log::debug;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use super::ledger_calculator::{issuance_shares, redemption_figures};
use super::ledger_errors::LedgerError;
use super::ledger_model::{AggregateDelta, LedgerEntry, LedgerEntryKind, PostedEntry};
use super::ledger_traits::{LedgerRepositoryTrait, LedgerServiceTrait};
use crate::errors::ValidationError;
use crate::investors::InvestorRepositoryTrait;
use crate::tax::{TaxEvent, TaxEventRepositoryTrait};
use crate::{Error, Result};

/// Service owning all share math. Every ownership change in the system
/// flows through `post` or `reverse`.
pub struct LedgerService {
    ledger_repository: Arc<dyn LedgerRepositoryTrait>,
    investor_repository: Arc<dyn InvestorRepositoryTrait>,
    tax_event_repository: Arc<dyn TaxEventRepositoryTrait>,
}

impl LedgerService {
    pub fn new(
        ledger_repository: Arc<dyn LedgerRepositoryTrait>,
        investor_repository: Arc<dyn InvestorRepositoryTrait>,
        tax_event_repository: Arc<dyn TaxEventRepositoryTrait>,
    ) -> Self {
        Self {
            ledger_repository,
            investor_repository,
            tax_event_repository,
        }
    }

    fn validate_post_inputs(amount: Decimal, nav_per_share: Decimal) -> Result<()> {
        if amount <= Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Amount must be positive, got {amount}"
            ))));
        }
        if nav_per_share <= Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "NAV per share must be positive, got {nav_per_share}"
            ))));
        }
        Ok(())
    }

    /// Builds the compensating tax event for a reversed withdrawal, if the
    /// original entry booked one.
    fn compensating_tax_event(
        &self,
        original: &LedgerEntry,
        reversal_entry_id: &str,
        reversal_date: NaiveDate,
    ) -> Result<Option<TaxEvent>> {
        let Some(event) = self
            .tax_event_repository
            .find_by_ledger_entry(&original.id)?
        else {
            return Ok(None);
        };

        Ok(Some(TaxEvent {
            id: Uuid::new_v4().to_string(),
            investor_id: event.investor_id.clone(),
            event_date: reversal_date,
            withdrawal_amount: -event.withdrawal_amount,
            realized_gain: -event.realized_gain,
            tax_due: -event.tax_due,
            policy: event.policy,
            ledger_entry_id: reversal_entry_id.to_string(),
            reverses_event_id: Some(event.id),
            created_at: Utc::now(),
        }))
    }
}

#[async_trait]
impl LedgerServiceTrait for LedgerService {
    async fn post(
        &self,
        investor_id: &str,
        kind: LedgerEntryKind,
        amount: Decimal,
        nav_per_share: Decimal,
        entry_date: NaiveDate,
        fund_flow_id: Option<String>,
    ) -> Result<PostedEntry> {
        if kind == LedgerEntryKind::Reversal {
            return Err(LedgerError::DirectReversalPost.into());
        }
        Self::validate_post_inputs(amount, nav_per_share)?;

        let investor = self.investor_repository.get_investor(investor_id)?;

        let (shares_transacted, basis_delta) = if kind.is_issuance() {
            if !investor.is_active {
                return Err(LedgerError::InvestorInactive(investor.id).into());
            }
            (issuance_shares(amount, nav_per_share), amount)
        } else {
            let figures = redemption_figures(
                &investor.id,
                investor.current_shares,
                investor.net_investment,
                amount,
                nav_per_share,
            )?;
            (-figures.shares_to_redeem, -figures.basis_reduction)
        };

        let entry = LedgerEntry {
            id: Uuid::new_v4().to_string(),
            investor_id: investor.id.clone(),
            entry_date,
            kind,
            amount,
            nav_per_share,
            shares_transacted,
            basis_delta,
            fund_flow_id,
            reverses_entry_id: None,
            created_at: Utc::now(),
        };
        let delta = AggregateDelta {
            investor_id: investor.id,
            shares_delta: shares_transacted,
            investment_delta: basis_delta,
        };

        debug!(
            "Posting {} of {} for investor {}: {} shares at {}",
            entry.kind.as_str(),
            amount,
            entry.investor_id,
            shares_transacted,
            nav_per_share
        );
        self.ledger_repository.post_entry(entry, delta, None).await
    }

    async fn reverse(&self, entry_id: &str) -> Result<PostedEntry> {
        let original = self.ledger_repository.get_entry(entry_id)?;

        if original.kind == LedgerEntryKind::Reversal {
            return Err(LedgerError::CannotReverseReversal(original.id).into());
        }
        if self.ledger_repository.find_reversal_of(entry_id)?.is_some() {
            return Err(LedgerError::AlreadyReversed(original.id).into());
        }

        let reversal_date = Utc::now().date_naive();
        let reversal = LedgerEntry {
            id: Uuid::new_v4().to_string(),
            investor_id: original.investor_id.clone(),
            entry_date: reversal_date,
            kind: LedgerEntryKind::Reversal,
            amount: -original.amount,
            nav_per_share: original.nav_per_share,
            shares_transacted: -original.shares_transacted,
            basis_delta: -original.basis_delta,
            fund_flow_id: original.fund_flow_id.clone(),
            reverses_entry_id: Some(original.id.clone()),
            created_at: Utc::now(),
        };
        // The aggregates are re-derived by applying the inverse deltas to
        // the current row, so intervening entries stay accounted for.
        let delta = AggregateDelta {
            investor_id: original.investor_id.clone(),
            shares_delta: -original.shares_transacted,
            investment_delta: -original.basis_delta,
        };
        let tax_event = self.compensating_tax_event(&original, &reversal.id, reversal_date)?;

        debug!(
            "Reversing ledger entry {} for investor {}",
            original.id, original.investor_id
        );
        self.ledger_repository
            .post_entry(reversal, delta, tax_event)
            .await
    }

    fn get_entry(&self, entry_id: &str) -> Result<LedgerEntry> {
        self.ledger_repository.get_entry(entry_id)
    }

    fn get_entries(&self) -> Result<Vec<LedgerEntry>> {
        self.ledger_repository.get_entries()
    }

    fn get_entries_for_investor(&self, investor_id: &str) -> Result<Vec<LedgerEntry>> {
        self.ledger_repository.get_entries_for_investor(investor_id)
    }

    fn verify_share_conservation(&self, investor_id: &str) -> Result<()> {
        let investor = self.investor_repository.get_investor(investor_id)?;
        let entries_total = self
            .ledger_repository
            .sum_shares_for_investor(investor_id)?;
        if investor.current_shares != entries_total {
            return Err(LedgerError::ConservationViolation {
                investor_id: investor.id,
                aggregate: investor.current_shares,
                entries_total,
            }
            .into());
        }
        Ok(())
    }
}
