use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use super::fund_flows_errors::FundFlowError;
use super::fund_flows_model::{
    FlowAction, FlowStatus, FlowType, FundFlowFilter, FundFlowRequest, NewFundFlowRequest,
    ProcessedFlow,
};
use super::fund_flows_traits::{FundFlowRepositoryTrait, FundFlowServiceTrait};
use crate::investors::InvestorRepositoryTrait;
use crate::ledger::{
    issuance_shares, redemption_figures, AggregateDelta, LedgerEntry, LedgerEntryKind,
};
use crate::nav::NavServiceTrait;
use crate::reconciliation::{ReconciliationRepositoryTrait, TradeCategory, TradeType};
use crate::tax::TaxEventServiceTrait;
use crate::Result;

/// The top-level workflow: drives a request from submission through
/// brokerage matching to ledger execution. All failure cases leave the
/// request in its prior state.
pub struct FundFlowService {
    fund_flow_repository: Arc<dyn FundFlowRepositoryTrait>,
    investor_repository: Arc<dyn InvestorRepositoryTrait>,
    nav_service: Arc<dyn NavServiceTrait>,
    tax_service: Arc<dyn TaxEventServiceTrait>,
    reconciliation_repository: Arc<dyn ReconciliationRepositoryTrait>,
}

impl FundFlowService {
    pub fn new(
        fund_flow_repository: Arc<dyn FundFlowRepositoryTrait>,
        investor_repository: Arc<dyn InvestorRepositoryTrait>,
        nav_service: Arc<dyn NavServiceTrait>,
        tax_service: Arc<dyn TaxEventServiceTrait>,
        reconciliation_repository: Arc<dyn ReconciliationRepositoryTrait>,
    ) -> Self {
        Self {
            fund_flow_repository,
            investor_repository,
            nav_service,
            tax_service,
            reconciliation_repository,
        }
    }

    /// A matched transaction must evidence the cash actually moving: a
    /// reconciled ACH movement in the request's direction.
    fn ensure_transaction_usable(
        &self,
        request: &FundFlowRequest,
        raw_transaction_id: &str,
    ) -> Result<()> {
        let raw = self
            .reconciliation_repository
            .find_raw_by_id(raw_transaction_id)?
            .ok_or_else(|| FundFlowError::TransactionNotFound(raw_transaction_id.to_string()))?;

        let Some(trade_id) = raw.trade_id.as_deref() else {
            return Err(FundFlowError::TransactionNotUsable {
                raw_transaction_id: raw.id,
                reason: "not yet reconciled into a canonical trade".to_string(),
            }
            .into());
        };
        let trade = self.reconciliation_repository.get_trade(trade_id)?;

        if trade.category != TradeCategory::CashMovement {
            return Err(FundFlowError::TransactionNotUsable {
                raw_transaction_id: raw.id,
                reason: format!("trade category is {}, not a cash movement", trade.category.as_str()),
            }
            .into());
        }
        let expected = match request.flow_type {
            FlowType::Contribution => TradeType::AchDeposit,
            FlowType::Withdrawal => TradeType::AchWithdrawal,
        };
        if trade.trade_type != expected {
            return Err(FundFlowError::TransactionNotUsable {
                raw_transaction_id: raw.id,
                reason: format!(
                    "trade type {} does not evidence a {}",
                    trade.trade_type.as_str(),
                    request.flow_type.as_str()
                ),
            }
            .into());
        }

        if let Some(claimant) = self
            .fund_flow_repository
            .find_live_request_matched_to(raw_transaction_id)?
        {
            if claimant.id != request.id {
                return Err(FundFlowError::TransactionAlreadyClaimed {
                    raw_transaction_id: raw_transaction_id.to_string(),
                    request_id: claimant.id,
                }
                .into());
            }
        }

        Ok(())
    }

    /// Computes everything `process` will persist. Pure with respect to the
    /// store: nothing is written here.
    fn build_processed_flow(&self, request: &FundFlowRequest) -> Result<ProcessedFlow> {
        let investor = self.investor_repository.get_investor(&request.investor_id)?;
        let nav = self.nav_service.get_nav_as_of(request.effective_date)?;
        let amount = request.requested_amount;

        let entry_id = Uuid::new_v4().to_string();
        let (kind, shares_transacted, basis_delta, realized_gain, tax_withheld, net_proceeds, tax_event) =
            match request.flow_type {
                FlowType::Contribution => {
                    let kind = if investor.current_shares.is_zero() {
                        LedgerEntryKind::Initial
                    } else {
                        LedgerEntryKind::Contribution
                    };
                    let shares = issuance_shares(amount, nav.nav_per_share);
                    (kind, shares, amount, Decimal::ZERO, Decimal::ZERO, amount, None)
                }
                FlowType::Withdrawal => {
                    let figures = redemption_figures(
                        &investor.id,
                        investor.current_shares,
                        investor.net_investment,
                        amount,
                        nav.nav_per_share,
                    )?;
                    let tax = self.tax_service.compute(
                        amount,
                        figures.current_value,
                        investor.net_investment,
                    );
                    let event = self.tax_service.build_event(
                        &investor.id,
                        request.effective_date,
                        amount,
                        &tax,
                        &entry_id,
                    );
                    (
                        LedgerEntryKind::Withdrawal,
                        -figures.shares_to_redeem,
                        -figures.basis_reduction,
                        tax.realized_gain,
                        tax.tax_due,
                        tax.net_proceeds,
                        event,
                    )
                }
            };

        let ledger_entry = LedgerEntry {
            id: entry_id,
            investor_id: investor.id.clone(),
            entry_date: request.effective_date,
            kind,
            amount,
            nav_per_share: nav.nav_per_share,
            shares_transacted,
            basis_delta,
            fund_flow_id: Some(request.id.clone()),
            reverses_entry_id: None,
            created_at: Utc::now(),
        };
        let aggregate_delta = AggregateDelta {
            investor_id: investor.id,
            shares_delta: shares_transacted,
            investment_delta: basis_delta,
        };

        Ok(ProcessedFlow {
            request_id: request.id.clone(),
            ledger_entry,
            aggregate_delta,
            tax_event,
            shares_transacted,
            nav_per_share: nav.nav_per_share,
            realized_gain,
            tax_withheld,
            net_proceeds,
        })
    }
}

#[async_trait]
impl FundFlowServiceTrait for FundFlowService {
    async fn submit(&self, new_request: NewFundFlowRequest) -> Result<FundFlowRequest> {
        new_request.validate()?;
        let investor = self
            .investor_repository
            .get_investor(&new_request.investor_id)?;
        if !investor.is_active {
            return Err(crate::ledger::LedgerError::InvestorInactive(investor.id).into());
        }
        debug!(
            "Submitting {} of {} for investor {}",
            new_request.flow_type.as_str(),
            new_request.requested_amount,
            new_request.investor_id
        );
        self.fund_flow_repository.insert(new_request).await
    }

    async fn approve(&self, request_id: &str) -> Result<FundFlowRequest> {
        let request = self.fund_flow_repository.get_request(request_id)?;
        let to = FlowAction::Approve.apply(&request.id, request.status)?;
        self.fund_flow_repository
            .update_status(request_id, request.status, to, None)
            .await
    }

    async fn reject(&self, request_id: &str, reason: Option<String>) -> Result<FundFlowRequest> {
        let request = self.fund_flow_repository.get_request(request_id)?;
        let to = FlowAction::Reject.apply(&request.id, request.status)?;
        self.fund_flow_repository
            .update_status(request_id, request.status, to, reason)
            .await
    }

    async fn await_funds(&self, request_id: &str) -> Result<FundFlowRequest> {
        let request = self.fund_flow_repository.get_request(request_id)?;
        let to = FlowAction::AwaitFunds.apply(&request.id, request.status)?;
        self.fund_flow_repository
            .update_status(request_id, request.status, to, None)
            .await
    }

    async fn match_transaction(
        &self,
        request_id: &str,
        raw_transaction_id: &str,
    ) -> Result<FundFlowRequest> {
        let request = self.fund_flow_repository.get_request(request_id)?;

        // Re-matching the same transaction is a no-op; a different one is
        // an error.
        if request.status == FlowStatus::Matched {
            return match request.matched_transaction_id.as_deref() {
                Some(matched) if matched == raw_transaction_id => Ok(request),
                _ => Err(FundFlowError::AlreadyMatched {
                    matched_transaction_id: request
                        .matched_transaction_id
                        .clone()
                        .unwrap_or_default(),
                    id: request.id,
                }
                .into()),
            };
        }

        FlowAction::Match.apply(&request.id, request.status)?;
        self.ensure_transaction_usable(&request, raw_transaction_id)?;

        debug!(
            "Matching request {} to brokerage transaction {}",
            request_id, raw_transaction_id
        );
        self.fund_flow_repository
            .set_matched(request_id, raw_transaction_id)
            .await
    }

    async fn process(&self, request_id: &str) -> Result<FundFlowRequest> {
        let request = self.fund_flow_repository.get_request(request_id)?;

        // Exactly-once: a processed request returns its stored result.
        if request.status == FlowStatus::Processed {
            debug!("Request {} already processed; returning stored result", request_id);
            return Ok(request);
        }
        FlowAction::Process.apply(&request.id, request.status)?;

        let flow = self.build_processed_flow(&request)?;
        debug!(
            "Processing request {}: {} shares at {}",
            request_id, flow.shares_transacted, flow.nav_per_share
        );
        self.fund_flow_repository.record_processed(flow).await
    }

    async fn cancel(&self, request_id: &str, reason: Option<String>) -> Result<FundFlowRequest> {
        let request = self.fund_flow_repository.get_request(request_id)?;
        let to = FlowAction::Cancel.apply(&request.id, request.status)?;
        self.fund_flow_repository
            .update_status(request_id, request.status, to, reason)
            .await
    }

    fn get_request(&self, request_id: &str) -> Result<FundFlowRequest> {
        self.fund_flow_repository.get_request(request_id)
    }

    fn list_requests(&self, filter: &FundFlowFilter) -> Result<Vec<FundFlowRequest>> {
        self.fund_flow_repository.list_requests(filter)
    }
}
