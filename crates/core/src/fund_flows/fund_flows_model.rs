//! Fund flow domain models and the transition table.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::fund_flows_errors::FundFlowError;
use crate::errors::ValidationError;
use crate::ledger::{AggregateDelta, LedgerEntry};
use crate::tax::TaxEvent;
use crate::{Error, Result};

/// Direction of a cash movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowType {
    Contribution,
    Withdrawal,
}

impl FlowType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowType::Contribution => "CONTRIBUTION",
            FlowType::Withdrawal => "WITHDRAWAL",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "CONTRIBUTION" => Some(FlowType::Contribution),
            "WITHDRAWAL" => Some(FlowType::Withdrawal),
            _ => None,
        }
    }
}

/// Workflow state of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowStatus {
    Pending,
    Approved,
    AwaitingFunds,
    Matched,
    Processed,
    Rejected,
    Cancelled,
}

impl FlowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowStatus::Pending => "PENDING",
            FlowStatus::Approved => "APPROVED",
            FlowStatus::AwaitingFunds => "AWAITING_FUNDS",
            FlowStatus::Matched => "MATCHED",
            FlowStatus::Processed => "PROCESSED",
            FlowStatus::Rejected => "REJECTED",
            FlowStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "PENDING" => Some(FlowStatus::Pending),
            "APPROVED" => Some(FlowStatus::Approved),
            "AWAITING_FUNDS" => Some(FlowStatus::AwaitingFunds),
            "MATCHED" => Some(FlowStatus::Matched),
            "PROCESSED" => Some(FlowStatus::Processed),
            "REJECTED" => Some(FlowStatus::Rejected),
            "CANCELLED" => Some(FlowStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FlowStatus::Processed | FlowStatus::Rejected | FlowStatus::Cancelled
        )
    }
}

impl std::fmt::Display for FlowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Actions the workflow accepts. The transition table lives in one place so
/// every entry point enforces the same order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowAction {
    Approve,
    Reject,
    AwaitFunds,
    Match,
    Process,
    Cancel,
}

impl FlowAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowAction::Approve => "approve",
            FlowAction::Reject => "reject",
            FlowAction::AwaitFunds => "await funds",
            FlowAction::Match => "match",
            FlowAction::Process => "process",
            FlowAction::Cancel => "cancel",
        }
    }

    /// The state this action leads to when legal from `from`; otherwise an
    /// `InvalidStateTransitionError` naming both.
    pub fn apply(
        &self,
        request_id: &str,
        from: FlowStatus,
    ) -> std::result::Result<FlowStatus, FundFlowError> {
        let to = match (self, from) {
            (FlowAction::Approve, FlowStatus::Pending) => Some(FlowStatus::Approved),
            (FlowAction::Reject, FlowStatus::Pending) => Some(FlowStatus::Rejected),
            (FlowAction::AwaitFunds, FlowStatus::Approved) => Some(FlowStatus::AwaitingFunds),
            (FlowAction::Match, FlowStatus::AwaitingFunds) => Some(FlowStatus::Matched),
            (FlowAction::Process, FlowStatus::Matched) => Some(FlowStatus::Processed),
            (FlowAction::Cancel, s) if !s.is_terminal() => Some(FlowStatus::Cancelled),
            _ => None,
        };
        to.ok_or(FundFlowError::InvalidStateTransition {
            id: request_id.to_string(),
            status: from,
            action: self.as_str(),
        })
    }
}

/// The workflow unit: one contribution or withdrawal tracked from
/// submission to settlement. Never deleted; rejected and cancelled requests
/// stay for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundFlowRequest {
    pub id: String,
    pub investor_id: String,
    pub flow_type: FlowType,
    pub requested_amount: Decimal,
    /// Date the flow is priced at; the NAV in force on this date applies.
    pub effective_date: NaiveDate,
    pub status: FlowStatus,
    /// Operator note recorded on reject/cancel.
    pub status_reason: Option<String>,
    pub matched_transaction_id: Option<String>,
    pub ledger_entry_id: Option<String>,
    // Derived fields, populated only once processed.
    pub shares_transacted: Option<Decimal>,
    pub nav_per_share: Option<Decimal>,
    pub realized_gain: Option<Decimal>,
    pub tax_withheld: Option<Decimal>,
    pub net_proceeds: Option<Decimal>,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input model for submitting a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFundFlowRequest {
    pub investor_id: String,
    pub flow_type: FlowType,
    pub requested_amount: Decimal,
    /// Defaults to the submission date when omitted.
    pub effective_date: Option<NaiveDate>,
}

impl NewFundFlowRequest {
    pub fn validate(&self) -> Result<()> {
        if self.investor_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "investorId".to_string(),
            )));
        }
        if self.requested_amount <= Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Requested amount must be positive, got {}",
                self.requested_amount
            ))));
        }
        Ok(())
    }
}

/// Filter for listing requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundFlowFilter {
    pub investor_id: Option<String>,
    pub status: Option<FlowStatus>,
    pub flow_type: Option<FlowType>,
}

/// Everything `process` writes, handed to the repository as one atomic
/// unit: the request's terminal update, the ledger entry, the investor
/// aggregate movement, and the tax event when a gain was realized.
#[derive(Debug, Clone)]
pub struct ProcessedFlow {
    pub request_id: String,
    pub ledger_entry: LedgerEntry,
    pub aggregate_delta: AggregateDelta,
    pub tax_event: Option<TaxEvent>,
    pub shares_transacted: Decimal,
    pub nav_per_share: Decimal,
    pub realized_gain: Decimal,
    pub tax_withheld: Decimal,
    pub net_proceeds: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let id = "req-1";
        assert_eq!(
            FlowAction::Approve.apply(id, FlowStatus::Pending).unwrap(),
            FlowStatus::Approved
        );
        assert_eq!(
            FlowAction::AwaitFunds
                .apply(id, FlowStatus::Approved)
                .unwrap(),
            FlowStatus::AwaitingFunds
        );
        assert_eq!(
            FlowAction::Match
                .apply(id, FlowStatus::AwaitingFunds)
                .unwrap(),
            FlowStatus::Matched
        );
        assert_eq!(
            FlowAction::Process.apply(id, FlowStatus::Matched).unwrap(),
            FlowStatus::Processed
        );
    }

    #[test]
    fn test_out_of_order_transition_rejected() {
        let err = FlowAction::Process
            .apply("req-1", FlowStatus::Pending)
            .expect_err("processing a pending request must fail");
        assert!(matches!(
            err,
            FundFlowError::InvalidStateTransition {
                status: FlowStatus::Pending,
                ..
            }
        ));
    }

    #[test]
    fn test_cancel_from_any_live_state() {
        for status in [
            FlowStatus::Pending,
            FlowStatus::Approved,
            FlowStatus::AwaitingFunds,
            FlowStatus::Matched,
        ] {
            assert_eq!(
                FlowAction::Cancel.apply("req-1", status).unwrap(),
                FlowStatus::Cancelled
            );
        }
    }

    #[test]
    fn test_terminal_states_absorb() {
        for status in [
            FlowStatus::Processed,
            FlowStatus::Rejected,
            FlowStatus::Cancelled,
        ] {
            assert!(FlowAction::Cancel.apply("req-1", status).is_err());
            assert!(FlowAction::Approve.apply("req-1", status).is_err());
        }
    }
}
