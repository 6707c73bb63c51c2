use thiserror::Error;

use super::fund_flows_model::FlowStatus;

/// Errors raised by the fund flow state machine.
#[derive(Error, Debug)]
pub enum FundFlowError {
    /// The requested action is not legal from the request's current state.
    #[error("Request {id} is {status}; cannot {action}")]
    InvalidStateTransition {
        id: String,
        status: FlowStatus,
        action: &'static str,
    },

    /// The request is already matched to a different brokerage transaction.
    #[error("Request {id} is already matched to transaction {matched_transaction_id}")]
    AlreadyMatched {
        id: String,
        matched_transaction_id: String,
    },

    /// Another live request already claims this brokerage transaction.
    #[error("Transaction {raw_transaction_id} is already matched to request {request_id}")]
    TransactionAlreadyClaimed {
        raw_transaction_id: String,
        request_id: String,
    },

    /// No such raw brokerage transaction.
    #[error("Brokerage transaction {0} not found")]
    TransactionNotFound(String),

    /// The transaction exists but cannot evidence this cash movement.
    #[error("Transaction {raw_transaction_id} cannot be matched: {reason}")]
    TransactionNotUsable {
        raw_transaction_id: String,
        reason: String,
    },
}
