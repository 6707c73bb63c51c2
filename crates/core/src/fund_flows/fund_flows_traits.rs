use async_trait::async_trait;

use super::fund_flows_model::{
    FlowStatus, FundFlowFilter, FundFlowRequest, NewFundFlowRequest, ProcessedFlow,
};
use crate::Result;

/// Trait defining the contract for fund flow repository operations.
///
/// Status writes carry the expected current status and re-check it inside
/// the transaction, so a raced transition fails cleanly instead of
/// clobbering.
#[async_trait]
pub trait FundFlowRepositoryTrait: Send + Sync {
    fn get_request(&self, request_id: &str) -> Result<FundFlowRequest>;
    fn list_requests(&self, filter: &FundFlowFilter) -> Result<Vec<FundFlowRequest>>;
    /// The non-terminal request currently matched to this transaction, if
    /// any. Cancelled requests release their claim.
    fn find_live_request_matched_to(
        &self,
        raw_transaction_id: &str,
    ) -> Result<Option<FundFlowRequest>>;

    async fn insert(&self, new_request: NewFundFlowRequest) -> Result<FundFlowRequest>;

    /// Transitions `expected_from -> to`, recording the reason. Leaving
    /// `Matched` for `Cancelled` clears the matched transaction so it can be
    /// re-matched.
    async fn update_status(
        &self,
        request_id: &str,
        expected_from: FlowStatus,
        to: FlowStatus,
        reason: Option<String>,
    ) -> Result<FundFlowRequest>;

    /// Binds the request to a brokerage transaction and moves it to
    /// `Matched`; expects the request to still be `AwaitingFunds`.
    async fn set_matched(
        &self,
        request_id: &str,
        raw_transaction_id: &str,
    ) -> Result<FundFlowRequest>;

    /// Terminal execution, applied as a single transaction: insert the
    /// ledger entry, apply the investor aggregate delta, insert the tax
    /// event when present, and store the derived fields with status
    /// `Processed`. If the request is already `Processed` when the
    /// transaction runs, nothing is written and the stored row is returned
    /// (exactly-once).
    async fn record_processed(&self, flow: ProcessedFlow) -> Result<FundFlowRequest>;
}

/// Trait defining the contract for fund flow service operations. This is
/// the boundary external callers observe.
#[async_trait]
pub trait FundFlowServiceTrait: Send + Sync {
    async fn submit(&self, new_request: NewFundFlowRequest) -> Result<FundFlowRequest>;
    async fn approve(&self, request_id: &str) -> Result<FundFlowRequest>;
    async fn reject(&self, request_id: &str, reason: Option<String>) -> Result<FundFlowRequest>;
    async fn await_funds(&self, request_id: &str) -> Result<FundFlowRequest>;
    /// Binds the request to a real cash movement. Idempotent for the same
    /// transaction; a different transaction on a matched request is an
    /// error.
    async fn match_transaction(
        &self,
        request_id: &str,
        raw_transaction_id: &str,
    ) -> Result<FundFlowRequest>;
    /// Executes the request against the ledger, exactly once.
    async fn process(&self, request_id: &str) -> Result<FundFlowRequest>;
    async fn cancel(&self, request_id: &str, reason: Option<String>) -> Result<FundFlowRequest>;

    fn get_request(&self, request_id: &str) -> Result<FundFlowRequest>;
    fn list_requests(&self, filter: &FundFlowFilter) -> Result<Vec<FundFlowRequest>>;
}
