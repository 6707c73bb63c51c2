//! Fund flow state machine - contribution/withdrawal requests from
//! submission through brokerage matching to ledger execution.

mod fund_flows_errors;
mod fund_flows_model;
mod fund_flows_service;
mod fund_flows_traits;


pub use fund_flows_errors::FundFlowError;
pub use fund_flows_model::{
    FlowAction, FlowStatus, FlowType, FundFlowFilter, FundFlowRequest, NewFundFlowRequest,
    ProcessedFlow,
};
pub use fund_flows_service::FundFlowService;
pub use fund_flows_traits::{FundFlowRepositoryTrait, FundFlowServiceTrait};
