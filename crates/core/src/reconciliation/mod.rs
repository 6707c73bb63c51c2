//! Brokerage reconciliation pipeline - extract, transform, load.

mod mapping;
mod reconciliation_errors;
mod reconciliation_model;
mod reconciliation_service;
mod reconciliation_traits;

#[cfg(test)]
mod reconciliation_service_tests;

pub use mapping::{map_raw, MappingOutcome};
pub use reconciliation_errors::EtlError;
pub use reconciliation_model::{
    CanonicalTrade, EtlReport, EtlStatus, ExtractSummary, LoadSummary, MappedTrade,
    RawBrokerageTransaction, RowError, TradeCategory, TradeType, TransformSummary,
};
pub use reconciliation_service::ReconciliationService;
pub use reconciliation_traits::{ReconciliationRepositoryTrait, ReconciliationServiceTrait};
