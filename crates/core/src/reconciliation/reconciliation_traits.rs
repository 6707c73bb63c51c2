use async_trait::async_trait;
use chrono::NaiveDate;

use super::reconciliation_model::{
    CanonicalTrade, EtlReport, EtlStatus, ExtractSummary, LoadSummary, RawBrokerageTransaction,
    TransformSummary,
};
use crate::Result;

/// Trait defining the contract for reconciliation repository operations.
#[async_trait]
pub trait ReconciliationRepositoryTrait: Send + Sync {
    fn find_raw_by_id(&self, raw_id: &str) -> Result<Option<RawBrokerageTransaction>>;
    fn find_raw(&self, source: &str, external_id: &str)
        -> Result<Option<RawBrokerageTransaction>>;
    fn list_raw_by_status(
        &self,
        source: &str,
        status: EtlStatus,
    ) -> Result<Vec<RawBrokerageTransaction>>;
    /// Transformed rows whose trade has not been loaded yet.
    fn list_raw_pending_load(&self, source: &str) -> Result<Vec<RawBrokerageTransaction>>;

    /// Inserts rows, silently ignoring any whose `(source, external_id)` is
    /// already present. Returns the number actually inserted; re-extracting
    /// an overlapping window therefore never duplicates.
    async fn insert_raw_batch(&self, rows: Vec<RawBrokerageTransaction>) -> Result<usize>;

    async fn mark_transformed(&self, raw_id: &str) -> Result<()>;
    async fn mark_skipped(&self, raw_id: &str, reason: &str) -> Result<()>;
    async fn mark_error(&self, raw_id: &str, message: &str) -> Result<()>;

    /// Atomically inserts the trade unless `(source, external_id)` already
    /// exists, and links the raw row to the surviving trade either way.
    /// Returns true when a new trade row was written.
    async fn load_trade(&self, raw_id: &str, trade: CanonicalTrade) -> Result<bool>;

    fn get_trade(&self, trade_id: &str) -> Result<CanonicalTrade>;
    fn find_trade(&self, source: &str, external_id: &str) -> Result<Option<CanonicalTrade>>;
    fn list_trades(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<CanonicalTrade>>;
}

/// Trait defining the contract for the reconciliation pipeline. Each stage
/// is independently retryable; `run` chains all three.
#[async_trait]
pub trait ReconciliationServiceTrait: Send + Sync {
    async fn extract(
        &self,
        source: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ExtractSummary>;
    async fn transform(&self, source: &str) -> Result<TransformSummary>;
    async fn load(&self, source: &str) -> Result<LoadSummary>;
    async fn run(&self, source: &str, start: NaiveDate, end: NaiveDate) -> Result<EtlReport>;
}
