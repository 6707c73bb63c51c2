//! Brokerage provider trait definition.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::errors::BrokerageError;
use crate::models::{Position, RawTransaction};

/// Capability interface for a brokerage account the fund trades out of.
///
/// Implement this trait to add support for a new brokerage. The NAV engine
/// uses `get_portfolio_value`/`get_positions`; the reconciliation pipeline
/// uses `get_raw_transactions`. A provider that cannot serve historical
/// data for a given operation returns `BrokerageError::NotSupported`.
#[async_trait]
pub trait BrokerageProvider: Send + Sync {
    /// Stable identifier for this provider, e.g. "ALPACA".
    ///
    /// Recorded on every raw transaction the provider yields; forms the
    /// first half of the `(source, external_id)` dedupe key.
    fn id(&self) -> &'static str;

    /// Total account value as of the close of `date`.
    async fn get_portfolio_value(&self, date: NaiveDate) -> Result<Decimal, BrokerageError>;

    /// Open positions as of `date`.
    ///
    /// Default implementation returns `NotSupported` for providers that only
    /// expose aggregate balances.
    async fn get_positions(&self, date: NaiveDate) -> Result<Vec<Position>, BrokerageError> {
        let _ = date;
        Err(BrokerageError::NotSupported {
            operation: "positions".to_string(),
            provider: self.id(),
        })
    }

    /// Raw transaction history for the inclusive date window.
    ///
    /// Payloads are returned verbatim; the reconciliation pipeline owns
    /// classification.
    async fn get_raw_transactions(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawTransaction>, BrokerageError>;
}
