//! Reconciliation domain models.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle of a raw row through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EtlStatus {
    Pending,
    Transformed,
    Skipped,
    Error,
}

impl EtlStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EtlStatus::Pending => "PENDING",
            EtlStatus::Transformed => "TRANSFORMED",
            EtlStatus::Skipped => "SKIPPED",
            EtlStatus::Error => "ERROR",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "PENDING" => Some(EtlStatus::Pending),
            "TRANSFORMED" => Some(EtlStatus::Transformed),
            "SKIPPED" => Some(EtlStatus::Skipped),
            "ERROR" => Some(EtlStatus::Error),
            _ => None,
        }
    }
}

/// One transaction exactly as a brokerage reported it, keyed by
/// `(source, external_id)` for dedupe. The payload never changes after
/// ingest; only the ETL bookkeeping fields do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBrokerageTransaction {
    pub id: String,
    pub source: String,
    pub external_id: String,
    pub transacted_on: Option<NaiveDate>,
    /// Verbatim provider payload (JSON).
    pub payload: serde_json::Value,
    pub etl_status: EtlStatus,
    /// Diagnostic detail for SKIPPED and ERROR rows.
    pub etl_message: Option<String>,
    /// The canonical trade this row produced, once loaded.
    pub trade_id: Option<String>,
    pub imported_at: DateTime<Utc>,
}

/// Canonical classification of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeType {
    Buy,
    Sell,
    Dividend,
    Interest,
    Fee,
    AchDeposit,
    AchWithdrawal,
}

impl TradeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeType::Buy => "BUY",
            TradeType::Sell => "SELL",
            TradeType::Dividend => "DIVIDEND",
            TradeType::Interest => "INTEREST",
            TradeType::Fee => "FEE",
            TradeType::AchDeposit => "ACH_DEPOSIT",
            TradeType::AchWithdrawal => "ACH_WITHDRAWAL",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "BUY" => Some(TradeType::Buy),
            "SELL" => Some(TradeType::Sell),
            "DIVIDEND" => Some(TradeType::Dividend),
            "INTEREST" => Some(TradeType::Interest),
            "FEE" => Some(TradeType::Fee),
            "ACH_DEPOSIT" => Some(TradeType::AchDeposit),
            "ACH_WITHDRAWAL" => Some(TradeType::AchWithdrawal),
            _ => None,
        }
    }

    pub fn category(&self) -> TradeCategory {
        match self {
            TradeType::Buy | TradeType::Sell => TradeCategory::Trade,
            TradeType::Dividend | TradeType::Interest => TradeCategory::Income,
            TradeType::Fee => TradeCategory::Fee,
            TradeType::AchDeposit | TradeType::AchWithdrawal => TradeCategory::CashMovement,
        }
    }
}

/// Broad bucket used by consumers that don't care about the exact type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeCategory {
    Trade,
    CashMovement,
    Income,
    Fee,
}

impl TradeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeCategory::Trade => "TRADE",
            TradeCategory::CashMovement => "CASH_MOVEMENT",
            TradeCategory::Income => "INCOME",
            TradeCategory::Fee => "FEE",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "TRADE" => Some(TradeCategory::Trade),
            "CASH_MOVEMENT" => Some(TradeCategory::CashMovement),
            "INCOME" => Some(TradeCategory::Income),
            "FEE" => Some(TradeCategory::Fee),
            _ => None,
        }
    }
}

/// The normalized, source-agnostic transaction record. Both brokerage
/// integrations transform into this one shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalTrade {
    pub id: String,
    pub source: String,
    /// Propagated from the raw row; `(source, external_id)` dedupes loads.
    pub external_id: String,
    pub trade_date: NaiveDate,
    pub trade_type: TradeType,
    pub category: TradeCategory,
    pub symbol: Option<String>,
    pub quantity: Option<Decimal>,
    pub price: Option<Decimal>,
    /// Absolute cash value of the transaction; direction lives in the type.
    pub amount: Decimal,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Classification result before an id is assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedTrade {
    pub trade_date: NaiveDate,
    pub trade_type: TradeType,
    pub symbol: Option<String>,
    pub quantity: Option<Decimal>,
    pub price: Option<Decimal>,
    pub amount: Decimal,
    pub description: Option<String>,
}

/// Per-row failure surfaced for operator review.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowError {
    pub raw_id: String,
    pub external_id: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractSummary {
    pub fetched: usize,
    pub inserted: usize,
    /// Rows already present from an earlier, overlapping window.
    pub duplicates: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformSummary {
    pub transformed: usize,
    pub skipped: usize,
    pub errors: Vec<RowError>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadSummary {
    pub loaded: usize,
    /// Rows whose trade already existed; re-running load is a no-op.
    pub already_present: usize,
    pub errors: Vec<RowError>,
}

/// Outcome of a full pipeline run over one source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtlReport {
    pub source: String,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub extract: ExtractSummary,
    pub transform: TransformSummary,
    pub load: LoadSummary,
}
