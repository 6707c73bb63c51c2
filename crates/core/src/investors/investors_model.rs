//! Investor domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{errors::ValidationError, Error, Result};

/// Domain model representing an investor in the fund.
///
/// `current_shares` and `net_investment` are running aggregates owned by the
/// share ledger: they change only when a ledger entry is posted, inside the
/// same transaction as the entry insert.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Investor {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub is_active: bool,
    /// Shares currently held, 4 decimal places.
    pub current_shares: Decimal,
    /// Cumulative contributions minus withdrawn cost basis (cost basis).
    pub net_investment: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input model for registering a new investor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInvestor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub email: Option<String>,
}

impl NewInvestor {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Investor name cannot be empty".to_string(),
            )));
        }
        Ok(())
    }
}

/// Input model for updating an existing investor's identity fields.
///
/// Aggregates are deliberately absent: they cannot be edited directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestorUpdate {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub is_active: bool,
}

impl InvestorUpdate {
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "id".to_string(),
            )));
        }
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Investor name cannot be empty".to_string(),
            )));
        }
        Ok(())
    }
}

/// Read-only projection of an investor's position at a NAV price.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestorValuation {
    pub investor_id: String,
    pub as_of: chrono::NaiveDate,
    pub nav_per_share: Decimal,
    pub current_shares: Decimal,
    pub net_investment: Decimal,
    pub current_value: Decimal,
    pub unrealized_gain: Decimal,
    /// Estimate shown to the investor before an actual withdrawal; distinct
    /// from the booked tax calculation at redemption time.
    pub eligible_withdrawal: Decimal,
}
