//! Database models for fund flow requests.

use chrono::NaiveDate;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use fundledger_core::fund_flows::{FlowStatus, FlowType, FundFlowRequest};

use crate::utils::{format_timestamp, parse_decimal_string_tolerant, parse_timestamp_tolerant};

/// Database model for fund flow requests.
#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, Serialize, Deserialize, Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::fund_flow_requests)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct FundFlowRequestDB {
    pub id: String,
    pub investor_id: String,
    pub flow_type: String,
    pub requested_amount: String,
    pub effective_date: NaiveDate,
    pub status: String,
    pub status_reason: Option<String>,
    pub matched_transaction_id: Option<String>,
    pub ledger_entry_id: Option<String>,
    pub shares_transacted: Option<String>,
    pub nav_per_share: Option<String>,
    pub realized_gain: Option<String>,
    pub tax_withheld: Option<String>,
    pub net_proceeds: Option<String>,
    pub submitted_at: String,
    pub updated_at: String,
}

fn parse_optional_decimal(value: &Option<String>, field: &str) -> Option<rust_decimal::Decimal> {
    value
        .as_deref()
        .map(|v| parse_decimal_string_tolerant(v, field))
}

impl From<FundFlowRequestDB> for FundFlowRequest {
    fn from(db: FundFlowRequestDB) -> Self {
        FundFlowRequest {
            flow_type: FlowType::from_str(&db.flow_type).unwrap_or_else(|| {
                log::error!("Unknown flow type '{}' on request {}", db.flow_type, db.id);
                FlowType::Contribution
            }),
            status: FlowStatus::from_str(&db.status).unwrap_or_else(|| {
                log::error!("Unknown flow status '{}' on request {}", db.status, db.id);
                FlowStatus::Pending
            }),
            requested_amount: parse_decimal_string_tolerant(
                &db.requested_amount,
                "requested_amount",
            ),
            shares_transacted: parse_optional_decimal(&db.shares_transacted, "shares_transacted"),
            nav_per_share: parse_optional_decimal(&db.nav_per_share, "nav_per_share"),
            realized_gain: parse_optional_decimal(&db.realized_gain, "realized_gain"),
            tax_withheld: parse_optional_decimal(&db.tax_withheld, "tax_withheld"),
            net_proceeds: parse_optional_decimal(&db.net_proceeds, "net_proceeds"),
            submitted_at: parse_timestamp_tolerant(&db.submitted_at, "submitted_at"),
            updated_at: parse_timestamp_tolerant(&db.updated_at, "updated_at"),
            id: db.id,
            investor_id: db.investor_id,
            effective_date: db.effective_date,
            status_reason: db.status_reason,
            matched_transaction_id: db.matched_transaction_id,
            ledger_entry_id: db.ledger_entry_id,
        }
    }
}

impl From<&FundFlowRequest> for FundFlowRequestDB {
    fn from(request: &FundFlowRequest) -> Self {
        FundFlowRequestDB {
            id: request.id.clone(),
            investor_id: request.investor_id.clone(),
            flow_type: request.flow_type.as_str().to_string(),
            requested_amount: request.requested_amount.to_string(),
            effective_date: request.effective_date,
            status: request.status.as_str().to_string(),
            status_reason: request.status_reason.clone(),
            matched_transaction_id: request.matched_transaction_id.clone(),
            ledger_entry_id: request.ledger_entry_id.clone(),
            shares_transacted: request.shares_transacted.map(|v| v.to_string()),
            nav_per_share: request.nav_per_share.map(|v| v.to_string()),
            realized_gain: request.realized_gain.map(|v| v.to_string()),
            tax_withheld: request.tax_withheld.map(|v| v.to_string()),
            net_proceeds: request.net_proceeds.map(|v| v.to_string()),
            submitted_at: format_timestamp(&request.submitted_at),
            updated_at: format_timestamp(&request.updated_at),
        }
    }
}
