//! Database models for investors.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use fundledger_core::investors::Investor;

use crate::utils::{format_timestamp, parse_decimal_string_tolerant, parse_timestamp_tolerant};

/// Database model for investors.
#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, Serialize, Deserialize, Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::investors)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct InvestorDB {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub is_active: bool,
    pub current_shares: String,
    pub net_investment: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<InvestorDB> for Investor {
    fn from(db: InvestorDB) -> Self {
        Investor {
            current_shares: parse_decimal_string_tolerant(&db.current_shares, "current_shares"),
            net_investment: parse_decimal_string_tolerant(&db.net_investment, "net_investment"),
            created_at: parse_timestamp_tolerant(&db.created_at, "created_at"),
            updated_at: parse_timestamp_tolerant(&db.updated_at, "updated_at"),
            id: db.id,
            name: db.name,
            email: db.email,
            is_active: db.is_active,
        }
    }
}

impl From<&Investor> for InvestorDB {
    fn from(investor: &Investor) -> Self {
        InvestorDB {
            id: investor.id.clone(),
            name: investor.name.clone(),
            email: investor.email.clone(),
            is_active: investor.is_active,
            current_shares: investor.current_shares.to_string(),
            net_investment: investor.net_investment.to_string(),
            created_at: format_timestamp(&investor.created_at),
            updated_at: format_timestamp(&investor.updated_at),
        }
    }
}
