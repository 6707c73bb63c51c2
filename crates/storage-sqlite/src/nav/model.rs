//! Database models for NAV records and position snapshots.

use chrono::NaiveDate;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use fundledger_core::nav::{NavRecord, PositionSnapshot};

use crate::utils::{format_timestamp, parse_decimal_string_tolerant, parse_timestamp_tolerant};

/// Database model for NAV records.
#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, Serialize, Deserialize, Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::nav_records)]
#[diesel(primary_key(nav_date))]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct NavRecordDB {
    pub nav_date: NaiveDate,
    pub portfolio_value: String,
    pub total_shares: String,
    pub nav_per_share: String,
    pub day_change_pct: Option<String>,
    pub calculated_at: String,
}

impl From<NavRecordDB> for NavRecord {
    fn from(db: NavRecordDB) -> Self {
        NavRecord {
            nav_date: db.nav_date,
            portfolio_value: parse_decimal_string_tolerant(&db.portfolio_value, "portfolio_value"),
            total_shares: parse_decimal_string_tolerant(&db.total_shares, "total_shares"),
            nav_per_share: parse_decimal_string_tolerant(&db.nav_per_share, "nav_per_share"),
            day_change_pct: db
                .day_change_pct
                .as_deref()
                .map(|v| parse_decimal_string_tolerant(v, "day_change_pct")),
            calculated_at: parse_timestamp_tolerant(&db.calculated_at, "calculated_at"),
        }
    }
}

impl From<&NavRecord> for NavRecordDB {
    fn from(record: &NavRecord) -> Self {
        NavRecordDB {
            nav_date: record.nav_date,
            portfolio_value: record.portfolio_value.to_string(),
            total_shares: record.total_shares.to_string(),
            nav_per_share: record.nav_per_share.to_string(),
            day_change_pct: record.day_change_pct.map(|v| v.to_string()),
            calculated_at: format_timestamp(&record.calculated_at),
        }
    }
}

/// Database model for position snapshots.
#[derive(Queryable, Identifiable, Insertable, Selectable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::position_snapshots)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PositionSnapshotDB {
    pub id: String,
    pub snapshot_date: NaiveDate,
    pub source: String,
    pub symbol: String,
    pub quantity: String,
    pub market_value: String,
    pub cost_basis: String,
    pub currency: String,
    pub created_at: String,
}

impl From<PositionSnapshotDB> for PositionSnapshot {
    fn from(db: PositionSnapshotDB) -> Self {
        PositionSnapshot {
            quantity: parse_decimal_string_tolerant(&db.quantity, "quantity"),
            market_value: parse_decimal_string_tolerant(&db.market_value, "market_value"),
            cost_basis: parse_decimal_string_tolerant(&db.cost_basis, "cost_basis"),
            created_at: parse_timestamp_tolerant(&db.created_at, "created_at"),
            id: db.id,
            snapshot_date: db.snapshot_date,
            source: db.source,
            symbol: db.symbol,
            currency: db.currency,
        }
    }
}
