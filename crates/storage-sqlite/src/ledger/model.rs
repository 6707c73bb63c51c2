//! Database models for ledger entries.

use chrono::NaiveDate;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use fundledger_core::ledger::{LedgerEntry, LedgerEntryKind};

use crate::utils::{format_timestamp, parse_decimal_string_tolerant, parse_timestamp_tolerant};

/// Database model for ledger entries. Insert-only; no AsChangeset on
/// purpose - posted entries are never updated.
#[derive(Queryable, Identifiable, Insertable, Selectable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::ledger_entries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct LedgerEntryDB {
    pub id: String,
    pub investor_id: String,
    pub entry_date: NaiveDate,
    pub kind: String,
    pub amount: String,
    pub nav_per_share: String,
    pub shares_transacted: String,
    pub basis_delta: String,
    pub fund_flow_id: Option<String>,
    pub reverses_entry_id: Option<String>,
    pub created_at: String,
}

impl From<LedgerEntryDB> for LedgerEntry {
    fn from(db: LedgerEntryDB) -> Self {
        LedgerEntry {
            kind: LedgerEntryKind::from_str(&db.kind).unwrap_or_else(|| {
                log::error!("Unknown ledger entry kind '{}' on {}", db.kind, db.id);
                LedgerEntryKind::Contribution
            }),
            amount: parse_decimal_string_tolerant(&db.amount, "amount"),
            nav_per_share: parse_decimal_string_tolerant(&db.nav_per_share, "nav_per_share"),
            shares_transacted: parse_decimal_string_tolerant(
                &db.shares_transacted,
                "shares_transacted",
            ),
            basis_delta: parse_decimal_string_tolerant(&db.basis_delta, "basis_delta"),
            created_at: parse_timestamp_tolerant(&db.created_at, "created_at"),
            id: db.id,
            investor_id: db.investor_id,
            entry_date: db.entry_date,
            fund_flow_id: db.fund_flow_id,
            reverses_entry_id: db.reverses_entry_id,
        }
    }
}

impl From<&LedgerEntry> for LedgerEntryDB {
    fn from(entry: &LedgerEntry) -> Self {
        LedgerEntryDB {
            id: entry.id.clone(),
            investor_id: entry.investor_id.clone(),
            entry_date: entry.entry_date,
            kind: entry.kind.as_str().to_string(),
            amount: entry.amount.to_string(),
            nav_per_share: entry.nav_per_share.to_string(),
            shares_transacted: entry.shares_transacted.to_string(),
            basis_delta: entry.basis_delta.to_string(),
            fund_flow_id: entry.fund_flow_id.clone(),
            reverses_entry_id: entry.reverses_entry_id.clone(),
            created_at: format_timestamp(&entry.created_at),
        }
    }
}
