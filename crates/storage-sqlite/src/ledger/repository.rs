use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;

use fundledger_core::investors::Investor;
use fundledger_core::ledger::{AggregateDelta, LedgerEntry, LedgerRepositoryTrait, PostedEntry};
use fundledger_core::tax::TaxEvent;
use fundledger_core::{DatabaseError, Error, Result};

use super::model::LedgerEntryDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::investors::InvestorDB;
use crate::schema::{investors, ledger_entries};
use crate::tax_events::insert_event_row;
use crate::utils::{format_timestamp, parse_decimal_string_tolerant};

/// Repository for the append-only share ledger.
pub struct LedgerRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl LedgerRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

/// Inserts a ledger entry row. Shared with the fund-flow repository so a
/// processed request writes its entry inside the same transaction.
pub(crate) fn insert_entry_row(
    conn: &mut SqliteConnection,
    entry: &LedgerEntry,
) -> Result<LedgerEntry> {
    let row = LedgerEntryDB::from(entry);
    let inserted = diesel::insert_into(ledger_entries::table)
        .values(&row)
        .get_result::<LedgerEntryDB>(conn)
        .into_core()?;
    Ok(LedgerEntry::from(inserted))
}

/// Applies a share/basis delta to the investor row, returning the updated
/// investor. The resulting share balance is re-checked here; the schema's
/// CHECK constraint is the last line of defense behind it.
pub(crate) fn apply_aggregate_delta(
    conn: &mut SqliteConnection,
    delta: &AggregateDelta,
) -> Result<Investor> {
    let investor_db = investors::table
        .select(InvestorDB::as_select())
        .find(&delta.investor_id)
        .first::<InvestorDB>(conn)
        .optional()
        .into_core()?
        .ok_or_else(|| {
            Error::Database(DatabaseError::NotFound(format!(
                "Investor {} not found",
                delta.investor_id
            )))
        })?;

    let current_shares =
        parse_decimal_string_tolerant(&investor_db.current_shares, "current_shares");
    let net_investment =
        parse_decimal_string_tolerant(&investor_db.net_investment, "net_investment");
    let new_shares = current_shares + delta.shares_delta;
    let new_investment = net_investment + delta.investment_delta;

    if new_shares < Decimal::ZERO {
        return Err(Error::Database(DatabaseError::Internal(format!(
            "aggregate update would drive investor {} shares to {new_shares}",
            delta.investor_id
        ))));
    }

    let now = format_timestamp(&chrono::Utc::now());
    let updated = diesel::update(investors::table.find(&delta.investor_id))
        .set((
            investors::current_shares.eq(new_shares.to_string()),
            investors::net_investment.eq(new_investment.to_string()),
            investors::updated_at.eq(&now),
        ))
        .get_result::<InvestorDB>(conn)
        .into_core()?;
    Ok(Investor::from(updated))
}

#[async_trait]
impl LedgerRepositoryTrait for LedgerRepository {
    fn get_entry(&self, entry_id: &str) -> Result<LedgerEntry> {
        let mut conn = get_connection(&self.pool)?;
        let entry = ledger_entries::table
            .select(LedgerEntryDB::as_select())
            .find(entry_id)
            .first::<LedgerEntryDB>(&mut conn)
            .optional()
            .into_core()?
            .ok_or_else(|| {
                Error::Database(DatabaseError::NotFound(format!(
                    "Ledger entry {entry_id} not found"
                )))
            })?;
        Ok(LedgerEntry::from(entry))
    }

    fn get_entries(&self) -> Result<Vec<LedgerEntry>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = ledger_entries::table
            .select(LedgerEntryDB::as_select())
            .order((ledger_entries::entry_date.asc(), ledger_entries::created_at.asc()))
            .load::<LedgerEntryDB>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(LedgerEntry::from).collect())
    }

    fn get_entries_for_investor(&self, investor_id: &str) -> Result<Vec<LedgerEntry>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = ledger_entries::table
            .select(LedgerEntryDB::as_select())
            .filter(ledger_entries::investor_id.eq(investor_id))
            .order((ledger_entries::entry_date.asc(), ledger_entries::created_at.asc()))
            .load::<LedgerEntryDB>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(LedgerEntry::from).collect())
    }

    fn find_reversal_of(&self, entry_id: &str) -> Result<Option<LedgerEntry>> {
        let mut conn = get_connection(&self.pool)?;
        let row = ledger_entries::table
            .select(LedgerEntryDB::as_select())
            .filter(ledger_entries::reverses_entry_id.eq(entry_id))
            .first::<LedgerEntryDB>(&mut conn)
            .optional()
            .into_core()?;
        Ok(row.map(LedgerEntry::from))
    }

    fn sum_shares_for_investor(&self, investor_id: &str) -> Result<Decimal> {
        let mut conn = get_connection(&self.pool)?;
        let shares: Vec<String> = ledger_entries::table
            .filter(ledger_entries::investor_id.eq(investor_id))
            .select(ledger_entries::shares_transacted)
            .load::<String>(&mut conn)
            .into_core()?;
        Ok(shares
            .iter()
            .map(|s| parse_decimal_string_tolerant(s, "shares_transacted"))
            .sum())
    }

    async fn post_entry(
        &self,
        entry: LedgerEntry,
        delta: AggregateDelta,
        tax_event: Option<TaxEvent>,
    ) -> Result<PostedEntry> {
        self.writer
            .exec(move |conn| {
                let entry = insert_entry_row(conn, &entry)?;
                let investor = apply_aggregate_delta(conn, &delta)?;
                if let Some(event) = &tax_event {
                    insert_event_row(conn, event)?;
                }
                Ok(PostedEntry { entry, investor })
            })
            .await
    }
}
