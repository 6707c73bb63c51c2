use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;

use fundledger_core::tax::{TaxEvent, TaxEventRepositoryTrait};
use fundledger_core::{DatabaseError, Error, Result};

use super::model::TaxEventDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::tax_events;

/// Repository for booked tax events.
pub struct TaxEventRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl TaxEventRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

/// Inserts a tax event row. Shared with the ledger and fund-flow
/// repositories so an event commits in the same transaction as the entry
/// it belongs to.
pub(crate) fn insert_event_row(conn: &mut SqliteConnection, event: &TaxEvent) -> Result<TaxEvent> {
    let row = TaxEventDB::from(event);
    let inserted = diesel::insert_into(tax_events::table)
        .values(&row)
        .get_result::<TaxEventDB>(conn)
        .into_core()?;
    Ok(TaxEvent::from(inserted))
}

#[async_trait]
impl TaxEventRepositoryTrait for TaxEventRepository {
    fn get_event(&self, event_id: &str) -> Result<TaxEvent> {
        let mut conn = get_connection(&self.pool)?;
        let event = tax_events::table
            .select(TaxEventDB::as_select())
            .find(event_id)
            .first::<TaxEventDB>(&mut conn)
            .optional()
            .into_core()?
            .ok_or_else(|| {
                Error::Database(DatabaseError::NotFound(format!(
                    "Tax event {event_id} not found"
                )))
            })?;
        Ok(TaxEvent::from(event))
    }

    fn find_by_ledger_entry(&self, ledger_entry_id: &str) -> Result<Option<TaxEvent>> {
        let mut conn = get_connection(&self.pool)?;
        let row = tax_events::table
            .select(TaxEventDB::as_select())
            .filter(tax_events::ledger_entry_id.eq(ledger_entry_id))
            .first::<TaxEventDB>(&mut conn)
            .optional()
            .into_core()?;
        Ok(row.map(TaxEvent::from))
    }

    fn get_events_for_investor(&self, investor_id: &str) -> Result<Vec<TaxEvent>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = tax_events::table
            .select(TaxEventDB::as_select())
            .filter(tax_events::investor_id.eq(investor_id))
            .order(tax_events::event_date.asc())
            .load::<TaxEventDB>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(TaxEvent::from).collect())
    }

    fn get_events_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<TaxEvent>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = tax_events::table
            .select(TaxEventDB::as_select())
            .filter(tax_events::event_date.ge(start))
            .filter(tax_events::event_date.le(end))
            .order(tax_events::event_date.asc())
            .load::<TaxEventDB>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(TaxEvent::from).collect())
    }

    async fn insert(&self, event: TaxEvent) -> Result<TaxEvent> {
        self.writer
            .exec(move |conn| insert_event_row(conn, &event))
            .await
    }
}
