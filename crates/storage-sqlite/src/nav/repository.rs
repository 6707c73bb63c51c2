use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use fundledger_brokerage::Position;
use std::sync::Arc;
use uuid::Uuid;

use fundledger_core::nav::{NavRecord, NavRepositoryTrait, PositionSnapshot};
use fundledger_core::{DatabaseError, Error, Result};

use super::model::{NavRecordDB, PositionSnapshotDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::{nav_records, position_snapshots};
use crate::utils::format_timestamp;

/// Repository for NAV records and their diagnostic position snapshots.
pub struct NavRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl NavRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl NavRepositoryTrait for NavRepository {
    fn get_by_date(&self, date: NaiveDate) -> Result<Option<NavRecord>> {
        let mut conn = get_connection(&self.pool)?;
        let record = nav_records::table
            .select(NavRecordDB::as_select())
            .find(date)
            .first::<NavRecordDB>(&mut conn)
            .optional()
            .into_core()?;
        Ok(record.map(NavRecord::from))
    }

    fn get_as_of(&self, date: NaiveDate) -> Result<Option<NavRecord>> {
        let mut conn = get_connection(&self.pool)?;
        let record = nav_records::table
            .select(NavRecordDB::as_select())
            .filter(nav_records::nav_date.le(date))
            .order(nav_records::nav_date.desc())
            .first::<NavRecordDB>(&mut conn)
            .optional()
            .into_core()?;
        Ok(record.map(NavRecord::from))
    }

    fn get_latest(&self) -> Result<Option<NavRecord>> {
        let mut conn = get_connection(&self.pool)?;
        let record = nav_records::table
            .select(NavRecordDB::as_select())
            .order(nav_records::nav_date.desc())
            .first::<NavRecordDB>(&mut conn)
            .optional()
            .into_core()?;
        Ok(record.map(NavRecord::from))
    }

    fn get_history(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<NavRecord>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = nav_records::table
            .select(NavRecordDB::as_select())
            .order(nav_records::nav_date.asc())
            .into_boxed();
        if let Some(start) = start {
            query = query.filter(nav_records::nav_date.ge(start));
        }
        if let Some(end) = end {
            query = query.filter(nav_records::nav_date.le(end));
        }
        let rows = query.load::<NavRecordDB>(&mut conn).into_core()?;
        Ok(rows.into_iter().map(NavRecord::from).collect())
    }

    async fn insert(&self, record: NavRecord) -> Result<NavRecord> {
        let row = NavRecordDB::from(&record);
        self.writer
            .exec(move |conn| {
                let inserted = diesel::insert_into(nav_records::table)
                    .values(&row)
                    .get_result::<NavRecordDB>(conn)
                    .into_core()?;
                Ok(NavRecord::from(inserted))
            })
            .await
    }

    async fn update(&self, record: NavRecord) -> Result<NavRecord> {
        let row = NavRecordDB::from(&record);
        self.writer
            .exec(move |conn| {
                let updated = diesel::update(nav_records::table.find(row.nav_date))
                    .set(&row)
                    .get_result::<NavRecordDB>(conn)
                    .optional()
                    .into_core()?
                    .ok_or_else(|| {
                        Error::Database(DatabaseError::NotFound(format!(
                            "NAV record for {} not found",
                            row.nav_date
                        )))
                    })?;
                Ok(NavRecord::from(updated))
            })
            .await
    }

    async fn save_position_snapshots(
        &self,
        date: NaiveDate,
        source: &str,
        positions: &[Position],
    ) -> Result<()> {
        let now = format_timestamp(&Utc::now());
        let source = source.to_string();
        let rows: Vec<PositionSnapshotDB> = positions
            .iter()
            .map(|p| PositionSnapshotDB {
                id: Uuid::new_v4().to_string(),
                snapshot_date: date,
                source: source.clone(),
                symbol: p.symbol.clone(),
                quantity: p.quantity.to_string(),
                market_value: p.market_value.to_string(),
                cost_basis: p.cost_basis.to_string(),
                currency: p.currency.clone(),
                created_at: now.clone(),
            })
            .collect();

        self.writer
            .exec(move |conn| {
                // A refresh replaces the day's snapshot for this source.
                diesel::delete(
                    position_snapshots::table
                        .filter(position_snapshots::snapshot_date.eq(date))
                        .filter(position_snapshots::source.eq(&source)),
                )
                .execute(conn)
                .into_core()?;
                diesel::insert_into(position_snapshots::table)
                    .values(&rows)
                    .execute(conn)
                    .into_core()?;
                Ok(())
            })
            .await
    }

    fn get_position_snapshots(&self, date: NaiveDate) -> Result<Vec<PositionSnapshot>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = position_snapshots::table
            .select(PositionSnapshotDB::as_select())
            .filter(position_snapshots::snapshot_date.eq(date))
            .order(position_snapshots::symbol.asc())
            .load::<PositionSnapshotDB>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(PositionSnapshot::from).collect())
    }
}
