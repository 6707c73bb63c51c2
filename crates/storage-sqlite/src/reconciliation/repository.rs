use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use std::sync::Arc;

use fundledger_core::reconciliation::{
    CanonicalTrade, EtlStatus, RawBrokerageTransaction, ReconciliationRepositoryTrait,
};
use fundledger_core::{DatabaseError, Error, Result};

use super::model::{CanonicalTradeDB, RawBrokerageTransactionDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::{canonical_trades, raw_brokerage_transactions};

/// Repository for the reconciliation pipeline's two stores.
pub struct ReconciliationRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl ReconciliationRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }

    async fn set_status(
        &self,
        raw_id: &str,
        status: EtlStatus,
        message: Option<String>,
    ) -> Result<()> {
        let raw_id = raw_id.to_string();
        self.writer
            .exec(move |conn| {
                let affected =
                    diesel::update(raw_brokerage_transactions::table.find(&raw_id))
                        .set((
                            raw_brokerage_transactions::etl_status.eq(status.as_str()),
                            raw_brokerage_transactions::etl_message.eq(&message),
                        ))
                        .execute(conn)
                        .into_core()?;
                if affected == 0 {
                    return Err(Error::Database(DatabaseError::NotFound(format!(
                        "Raw transaction {raw_id} not found"
                    ))));
                }
                Ok(())
            })
            .await
    }
}

#[async_trait]
impl ReconciliationRepositoryTrait for ReconciliationRepository {
    fn find_raw_by_id(&self, raw_id: &str) -> Result<Option<RawBrokerageTransaction>> {
        let mut conn = get_connection(&self.pool)?;
        let row = raw_brokerage_transactions::table
            .select(RawBrokerageTransactionDB::as_select())
            .find(raw_id)
            .first::<RawBrokerageTransactionDB>(&mut conn)
            .optional()
            .into_core()?;
        Ok(row.map(RawBrokerageTransaction::from))
    }

    fn find_raw(
        &self,
        source: &str,
        external_id: &str,
    ) -> Result<Option<RawBrokerageTransaction>> {
        let mut conn = get_connection(&self.pool)?;
        let row = raw_brokerage_transactions::table
            .select(RawBrokerageTransactionDB::as_select())
            .filter(raw_brokerage_transactions::source.eq(source))
            .filter(raw_brokerage_transactions::external_id.eq(external_id))
            .first::<RawBrokerageTransactionDB>(&mut conn)
            .optional()
            .into_core()?;
        Ok(row.map(RawBrokerageTransaction::from))
    }

    fn list_raw_by_status(
        &self,
        source: &str,
        status: EtlStatus,
    ) -> Result<Vec<RawBrokerageTransaction>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = raw_brokerage_transactions::table
            .select(RawBrokerageTransactionDB::as_select())
            .filter(raw_brokerage_transactions::source.eq(source))
            .filter(raw_brokerage_transactions::etl_status.eq(status.as_str()))
            .order(raw_brokerage_transactions::imported_at.asc())
            .load::<RawBrokerageTransactionDB>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(RawBrokerageTransaction::from).collect())
    }

    fn list_raw_pending_load(&self, source: &str) -> Result<Vec<RawBrokerageTransaction>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = raw_brokerage_transactions::table
            .select(RawBrokerageTransactionDB::as_select())
            .filter(raw_brokerage_transactions::source.eq(source))
            .filter(
                raw_brokerage_transactions::etl_status.eq(EtlStatus::Transformed.as_str()),
            )
            .filter(raw_brokerage_transactions::trade_id.is_null())
            .order(raw_brokerage_transactions::imported_at.asc())
            .load::<RawBrokerageTransactionDB>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(RawBrokerageTransaction::from).collect())
    }

    async fn insert_raw_batch(&self, rows: Vec<RawBrokerageTransaction>) -> Result<usize> {
        let db_rows: Vec<RawBrokerageTransactionDB> =
            rows.iter().map(RawBrokerageTransactionDB::from).collect();
        self.writer
            .exec(move |conn| {
                // The (source, external_id) unique index is the dedupe
                // contract; conflicting rows are silently left alone.
                let mut inserted = 0;
                for row in &db_rows {
                    inserted += diesel::insert_into(raw_brokerage_transactions::table)
                        .values(row)
                        .on_conflict((
                            raw_brokerage_transactions::source,
                            raw_brokerage_transactions::external_id,
                        ))
                        .do_nothing()
                        .execute(conn)
                        .into_core()?;
                }
                Ok(inserted)
            })
            .await
    }

    async fn mark_transformed(&self, raw_id: &str) -> Result<()> {
        self.set_status(raw_id, EtlStatus::Transformed, None).await
    }

    async fn mark_skipped(&self, raw_id: &str, reason: &str) -> Result<()> {
        self.set_status(raw_id, EtlStatus::Skipped, Some(reason.to_string()))
            .await
    }

    async fn mark_error(&self, raw_id: &str, message: &str) -> Result<()> {
        self.set_status(raw_id, EtlStatus::Error, Some(message.to_string()))
            .await
    }

    async fn load_trade(&self, raw_id: &str, trade: CanonicalTrade) -> Result<bool> {
        let raw_id = raw_id.to_string();
        let row = CanonicalTradeDB::from(&trade);
        self.writer
            .exec(move |conn| {
                let existing = canonical_trades::table
                    .select(CanonicalTradeDB::as_select())
                    .filter(canonical_trades::source.eq(&row.source))
                    .filter(canonical_trades::external_id.eq(&row.external_id))
                    .first::<CanonicalTradeDB>(conn)
                    .optional()
                    .into_core()?;

                let (trade_id, inserted) = match existing {
                    Some(present) => (present.id, false),
                    None => {
                        diesel::insert_into(canonical_trades::table)
                            .values(&row)
                            .execute(conn)
                            .into_core()?;
                        (row.id.clone(), true)
                    }
                };

                diesel::update(raw_brokerage_transactions::table.find(&raw_id))
                    .set(raw_brokerage_transactions::trade_id.eq(Some(trade_id)))
                    .execute(conn)
                    .into_core()?;
                Ok(inserted)
            })
            .await
    }

    fn get_trade(&self, trade_id: &str) -> Result<CanonicalTrade> {
        let mut conn = get_connection(&self.pool)?;
        let row = canonical_trades::table
            .select(CanonicalTradeDB::as_select())
            .find(trade_id)
            .first::<CanonicalTradeDB>(&mut conn)
            .optional()
            .into_core()?
            .ok_or_else(|| {
                Error::Database(DatabaseError::NotFound(format!(
                    "Canonical trade {trade_id} not found"
                )))
            })?;
        Ok(CanonicalTrade::from(row))
    }

    fn find_trade(&self, source: &str, external_id: &str) -> Result<Option<CanonicalTrade>> {
        let mut conn = get_connection(&self.pool)?;
        let row = canonical_trades::table
            .select(CanonicalTradeDB::as_select())
            .filter(canonical_trades::source.eq(source))
            .filter(canonical_trades::external_id.eq(external_id))
            .first::<CanonicalTradeDB>(&mut conn)
            .optional()
            .into_core()?;
        Ok(row.map(CanonicalTrade::from))
    }

    fn list_trades(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<CanonicalTrade>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = canonical_trades::table
            .select(CanonicalTradeDB::as_select())
            .order(canonical_trades::trade_date.asc())
            .into_boxed();
        if let Some(start) = start {
            query = query.filter(canonical_trades::trade_date.ge(start));
        }
        if let Some(end) = end {
            query = query.filter(canonical_trades::trade_date.le(end));
        }
        let rows = query.load::<CanonicalTradeDB>(&mut conn).into_core()?;
        Ok(rows.into_iter().map(CanonicalTrade::from).collect())
    }
}
