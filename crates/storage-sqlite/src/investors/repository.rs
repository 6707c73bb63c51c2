use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use fundledger_core::investors::{Investor, InvestorRepositoryTrait, InvestorUpdate, NewInvestor};
use fundledger_core::{DatabaseError, Error, Result};

use super::model::InvestorDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::investors;
use crate::utils::{format_timestamp, parse_decimal_string_tolerant};

/// Repository for managing investor data in the database.
pub struct InvestorRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl InvestorRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl InvestorRepositoryTrait for InvestorRepository {
    fn get_investor(&self, investor_id: &str) -> Result<Investor> {
        let mut conn = get_connection(&self.pool)?;
        let investor_db = investors::table
            .select(InvestorDB::as_select())
            .find(investor_id)
            .first::<InvestorDB>(&mut conn)
            .optional()
            .into_core()?
            .ok_or_else(|| {
                Error::Database(DatabaseError::NotFound(format!(
                    "Investor {investor_id} not found"
                )))
            })?;
        Ok(Investor::from(investor_db))
    }

    fn list_investors(&self, active_only: bool) -> Result<Vec<Investor>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = investors::table
            .select(InvestorDB::as_select())
            .order(investors::name.asc())
            .into_boxed();
        if active_only {
            query = query.filter(investors::is_active.eq(true));
        }
        let rows = query.load::<InvestorDB>(&mut conn).into_core()?;
        Ok(rows.into_iter().map(Investor::from).collect())
    }

    fn sum_outstanding_shares(&self) -> Result<Decimal> {
        let mut conn = get_connection(&self.pool)?;
        // Shares are stored as text for exactness; sum in decimal space.
        let shares: Vec<String> = investors::table
            .select(investors::current_shares)
            .load::<String>(&mut conn)
            .into_core()?;
        Ok(shares
            .iter()
            .map(|s| parse_decimal_string_tolerant(s, "current_shares"))
            .sum())
    }

    async fn create_investor(&self, new_investor: NewInvestor) -> Result<Investor> {
        let now = Utc::now();
        let row = InvestorDB {
            id: new_investor
                .id
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            name: new_investor.name,
            email: new_investor.email,
            is_active: true,
            current_shares: "0".to_string(),
            net_investment: "0".to_string(),
            created_at: format_timestamp(&now),
            updated_at: format_timestamp(&now),
        };

        self.writer
            .exec(move |conn| {
                let inserted = diesel::insert_into(investors::table)
                    .values(&row)
                    .get_result::<InvestorDB>(conn)
                    .into_core()?;
                Ok(Investor::from(inserted))
            })
            .await
    }

    async fn update_investor(&self, update: InvestorUpdate) -> Result<Investor> {
        let now = format_timestamp(&Utc::now());
        self.writer
            .exec(move |conn| {
                let updated = diesel::update(investors::table.find(&update.id))
                    .set((
                        investors::name.eq(&update.name),
                        investors::email.eq(&update.email),
                        investors::is_active.eq(update.is_active),
                        investors::updated_at.eq(&now),
                    ))
                    .get_result::<InvestorDB>(conn)
                    .optional()
                    .into_core()?
                    .ok_or_else(|| {
                        Error::Database(DatabaseError::NotFound(format!(
                            "Investor {} not found",
                            update.id
                        )))
                    })?;
                Ok(Investor::from(updated))
            })
            .await
    }
}
