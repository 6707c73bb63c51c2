use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;
use uuid::Uuid;

use fundledger_core::fund_flows::{
    FlowStatus, FundFlowFilter, FundFlowRepositoryTrait, FundFlowRequest, NewFundFlowRequest,
    ProcessedFlow,
};
use fundledger_core::{DatabaseError, Error, Result};

use super::model::FundFlowRequestDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::ledger::{apply_aggregate_delta, insert_entry_row};
use crate::schema::fund_flow_requests;
use crate::tax_events::insert_event_row;
use crate::utils::format_timestamp;

/// Repository for fund flow requests.
///
/// Status writes re-check the stored status inside the writer transaction;
/// the service's pre-checks keep the error messages friendly, this layer
/// keeps raced transitions from corrupting state.
pub struct FundFlowRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl FundFlowRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

fn load_request(conn: &mut SqliteConnection, request_id: &str) -> Result<FundFlowRequestDB> {
    fund_flow_requests::table
        .select(FundFlowRequestDB::as_select())
        .find(request_id)
        .first::<FundFlowRequestDB>(conn)
        .optional()
        .into_core()?
        .ok_or_else(|| {
            Error::Database(DatabaseError::NotFound(format!(
                "Fund flow request {request_id} not found"
            )))
        })
}

fn stale_status(request_id: &str, expected: FlowStatus, actual: &str) -> Error {
    Error::Database(DatabaseError::TransactionFailed(format!(
        "request {request_id} expected {} but is {actual}",
        expected.as_str()
    )))
}

#[async_trait]
impl FundFlowRepositoryTrait for FundFlowRepository {
    fn get_request(&self, request_id: &str) -> Result<FundFlowRequest> {
        let mut conn = get_connection(&self.pool)?;
        load_request(&mut conn, request_id).map(FundFlowRequest::from)
    }

    fn list_requests(&self, filter: &FundFlowFilter) -> Result<Vec<FundFlowRequest>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = fund_flow_requests::table
            .select(FundFlowRequestDB::as_select())
            .order(fund_flow_requests::submitted_at.desc())
            .into_boxed();
        if let Some(investor_id) = &filter.investor_id {
            query = query.filter(fund_flow_requests::investor_id.eq(investor_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(fund_flow_requests::status.eq(status.as_str()));
        }
        if let Some(flow_type) = filter.flow_type {
            query = query.filter(fund_flow_requests::flow_type.eq(flow_type.as_str()));
        }
        let rows = query.load::<FundFlowRequestDB>(&mut conn).into_core()?;
        Ok(rows.into_iter().map(FundFlowRequest::from).collect())
    }

    fn find_live_request_matched_to(
        &self,
        raw_transaction_id: &str,
    ) -> Result<Option<FundFlowRequest>> {
        let mut conn = get_connection(&self.pool)?;
        let row = fund_flow_requests::table
            .select(FundFlowRequestDB::as_select())
            .filter(fund_flow_requests::matched_transaction_id.eq(raw_transaction_id))
            .filter(fund_flow_requests::status.ne_all(vec![
                FlowStatus::Cancelled.as_str(),
                FlowStatus::Rejected.as_str(),
            ]))
            .first::<FundFlowRequestDB>(&mut conn)
            .optional()
            .into_core()?;
        Ok(row.map(FundFlowRequest::from))
    }

    async fn insert(&self, new_request: NewFundFlowRequest) -> Result<FundFlowRequest> {
        let now = Utc::now();
        let row = FundFlowRequestDB {
            id: Uuid::new_v4().to_string(),
            investor_id: new_request.investor_id,
            flow_type: new_request.flow_type.as_str().to_string(),
            requested_amount: new_request.requested_amount.to_string(),
            effective_date: new_request.effective_date.unwrap_or(now.date_naive()),
            status: FlowStatus::Pending.as_str().to_string(),
            status_reason: None,
            matched_transaction_id: None,
            ledger_entry_id: None,
            shares_transacted: None,
            nav_per_share: None,
            realized_gain: None,
            tax_withheld: None,
            net_proceeds: None,
            submitted_at: format_timestamp(&now),
            updated_at: format_timestamp(&now),
        };

        self.writer
            .exec(move |conn| {
                let inserted = diesel::insert_into(fund_flow_requests::table)
                    .values(&row)
                    .get_result::<FundFlowRequestDB>(conn)
                    .into_core()?;
                Ok(FundFlowRequest::from(inserted))
            })
            .await
    }

    async fn update_status(
        &self,
        request_id: &str,
        expected_from: FlowStatus,
        to: FlowStatus,
        reason: Option<String>,
    ) -> Result<FundFlowRequest> {
        let request_id = request_id.to_string();
        self.writer
            .exec(move |conn| {
                let current = load_request(conn, &request_id)?;
                if current.status != expected_from.as_str() {
                    return Err(stale_status(&request_id, expected_from, &current.status));
                }

                // Cancelling a matched request releases the transaction for
                // re-matching.
                let clear_match =
                    expected_from == FlowStatus::Matched && to == FlowStatus::Cancelled;
                let now = format_timestamp(&Utc::now());

                let updated = if clear_match {
                    diesel::update(fund_flow_requests::table.find(&request_id))
                        .set((
                            fund_flow_requests::status.eq(to.as_str()),
                            fund_flow_requests::status_reason.eq(&reason),
                            fund_flow_requests::matched_transaction_id
                                .eq(None::<String>),
                            fund_flow_requests::updated_at.eq(&now),
                        ))
                        .get_result::<FundFlowRequestDB>(conn)
                        .into_core()?
                } else {
                    diesel::update(fund_flow_requests::table.find(&request_id))
                        .set((
                            fund_flow_requests::status.eq(to.as_str()),
                            fund_flow_requests::status_reason.eq(&reason),
                            fund_flow_requests::updated_at.eq(&now),
                        ))
                        .get_result::<FundFlowRequestDB>(conn)
                        .into_core()?
                };
                Ok(FundFlowRequest::from(updated))
            })
            .await
    }

    async fn set_matched(
        &self,
        request_id: &str,
        raw_transaction_id: &str,
    ) -> Result<FundFlowRequest> {
        let request_id = request_id.to_string();
        let raw_transaction_id = raw_transaction_id.to_string();
        self.writer
            .exec(move |conn| {
                let current = load_request(conn, &request_id)?;
                // Raced double-match on the same transaction is a no-op.
                if current.status == FlowStatus::Matched.as_str()
                    && current.matched_transaction_id.as_deref()
                        == Some(raw_transaction_id.as_str())
                {
                    return Ok(FundFlowRequest::from(current));
                }
                if current.status != FlowStatus::AwaitingFunds.as_str() {
                    return Err(stale_status(
                        &request_id,
                        FlowStatus::AwaitingFunds,
                        &current.status,
                    ));
                }

                let now = format_timestamp(&Utc::now());
                let updated = diesel::update(fund_flow_requests::table.find(&request_id))
                    .set((
                        fund_flow_requests::status.eq(FlowStatus::Matched.as_str()),
                        fund_flow_requests::matched_transaction_id
                            .eq(Some(raw_transaction_id.as_str())),
                        fund_flow_requests::updated_at.eq(&now),
                    ))
                    .get_result::<FundFlowRequestDB>(conn)
                    .into_core()?;
                Ok(FundFlowRequest::from(updated))
            })
            .await
    }

    async fn record_processed(&self, flow: ProcessedFlow) -> Result<FundFlowRequest> {
        self.writer
            .exec(move |conn| {
                let current = load_request(conn, &flow.request_id)?;
                // Exactly-once: a concurrent retry that lost the race gets
                // the stored result, with nothing re-posted.
                if current.status == FlowStatus::Processed.as_str() {
                    return Ok(FundFlowRequest::from(current));
                }
                if current.status != FlowStatus::Matched.as_str() {
                    return Err(stale_status(
                        &flow.request_id,
                        FlowStatus::Matched,
                        &current.status,
                    ));
                }

                let entry = insert_entry_row(conn, &flow.ledger_entry)?;
                apply_aggregate_delta(conn, &flow.aggregate_delta)?;
                if let Some(event) = &flow.tax_event {
                    insert_event_row(conn, event)?;
                }

                let now = format_timestamp(&Utc::now());
                let updated = diesel::update(fund_flow_requests::table.find(&flow.request_id))
                    .set((
                        fund_flow_requests::status.eq(FlowStatus::Processed.as_str()),
                        fund_flow_requests::ledger_entry_id.eq(Some(entry.id.as_str())),
                        fund_flow_requests::shares_transacted
                            .eq(Some(flow.shares_transacted.to_string())),
                        fund_flow_requests::nav_per_share.eq(Some(flow.nav_per_share.to_string())),
                        fund_flow_requests::realized_gain.eq(Some(flow.realized_gain.to_string())),
                        fund_flow_requests::tax_withheld.eq(Some(flow.tax_withheld.to_string())),
                        fund_flow_requests::net_proceeds.eq(Some(flow.net_proceeds.to_string())),
                        fund_flow_requests::updated_at.eq(&now),
                    ))
                    .get_result::<FundFlowRequestDB>(conn)
                    .into_core()?;
                Ok(FundFlowRequest::from(updated))
            })
            .await
    }
}
