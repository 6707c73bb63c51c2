use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use fundledger_brokerage::BrokerageProvider;
use log::{debug, error, warn};
use std::sync::Arc;
use uuid::Uuid;

use super::mapping::{map_raw, MappingOutcome};
use super::reconciliation_errors::EtlError;
use super::reconciliation_model::{
    CanonicalTrade, EtlReport, EtlStatus, ExtractSummary, LoadSummary, MappedTrade,
    RawBrokerageTransaction, RowError, TransformSummary,
};
use super::reconciliation_traits::{ReconciliationRepositoryTrait, ReconciliationServiceTrait};
use crate::Result;

/// The extract-transform-load pipeline over one or more brokerage sources.
pub struct ReconciliationService {
    reconciliation_repository: Arc<dyn ReconciliationRepositoryTrait>,
    providers: Vec<Arc<dyn BrokerageProvider>>,
}

impl ReconciliationService {
    pub fn new(
        reconciliation_repository: Arc<dyn ReconciliationRepositoryTrait>,
        providers: Vec<Arc<dyn BrokerageProvider>>,
    ) -> Self {
        Self {
            reconciliation_repository,
            providers,
        }
    }

    fn provider_for(&self, source: &str) -> Result<&Arc<dyn BrokerageProvider>> {
        self.providers
            .iter()
            .find(|p| p.id() == source)
            .ok_or_else(|| EtlError::UnknownSource(source.to_string()).into())
    }

    fn build_trade(raw: &RawBrokerageTransaction, mapped: MappedTrade) -> CanonicalTrade {
        CanonicalTrade {
            id: Uuid::new_v4().to_string(),
            source: raw.source.clone(),
            external_id: raw.external_id.clone(),
            trade_date: mapped.trade_date,
            trade_type: mapped.trade_type,
            category: mapped.trade_type.category(),
            symbol: mapped.symbol,
            quantity: mapped.quantity,
            price: mapped.price,
            amount: mapped.amount,
            description: mapped.description,
            created_at: Utc::now(),
        }
    }
}

#[async_trait]
impl ReconciliationServiceTrait for ReconciliationService {
    async fn extract(
        &self,
        source: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ExtractSummary> {
        if start > end {
            return Err(EtlError::InvalidWindow { start, end }.into());
        }
        let provider = self.provider_for(source)?;
        let fetched = provider.get_raw_transactions(start, end).await?;
        let fetched_count = fetched.len();

        let rows: Vec<RawBrokerageTransaction> = fetched
            .into_iter()
            .map(|txn| RawBrokerageTransaction {
                id: Uuid::new_v4().to_string(),
                source: source.to_string(),
                external_id: txn.external_id,
                transacted_on: txn.transacted_on,
                payload: txn.payload,
                etl_status: EtlStatus::Pending,
                etl_message: None,
                trade_id: None,
                imported_at: Utc::now(),
            })
            .collect();

        let inserted = self.reconciliation_repository.insert_raw_batch(rows).await?;
        let summary = ExtractSummary {
            fetched: fetched_count,
            inserted,
            duplicates: fetched_count - inserted,
        };
        debug!(
            "Extracted {} rows from {} ({} new, {} already present)",
            summary.fetched, source, summary.inserted, summary.duplicates
        );
        Ok(summary)
    }

    async fn transform(&self, source: &str) -> Result<TransformSummary> {
        let pending = self
            .reconciliation_repository
            .list_raw_by_status(source, EtlStatus::Pending)?;

        // A fold over independent rows: every row gets an outcome, and a
        // bad one never blocks its siblings.
        let mut summary = TransformSummary::default();
        for row in pending {
            match map_raw(&row) {
                MappingOutcome::Trade(_) => {
                    self.reconciliation_repository
                        .mark_transformed(&row.id)
                        .await?;
                    summary.transformed += 1;
                }
                MappingOutcome::Skip(reason) => {
                    debug!(
                        "Skipping {} transaction {}: {}",
                        source, row.external_id, reason
                    );
                    self.reconciliation_repository
                        .mark_skipped(&row.id, &reason)
                        .await?;
                    summary.skipped += 1;
                }
                MappingOutcome::Error(message) => {
                    error!(
                        "Cannot classify {} transaction {} (raw id {}): {}",
                        source, row.external_id, row.id, message
                    );
                    self.reconciliation_repository
                        .mark_error(&row.id, &message)
                        .await?;
                    summary.errors.push(RowError {
                        raw_id: row.id,
                        external_id: row.external_id,
                        message,
                    });
                }
            }
        }
        Ok(summary)
    }

    async fn load(&self, source: &str) -> Result<LoadSummary> {
        let pending_load = self.reconciliation_repository.list_raw_pending_load(source)?;

        let mut summary = LoadSummary::default();
        for row in pending_load {
            // Mapping is deterministic over the stored payload, so the
            // trade is re-derived here rather than carried across stages.
            match map_raw(&row) {
                MappingOutcome::Trade(mapped) => {
                    let trade = Self::build_trade(&row, mapped);
                    let inserted = self
                        .reconciliation_repository
                        .load_trade(&row.id, trade)
                        .await?;
                    if inserted {
                        summary.loaded += 1;
                    } else {
                        summary.already_present += 1;
                    }
                }
                other => {
                    // A transformed row that no longer maps indicates the
                    // rules changed underneath it; flag it for review.
                    let message = match other {
                        MappingOutcome::Skip(reason) => reason,
                        MappingOutcome::Error(message) => message,
                        MappingOutcome::Trade(_) => unreachable!(),
                    };
                    warn!(
                        "Transformed row {} no longer maps to a trade: {}",
                        row.id, message
                    );
                    self.reconciliation_repository
                        .mark_error(&row.id, &message)
                        .await?;
                    summary.errors.push(RowError {
                        raw_id: row.id,
                        external_id: row.external_id,
                        message,
                    });
                }
            }
        }
        Ok(summary)
    }

    async fn run(&self, source: &str, start: NaiveDate, end: NaiveDate) -> Result<EtlReport> {
        let extract = self.extract(source, start, end).await?;
        let transform = self.transform(source).await?;
        let load = self.load(source).await?;

        debug!(
            "ETL run for {} [{} - {}]: {} extracted, {} transformed, {} loaded, {} errors",
            source,
            start,
            end,
            extract.fetched,
            transform.transformed,
            load.loaded,
            transform.errors.len() + load.errors.len()
        );

        Ok(EtlReport {
            source: source.to_string(),
            window_start: start,
            window_end: end,
            extract,
            transform,
            load,
        })
    }
}
