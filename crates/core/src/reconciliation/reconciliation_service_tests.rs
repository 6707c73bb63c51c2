use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use fundledger_brokerage::{BrokerageError, BrokerageProvider, Position, RawTransaction};
use rust_decimal::Decimal;
use serde_json::json;
use std::sync::{Arc, Mutex};

use crate::errors::{DatabaseError, Error, Result};
use crate::reconciliation::{
    CanonicalTrade, EtlError, EtlStatus, RawBrokerageTransaction, ReconciliationRepositoryTrait,
    ReconciliationService, ReconciliationServiceTrait,
};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

// --- Mock ReconciliationRepository ---

#[derive(Clone, Default)]
struct MockReconciliationRepository {
    raws: Arc<Mutex<Vec<RawBrokerageTransaction>>>,
    trades: Arc<Mutex<Vec<CanonicalTrade>>>,
}

#[async_trait]
impl ReconciliationRepositoryTrait for MockReconciliationRepository {
    fn find_raw_by_id(&self, raw_id: &str) -> Result<Option<RawBrokerageTransaction>> {
        Ok(self
            .raws
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == raw_id)
            .cloned())
    }

    fn find_raw(
        &self,
        source: &str,
        external_id: &str,
    ) -> Result<Option<RawBrokerageTransaction>> {
        Ok(self
            .raws
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.source == source && r.external_id == external_id)
            .cloned())
    }

    fn list_raw_by_status(
        &self,
        source: &str,
        status: EtlStatus,
    ) -> Result<Vec<RawBrokerageTransaction>> {
        Ok(self
            .raws
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.source == source && r.etl_status == status)
            .cloned()
            .collect())
    }

    fn list_raw_pending_load(&self, source: &str) -> Result<Vec<RawBrokerageTransaction>> {
        Ok(self
            .raws
            .lock()
            .unwrap()
            .iter()
            .filter(|r| {
                r.source == source
                    && r.etl_status == EtlStatus::Transformed
                    && r.trade_id.is_none()
            })
            .cloned()
            .collect())
    }

    async fn insert_raw_batch(&self, rows: Vec<RawBrokerageTransaction>) -> Result<usize> {
        let mut raws = self.raws.lock().unwrap();
        let mut inserted = 0;
        for row in rows {
            let duplicate = raws
                .iter()
                .any(|r| r.source == row.source && r.external_id == row.external_id);
            if !duplicate {
                raws.push(row);
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn mark_transformed(&self, raw_id: &str) -> Result<()> {
        self.update_status(raw_id, EtlStatus::Transformed, None)
    }

    async fn mark_skipped(&self, raw_id: &str, reason: &str) -> Result<()> {
        self.update_status(raw_id, EtlStatus::Skipped, Some(reason.to_string()))
    }

    async fn mark_error(&self, raw_id: &str, message: &str) -> Result<()> {
        self.update_status(raw_id, EtlStatus::Error, Some(message.to_string()))
    }

    async fn load_trade(&self, raw_id: &str, trade: CanonicalTrade) -> Result<bool> {
        let mut trades = self.trades.lock().unwrap();
        let (trade_id, inserted) = match trades
            .iter()
            .find(|t| t.source == trade.source && t.external_id == trade.external_id)
        {
            Some(existing) => (existing.id.clone(), false),
            None => {
                let id = trade.id.clone();
                trades.push(trade);
                (id, true)
            }
        };
        let mut raws = self.raws.lock().unwrap();
        let raw = raws
            .iter_mut()
            .find(|r| r.id == raw_id)
            .ok_or_else(|| Error::Database(DatabaseError::NotFound(format!("raw {raw_id}"))))?;
        raw.trade_id = Some(trade_id);
        Ok(inserted)
    }

    fn get_trade(&self, trade_id: &str) -> Result<CanonicalTrade> {
        self.trades
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == trade_id)
            .cloned()
            .ok_or_else(|| Error::Database(DatabaseError::NotFound(format!("trade {trade_id}"))))
    }

    fn find_trade(&self, source: &str, external_id: &str) -> Result<Option<CanonicalTrade>> {
        Ok(self
            .trades
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.source == source && t.external_id == external_id)
            .cloned())
    }

    fn list_trades(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<CanonicalTrade>> {
        Ok(self
            .trades
            .lock()
            .unwrap()
            .iter()
            .filter(|t| start.is_none_or(|s| t.trade_date >= s))
            .filter(|t| end.is_none_or(|e| t.trade_date <= e))
            .cloned()
            .collect())
    }
}

impl MockReconciliationRepository {
    fn update_status(
        &self,
        raw_id: &str,
        status: EtlStatus,
        message: Option<String>,
    ) -> Result<()> {
        let mut raws = self.raws.lock().unwrap();
        let raw = raws
            .iter_mut()
            .find(|r| r.id == raw_id)
            .ok_or_else(|| Error::Database(DatabaseError::NotFound(format!("raw {raw_id}"))))?;
        raw.etl_status = status;
        raw.etl_message = message;
        Ok(())
    }
}

// --- Mock BrokerageProvider ---

struct MockProvider {
    transactions: Vec<RawTransaction>,
}

#[async_trait]
impl BrokerageProvider for MockProvider {
    fn id(&self) -> &'static str {
        "ALPACA"
    }

    async fn get_portfolio_value(
        &self,
        _date: NaiveDate,
    ) -> std::result::Result<Decimal, BrokerageError> {
        unimplemented!()
    }

    async fn get_positions(
        &self,
        _date: NaiveDate,
    ) -> std::result::Result<Vec<Position>, BrokerageError> {
        unimplemented!()
    }

    async fn get_raw_transactions(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> std::result::Result<Vec<RawTransaction>, BrokerageError> {
        Ok(self
            .transactions
            .iter()
            .filter(|t| {
                t.transacted_on
                    .map(|d| d >= start && d <= end)
                    .unwrap_or(true)
            })
            .cloned()
            .collect())
    }
}

fn activity(id: &str, on: &str, payload: serde_json::Value) -> RawTransaction {
    RawTransaction {
        external_id: id.to_string(),
        transacted_on: Some(date(on)),
        payload,
    }
}

fn sample_transactions() -> Vec<RawTransaction> {
    vec![
        activity(
            "a-1",
            "2025-06-02",
            json!({
                "activity_type": "CSD",
                "net_amount": "5000",
                "date": "2025-06-02"
            }),
        ),
        activity(
            "a-2",
            "2025-06-03",
            json!({
                "activity_type": "FILL",
                "side": "buy",
                "symbol": "VTI",
                "qty": "10",
                "price": "220.50",
                "transaction_time": "2025-06-03T14:30:00Z"
            }),
        ),
        // Corporate-action memo; skipped, not loaded.
        activity(
            "a-3",
            "2025-06-03",
            json!({ "activity_type": "SPLIT", "date": "2025-06-03" }),
        ),
        // Unrecognized shape; errored, siblings unaffected.
        activity(
            "a-4",
            "2025-06-04",
            json!({ "activity_type": "MYSTERY", "date": "2025-06-04" }),
        ),
    ]
}

fn service(
    transactions: Vec<RawTransaction>,
) -> (ReconciliationService, MockReconciliationRepository) {
    let repo = MockReconciliationRepository::default();
    let service = ReconciliationService::new(
        Arc::new(repo.clone()),
        vec![Arc::new(MockProvider { transactions })],
    );
    (service, repo)
}

// --- Tests ---

#[tokio::test]
async fn test_extract_dedupes_overlapping_windows() {
    let (service, repo) = service(sample_transactions());

    let first = service
        .extract("ALPACA", date("2025-06-01"), date("2025-06-03"))
        .await
        .unwrap();
    assert_eq!(first.fetched, 3);
    assert_eq!(first.inserted, 3);
    assert_eq!(first.duplicates, 0);

    // Overlapping window: two rows already present, one new.
    let second = service
        .extract("ALPACA", date("2025-06-03"), date("2025-06-05"))
        .await
        .unwrap();
    assert_eq!(second.fetched, 3);
    assert_eq!(second.inserted, 1);
    assert_eq!(second.duplicates, 2);

    assert_eq!(repo.raws.lock().unwrap().len(), 4);
}

#[tokio::test]
async fn test_transform_is_per_row() {
    let (service, repo) = service(sample_transactions());
    service
        .extract("ALPACA", date("2025-06-01"), date("2025-06-30"))
        .await
        .unwrap();

    let summary = service.transform("ALPACA").await.unwrap();
    assert_eq!(summary.transformed, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.errors.len(), 1);
    assert_eq!(summary.errors[0].external_id, "a-4");

    // The bad row is flagged on the row itself, siblings untouched.
    let errored = repo.find_raw("ALPACA", "a-4").unwrap().unwrap();
    assert_eq!(errored.etl_status, EtlStatus::Error);
    assert!(errored.etl_message.is_some());
    let skipped = repo.find_raw("ALPACA", "a-3").unwrap().unwrap();
    assert_eq!(skipped.etl_status, EtlStatus::Skipped);
}

#[tokio::test]
async fn test_load_links_and_is_idempotent() {
    let (service, repo) = service(sample_transactions());
    service
        .extract("ALPACA", date("2025-06-01"), date("2025-06-30"))
        .await
        .unwrap();
    service.transform("ALPACA").await.unwrap();

    let first = service.load("ALPACA").await.unwrap();
    assert_eq!(first.loaded, 2);
    assert_eq!(first.already_present, 0);

    // Re-running load does nothing: every transformed row is linked.
    let second = service.load("ALPACA").await.unwrap();
    assert_eq!(second.loaded, 0);
    assert_eq!(second.already_present, 0);

    assert_eq!(repo.trades.lock().unwrap().len(), 2);
    let deposit = repo.find_raw("ALPACA", "a-1").unwrap().unwrap();
    assert!(deposit.trade_id.is_some());
}

#[tokio::test]
async fn test_full_run_reports_stage_counts() {
    let (service, _) = service(sample_transactions());

    let report = service
        .run("ALPACA", date("2025-06-01"), date("2025-06-30"))
        .await
        .unwrap();

    assert_eq!(report.extract.fetched, 4);
    assert_eq!(report.transform.transformed, 2);
    assert_eq!(report.transform.skipped, 1);
    assert_eq!(report.transform.errors.len(), 1);
    assert_eq!(report.load.loaded, 2);

    // A second full run over the same window changes nothing.
    let rerun = service
        .run("ALPACA", date("2025-06-01"), date("2025-06-30"))
        .await
        .unwrap();
    assert_eq!(rerun.extract.inserted, 0);
    assert_eq!(rerun.transform.transformed, 0);
    assert_eq!(rerun.load.loaded, 0);
}

#[tokio::test]
async fn test_unknown_source_rejected() {
    let (service, _) = service(vec![]);
    let err = service
        .extract("ROBINHOOD", date("2025-06-01"), date("2025-06-30"))
        .await
        .expect_err("unconfigured source must be rejected");
    assert!(matches!(
        err,
        Error::Reconciliation(EtlError::UnknownSource(_))
    ));
}

#[tokio::test]
async fn test_inverted_window_rejected() {
    let (service, _) = service(vec![]);
    let err = service
        .extract("ALPACA", date("2025-06-30"), date("2025-06-01"))
        .await
        .expect_err("inverted window must be rejected");
    assert!(matches!(
        err,
        Error::Reconciliation(EtlError::InvalidWindow { .. })
    ));
}
