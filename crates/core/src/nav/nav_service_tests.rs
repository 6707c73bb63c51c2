use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use fundledger_brokerage::{BrokerageError, BrokerageProvider, Position, RawTransaction};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::{Arc, Mutex};

use crate::errors::{DatabaseError, Error, Result};
use crate::investors::{Investor, InvestorRepositoryTrait, InvestorUpdate, NewInvestor};
use crate::nav::{
    NavError, NavRecord, NavRepositoryTrait, NavService, NavServiceTrait, PositionSnapshot,
};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

// --- Mock NavRepository ---

#[derive(Clone, Default)]
struct MockNavRepository {
    records: Arc<Mutex<Vec<NavRecord>>>,
    snapshots: Arc<Mutex<Vec<(NaiveDate, String, usize)>>>,
}

#[async_trait]
impl NavRepositoryTrait for MockNavRepository {
    fn get_by_date(&self, date: NaiveDate) -> Result<Option<NavRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.nav_date == date)
            .cloned())
    }

    fn get_as_of(&self, date: NaiveDate) -> Result<Option<NavRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.nav_date <= date)
            .max_by_key(|r| r.nav_date)
            .cloned())
    }

    fn get_latest(&self) -> Result<Option<NavRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .max_by_key(|r| r.nav_date)
            .cloned())
    }

    fn get_history(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<NavRecord>> {
        let mut records: Vec<NavRecord> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| start.is_none_or(|s| r.nav_date >= s))
            .filter(|r| end.is_none_or(|e| r.nav_date <= e))
            .cloned()
            .collect();
        records.sort_by_key(|r| r.nav_date);
        Ok(records)
    }

    async fn insert(&self, record: NavRecord) -> Result<NavRecord> {
        let mut records = self.records.lock().unwrap();
        if records.iter().any(|r| r.nav_date == record.nav_date) {
            return Err(Error::Database(DatabaseError::UniqueViolation(format!(
                "nav_records.nav_date {}",
                record.nav_date
            ))));
        }
        records.push(record.clone());
        Ok(record)
    }

    async fn update(&self, record: NavRecord) -> Result<NavRecord> {
        let mut records = self.records.lock().unwrap();
        let existing = records
            .iter_mut()
            .find(|r| r.nav_date == record.nav_date)
            .ok_or_else(|| {
                Error::Database(DatabaseError::NotFound(format!(
                    "nav record {}",
                    record.nav_date
                )))
            })?;
        *existing = record.clone();
        Ok(record)
    }

    async fn save_position_snapshots(
        &self,
        date: NaiveDate,
        source: &str,
        positions: &[Position],
    ) -> Result<()> {
        self.snapshots
            .lock()
            .unwrap()
            .push((date, source.to_string(), positions.len()));
        Ok(())
    }

    fn get_position_snapshots(&self, _date: NaiveDate) -> Result<Vec<PositionSnapshot>> {
        Ok(Vec::new())
    }
}

// --- Mock InvestorRepository ---

#[derive(Clone, Default)]
struct MockInvestorRepository {
    total_shares: Arc<Mutex<Decimal>>,
}

#[async_trait]
impl InvestorRepositoryTrait for MockInvestorRepository {
    fn get_investor(&self, _investor_id: &str) -> Result<Investor> {
        unimplemented!()
    }

    fn list_investors(&self, _active_only: bool) -> Result<Vec<Investor>> {
        unimplemented!()
    }

    fn sum_outstanding_shares(&self) -> Result<Decimal> {
        Ok(*self.total_shares.lock().unwrap())
    }

    async fn create_investor(&self, _new_investor: NewInvestor) -> Result<Investor> {
        unimplemented!()
    }

    async fn update_investor(&self, _update: InvestorUpdate) -> Result<Investor> {
        unimplemented!()
    }
}

// --- Mock BrokerageProvider ---

struct MockProvider {
    portfolio_value: Decimal,
    positions_fail: bool,
}

#[async_trait]
impl BrokerageProvider for MockProvider {
    fn id(&self) -> &'static str {
        "MOCK"
    }

    async fn get_portfolio_value(
        &self,
        _date: NaiveDate,
    ) -> std::result::Result<Decimal, BrokerageError> {
        Ok(self.portfolio_value)
    }

    async fn get_positions(
        &self,
        date: NaiveDate,
    ) -> std::result::Result<Vec<Position>, BrokerageError> {
        if self.positions_fail {
            return Err(BrokerageError::NoData {
                provider: "MOCK",
                context: format!("positions on {date}"),
            });
        }
        Ok(vec![Position {
            symbol: "VTI".to_string(),
            quantity: dec!(100),
            market_value: self.portfolio_value,
            cost_basis: dec!(90000),
            currency: "USD".to_string(),
        }])
    }

    async fn get_raw_transactions(
        &self,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> std::result::Result<Vec<RawTransaction>, BrokerageError> {
        unimplemented!()
    }
}

fn service(
    portfolio_value: Decimal,
    total_shares: Decimal,
    positions_fail: bool,
) -> (NavService, MockNavRepository) {
    let nav_repo = MockNavRepository::default();
    let investor_repo = MockInvestorRepository {
        total_shares: Arc::new(Mutex::new(total_shares)),
    };
    let service = NavService::new(
        Arc::new(nav_repo.clone()),
        Arc::new(investor_repo),
        Arc::new(MockProvider {
            portfolio_value,
            positions_fail,
        }),
    );
    (service, nav_repo)
}

// --- Tests ---

#[tokio::test]
async fn test_calculate_nav_publishes_record() {
    let (service, nav_repo) = service(dec!(100000), dec!(1000), false);

    let record = service.calculate_nav(date("2025-06-02")).await.unwrap();

    assert_eq!(record.nav_per_share, dec!(100.0000));
    assert_eq!(record.portfolio_value, dec!(100000.00));
    assert_eq!(record.total_shares, dec!(1000));
    assert_eq!(record.day_change_pct, None);

    // Snapshot refresh rode along.
    assert_eq!(nav_repo.snapshots.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_republish_same_date_rejected() {
    let (service, _) = service(dec!(100000), dec!(1000), false);

    service.calculate_nav(date("2025-06-02")).await.unwrap();
    let err = service
        .calculate_nav(date("2025-06-02"))
        .await
        .expect_err("second publication for the same date must fail");
    assert!(matches!(err, Error::Nav(NavError::AlreadyPublished(_))));
}

#[tokio::test]
async fn test_zero_shares_rejected_and_nothing_stored() {
    let (service, nav_repo) = service(dec!(100000), dec!(0), false);

    let err = service
        .calculate_nav(date("2025-06-02"))
        .await
        .expect_err("a fund with no shares cannot be priced");
    assert!(matches!(err, Error::Nav(NavError::NoSharesOutstanding { .. })));
    assert!(nav_repo.records.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_negative_valuation_rejected() {
    let (service, nav_repo) = service(dec!(-100000), dec!(1000), false);

    let err = service
        .calculate_nav(date("2025-06-02"))
        .await
        .expect_err("negative valuation must surface, not store");
    assert!(matches!(err, Error::Nav(NavError::InvalidNav { .. })));
    assert!(nav_repo.records.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_snapshot_failure_does_not_block_publication() {
    let (service, nav_repo) = service(dec!(100000), dec!(1000), true);

    let record = service.calculate_nav(date("2025-06-02")).await.unwrap();
    assert_eq!(record.nav_per_share, dec!(100.0000));
    assert!(nav_repo.snapshots.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_nav_as_of_backdating_lookup() {
    let (service, _) = service(dec!(100000), dec!(1000), false);
    service.calculate_nav(date("2025-06-02")).await.unwrap();

    // A date between publications resolves to the one in force.
    let as_of = service.get_nav_as_of(date("2025-06-04")).unwrap();
    assert_eq!(as_of.nav_date, date("2025-06-02"));

    let err = service
        .get_nav_as_of(date("2025-06-01"))
        .expect_err("no record on or before this date");
    assert!(matches!(err, Error::Nav(NavError::NotAvailable(_))));
}

#[tokio::test]
async fn test_day_change_against_previous_record() {
    let (service, nav_repo) = service(dec!(100000), dec!(1000), false);
    service.calculate_nav(date("2025-06-02")).await.unwrap();

    // Next day the portfolio is worth 2% more.
    let (service2, _) = {
        let investor_repo = MockInvestorRepository {
            total_shares: Arc::new(Mutex::new(dec!(1000))),
        };
        let s = NavService::new(
            Arc::new(nav_repo.clone()),
            Arc::new(investor_repo),
            Arc::new(MockProvider {
                portfolio_value: dec!(102000),
                positions_fail: false,
            }),
        );
        (s, ())
    };
    let record = service2.calculate_nav(date("2025-06-03")).await.unwrap();
    assert_eq!(record.day_change_pct, Some(dec!(2.0000)));
}

#[tokio::test]
async fn test_correct_nav_restates_in_place() {
    let (service, nav_repo) = service(dec!(100000), dec!(1000), false);
    service.calculate_nav(date("2025-06-02")).await.unwrap();

    let corrected = service
        .correct_nav(date("2025-06-02"), dec!(99000))
        .await
        .unwrap();
    assert_eq!(corrected.nav_per_share, dec!(99.0000));
    // Still exactly one record for the date.
    assert_eq!(nav_repo.records.lock().unwrap().len(), 1);

    let err = service
        .correct_nav(date("2025-07-01"), dec!(99000))
        .await
        .expect_err("correcting an unpublished date must fail");
    assert!(matches!(err, Error::Nav(NavError::NotAvailable(_))));
}

#[tokio::test]
async fn test_share_equality_audit() {
    let (service, _) = service(dec!(100000), dec!(1000), false);
    service.calculate_nav(date("2025-06-02")).await.unwrap();
    service.verify_fund_share_equality().unwrap();

    // Drift the ledger total away from the published record.
    let (drifted, nav_repo2) = {
        let nav_repo = MockNavRepository::default();
        let investor_repo = MockInvestorRepository {
            total_shares: Arc::new(Mutex::new(dec!(1000))),
        };
        let s = NavService::new(
            Arc::new(nav_repo.clone()),
            Arc::new(investor_repo.clone()),
            Arc::new(MockProvider {
                portfolio_value: dec!(100000),
                positions_fail: false,
            }),
        );
        s.calculate_nav(date("2025-06-02")).await.unwrap();
        *investor_repo.total_shares.lock().unwrap() = dec!(900);
        (s, nav_repo)
    };
    let _ = nav_repo2;
    let err = drifted
        .verify_fund_share_equality()
        .expect_err("drift must be reported");
    assert!(matches!(err, Error::Nav(NavError::ShareMismatch { .. })));
}
