use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::{Arc, Mutex};

use crate::errors::{DatabaseError, Error, Result};
use crate::investors::{
    Investor, InvestorRepositoryTrait, InvestorService, InvestorServiceTrait, InvestorUpdate,
    NewInvestor,
};
use crate::nav::{NavError, NavRecord, NavServiceTrait};
use crate::tax::{TaxConfig, TaxPolicy};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[derive(Clone, Default)]
struct MockInvestorRepository {
    investors: Arc<Mutex<Vec<Investor>>>,
}

#[async_trait]
impl InvestorRepositoryTrait for MockInvestorRepository {
    fn get_investor(&self, investor_id: &str) -> Result<Investor> {
        self.investors
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.id == investor_id)
            .cloned()
            .ok_or_else(|| {
                Error::Database(DatabaseError::NotFound(format!("investor {investor_id}")))
            })
    }

    fn list_investors(&self, active_only: bool) -> Result<Vec<Investor>> {
        Ok(self
            .investors
            .lock()
            .unwrap()
            .iter()
            .filter(|i| !active_only || i.is_active)
            .cloned()
            .collect())
    }

    fn sum_outstanding_shares(&self) -> Result<Decimal> {
        Ok(self
            .investors
            .lock()
            .unwrap()
            .iter()
            .map(|i| i.current_shares)
            .sum())
    }

    async fn create_investor(&self, new_investor: NewInvestor) -> Result<Investor> {
        let investor = Investor {
            id: new_investor.id.unwrap_or_else(|| "generated".to_string()),
            name: new_investor.name,
            email: new_investor.email,
            is_active: true,
            current_shares: dec!(0),
            net_investment: dec!(0),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.investors.lock().unwrap().push(investor.clone());
        Ok(investor)
    }

    async fn update_investor(&self, update: InvestorUpdate) -> Result<Investor> {
        let mut investors = self.investors.lock().unwrap();
        let investor = investors
            .iter_mut()
            .find(|i| i.id == update.id)
            .ok_or_else(|| {
                Error::Database(DatabaseError::NotFound(format!("investor {}", update.id)))
            })?;
        investor.name = update.name;
        investor.email = update.email;
        investor.is_active = update.is_active;
        investor.updated_at = Utc::now();
        Ok(investor.clone())
    }
}

struct MockNavService {
    record: Option<NavRecord>,
}

#[async_trait]
impl NavServiceTrait for MockNavService {
    async fn calculate_nav(&self, _date: NaiveDate) -> Result<NavRecord> {
        unimplemented!()
    }

    async fn correct_nav(&self, _date: NaiveDate, _portfolio_value: Decimal) -> Result<NavRecord> {
        unimplemented!()
    }

    fn get_nav_as_of(&self, as_of: NaiveDate) -> Result<NavRecord> {
        self.record
            .clone()
            .ok_or_else(|| NavError::NotAvailable(as_of).into())
    }

    fn get_latest_nav(&self) -> Result<Option<NavRecord>> {
        Ok(self.record.clone())
    }

    fn get_nav_history(
        &self,
        _start: Option<NaiveDate>,
        _end: Option<NaiveDate>,
    ) -> Result<Vec<NavRecord>> {
        Ok(self.record.clone().into_iter().collect())
    }

    fn verify_fund_share_equality(&self) -> Result<()> {
        Ok(())
    }
}

fn service(investors: Vec<Investor>, nav_per_share: Option<Decimal>) -> InvestorService {
    let repo = MockInvestorRepository {
        investors: Arc::new(Mutex::new(investors)),
    };
    let nav_service = MockNavService {
        record: nav_per_share.map(|nav| NavRecord {
            nav_date: date("2025-06-02"),
            portfolio_value: dec!(0),
            total_shares: dec!(0),
            nav_per_share: nav,
            day_change_pct: None,
            calculated_at: Utc::now(),
        }),
    };
    InvestorService::new(
        Arc::new(repo),
        Arc::new(nav_service),
        TaxConfig {
            policy: TaxPolicy::Withholding,
            rate: dec!(0.37),
        },
    )
}

fn investor(id: &str, shares: Decimal, net_investment: Decimal) -> Investor {
    Investor {
        id: id.to_string(),
        name: format!("Investor {id}"),
        email: None,
        is_active: true,
        current_shares: shares,
        net_investment,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[tokio::test]
async fn test_create_validates_name() {
    let svc = service(vec![], None);
    let err = svc
        .create_investor(NewInvestor {
            id: None,
            name: "   ".to_string(),
            email: None,
        })
        .await
        .expect_err("blank name must be rejected");
    assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn test_deactivate_keeps_investor_on_record() {
    let svc = service(vec![investor("inv-1", dec!(100), dec!(10000))], None);

    let deactivated = svc.deactivate_investor("inv-1").await.unwrap();
    assert!(!deactivated.is_active);

    // Still listed when inactive investors are included.
    assert_eq!(svc.list_investors(false).unwrap().len(), 1);
    assert!(svc.list_investors(true).unwrap().is_empty());
}

#[test]
fn test_valuation_projects_value_and_estimate() {
    let svc = service(
        vec![investor("inv-1", dec!(14750), dec!(15000))],
        Some(dec!(1.2864)),
    );

    let valuation = svc.get_valuation("inv-1", date("2025-06-02")).unwrap();
    assert_eq!(valuation.current_value, dec!(18974.40));
    assert_eq!(valuation.unrealized_gain, dec!(3974.40));
    // value minus the tax a full liquidation would trigger
    assert_eq!(valuation.eligible_withdrawal, dec!(17503.87));
}

#[test]
fn test_valuation_at_a_loss() {
    let svc = service(
        vec![investor("inv-1", dec!(100), dec!(15000))],
        Some(dec!(100)),
    );

    let valuation = svc.get_valuation("inv-1", date("2025-06-02")).unwrap();
    assert_eq!(valuation.current_value, dec!(10000.00));
    assert_eq!(valuation.unrealized_gain, dec!(-5000.00));
    assert_eq!(valuation.eligible_withdrawal, dec!(10000.00));
}

#[test]
fn test_valuation_requires_published_nav() {
    let svc = service(vec![investor("inv-1", dec!(100), dec!(10000))], None);
    let err = svc
        .get_valuation("inv-1", date("2025-06-02"))
        .expect_err("no NAV, no valuation");
    assert!(matches!(err, Error::Nav(NavError::NotAvailable(_))));
}
