use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal_macros::dec;
use std::sync::{Arc, Mutex};

use crate::errors::{DatabaseError, Error, Result};
use crate::tax::{
    TaxConfig, TaxEvent, TaxEventRepositoryTrait, TaxEventService, TaxEventServiceTrait,
    TaxPolicy,
};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[derive(Clone, Default)]
struct MockTaxEventRepository {
    events: Arc<Mutex<Vec<TaxEvent>>>,
}

#[async_trait]
impl TaxEventRepositoryTrait for MockTaxEventRepository {
    fn get_event(&self, event_id: &str) -> Result<TaxEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.id == event_id)
            .cloned()
            .ok_or_else(|| Error::Database(DatabaseError::NotFound(format!("event {event_id}"))))
    }

    fn find_by_ledger_entry(&self, ledger_entry_id: &str) -> Result<Option<TaxEvent>> {
        Ok(self
            .events
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.ledger_entry_id == ledger_entry_id)
            .cloned())
    }

    fn get_events_for_investor(&self, investor_id: &str) -> Result<Vec<TaxEvent>> {
        Ok(self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.investor_id == investor_id)
            .cloned()
            .collect())
    }

    fn get_events_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<TaxEvent>> {
        Ok(self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.event_date >= start && e.event_date <= end)
            .cloned()
            .collect())
    }

    async fn insert(&self, event: TaxEvent) -> Result<TaxEvent> {
        self.events.lock().unwrap().push(event.clone());
        Ok(event)
    }
}

fn event(id: &str, on: &str, gain: rust_decimal::Decimal) -> TaxEvent {
    TaxEvent {
        id: id.to_string(),
        investor_id: "inv-1".to_string(),
        event_date: date(on),
        withdrawal_amount: dec!(1000),
        realized_gain: gain,
        tax_due: gain * dec!(0.37),
        policy: TaxPolicy::QuarterlySettlement,
        ledger_entry_id: format!("entry-{id}"),
        reverses_event_id: None,
        created_at: Utc::now(),
    }
}

fn service(repo: MockTaxEventRepository, policy: TaxPolicy) -> TaxEventService {
    TaxEventService::new(
        Arc::new(repo),
        TaxConfig {
            policy,
            rate: dec!(0.37),
        },
    )
}

#[test]
fn test_build_event_stamps_active_policy() {
    let svc = service(MockTaxEventRepository::default(), TaxPolicy::Withholding);
    let figures = svc.compute(dec!(1000), dec!(18974.40), dec!(15000));

    let event = svc
        .build_event("inv-1", date("2025-06-02"), dec!(1000), &figures, "entry-1")
        .expect("gain must book an event");
    assert_eq!(event.policy, TaxPolicy::Withholding);
    assert_eq!(event.realized_gain, dec!(209.46));
    assert_eq!(event.tax_due, dec!(77.50));
    assert_eq!(event.ledger_entry_id, "entry-1");
}

#[test]
fn test_build_event_skips_zero_gain() {
    let svc = service(MockTaxEventRepository::default(), TaxPolicy::Withholding);
    let figures = svc.compute(dec!(1000), dec!(12000), dec!(15000));
    assert!(svc
        .build_event("inv-1", date("2025-06-02"), dec!(1000), &figures, "entry-1")
        .is_none());
}

#[test]
fn test_quarterly_summary_bounds() {
    let repo = MockTaxEventRepository::default();
    repo.events.lock().unwrap().extend([
        event("e-1", "2025-03-31", dec!(100)), // Q1
        event("e-2", "2025-04-01", dec!(200)), // Q2
        event("e-3", "2025-06-30", dec!(300)), // Q2
        event("e-4", "2025-07-01", dec!(400)), // Q3
    ]);
    let svc = service(repo, TaxPolicy::QuarterlySettlement);

    let summary = svc.get_quarterly_summary(2025, 2).unwrap();
    assert_eq!(summary.events.len(), 2);
    assert_eq!(summary.total_realized_gain, dec!(500));
    assert_eq!(summary.total_tax_due, dec!(185.00));
}

#[test]
fn test_fourth_quarter_spans_year_end() {
    let repo = MockTaxEventRepository::default();
    repo.events
        .lock()
        .unwrap()
        .push(event("e-1", "2025-12-31", dec!(100)));
    let svc = service(repo, TaxPolicy::QuarterlySettlement);

    let summary = svc.get_quarterly_summary(2025, 4).unwrap();
    assert_eq!(summary.events.len(), 1);
}

#[test]
fn test_invalid_quarter_rejected() {
    let svc = service(MockTaxEventRepository::default(), TaxPolicy::Withholding);
    assert!(svc.get_quarterly_summary(2025, 0).is_err());
    assert!(svc.get_quarterly_summary(2025, 5).is_err());
}

#[test]
fn test_compensating_events_cancel_in_summary() {
    let repo = MockTaxEventRepository::default();
    let mut original = event("e-1", "2025-05-10", dec!(250));
    original.tax_due = dec!(92.50);
    let mut compensating = event("e-2", "2025-05-20", dec!(-250));
    compensating.tax_due = dec!(-92.50);
    compensating.reverses_event_id = Some("e-1".to_string());
    repo.events.lock().unwrap().extend([original, compensating]);
    let svc = service(repo, TaxPolicy::QuarterlySettlement);

    let summary = svc.get_quarterly_summary(2025, 2).unwrap();
    assert_eq!(summary.total_realized_gain, dec!(0));
    assert_eq!(summary.total_tax_due, dec!(0.00));
}
