//! Database models for tax events.

use chrono::NaiveDate;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use fundledger_core::tax::{TaxEvent, TaxPolicy};

use crate::utils::{format_timestamp, parse_decimal_string_tolerant, parse_timestamp_tolerant};

/// Database model for tax events. Insert-only.
#[derive(Queryable, Identifiable, Insertable, Selectable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::tax_events)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TaxEventDB {
    pub id: String,
    pub investor_id: String,
    pub event_date: NaiveDate,
    pub withdrawal_amount: String,
    pub realized_gain: String,
    pub tax_due: String,
    pub policy: String,
    pub ledger_entry_id: String,
    pub reverses_event_id: Option<String>,
    pub created_at: String,
}

impl From<TaxEventDB> for TaxEvent {
    fn from(db: TaxEventDB) -> Self {
        TaxEvent {
            withdrawal_amount: parse_decimal_string_tolerant(
                &db.withdrawal_amount,
                "withdrawal_amount",
            ),
            realized_gain: parse_decimal_string_tolerant(&db.realized_gain, "realized_gain"),
            tax_due: parse_decimal_string_tolerant(&db.tax_due, "tax_due"),
            policy: TaxPolicy::parse(&db.policy).unwrap_or_else(|_| {
                log::error!("Unknown tax policy '{}' on event {}", db.policy, db.id);
                TaxPolicy::default()
            }),
            created_at: parse_timestamp_tolerant(&db.created_at, "created_at"),
            id: db.id,
            investor_id: db.investor_id,
            event_date: db.event_date,
            ledger_entry_id: db.ledger_entry_id,
            reverses_event_id: db.reverses_event_id,
        }
    }
}

impl From<&TaxEvent> for TaxEventDB {
    fn from(event: &TaxEvent) -> Self {
        TaxEventDB {
            id: event.id.clone(),
            investor_id: event.investor_id.clone(),
            event_date: event.event_date,
            withdrawal_amount: event.withdrawal_amount.to_string(),
            realized_gain: event.realized_gain.to_string(),
            tax_due: event.tax_due.to_string(),
            policy: event.policy.as_str().to_string(),
            ledger_entry_id: event.ledger_entry_id.clone(),
            reverses_event_id: event.reverses_event_id.clone(),
            created_at: format_timestamp(&event.created_at),
        }
    }
}
