//! Database models for raw brokerage transactions and canonical trades.

use chrono::NaiveDate;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use fundledger_core::reconciliation::{
    CanonicalTrade, EtlStatus, RawBrokerageTransaction, TradeCategory, TradeType,
};

use crate::utils::{format_timestamp, parse_decimal_string_tolerant, parse_timestamp_tolerant};

/// Database model for raw brokerage transactions.
#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, Serialize, Deserialize, Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::raw_brokerage_transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RawBrokerageTransactionDB {
    pub id: String,
    pub source: String,
    pub external_id: String,
    pub transacted_on: Option<NaiveDate>,
    pub payload: String,
    pub etl_status: String,
    pub etl_message: Option<String>,
    pub trade_id: Option<String>,
    pub imported_at: String,
}

impl From<RawBrokerageTransactionDB> for RawBrokerageTransaction {
    fn from(db: RawBrokerageTransactionDB) -> Self {
        RawBrokerageTransaction {
            payload: serde_json::from_str(&db.payload).unwrap_or_else(|e| {
                log::error!("Unparseable payload on raw transaction {}: {}", db.id, e);
                serde_json::Value::Null
            }),
            etl_status: EtlStatus::from_str(&db.etl_status).unwrap_or_else(|| {
                log::error!("Unknown etl_status '{}' on {}", db.etl_status, db.id);
                EtlStatus::Error
            }),
            imported_at: parse_timestamp_tolerant(&db.imported_at, "imported_at"),
            id: db.id,
            source: db.source,
            external_id: db.external_id,
            transacted_on: db.transacted_on,
            etl_message: db.etl_message,
            trade_id: db.trade_id,
        }
    }
}

impl From<&RawBrokerageTransaction> for RawBrokerageTransactionDB {
    fn from(raw: &RawBrokerageTransaction) -> Self {
        RawBrokerageTransactionDB {
            id: raw.id.clone(),
            source: raw.source.clone(),
            external_id: raw.external_id.clone(),
            transacted_on: raw.transacted_on,
            payload: raw.payload.to_string(),
            etl_status: raw.etl_status.as_str().to_string(),
            etl_message: raw.etl_message.clone(),
            trade_id: raw.trade_id.clone(),
            imported_at: format_timestamp(&raw.imported_at),
        }
    }
}

/// Database model for canonical trades.
#[derive(Queryable, Identifiable, Insertable, Selectable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::canonical_trades)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CanonicalTradeDB {
    pub id: String,
    pub source: String,
    pub external_id: String,
    pub trade_date: NaiveDate,
    pub trade_type: String,
    pub category: String,
    pub symbol: Option<String>,
    pub quantity: Option<String>,
    pub price: Option<String>,
    pub amount: String,
    pub description: Option<String>,
    pub created_at: String,
}

impl From<CanonicalTradeDB> for CanonicalTrade {
    fn from(db: CanonicalTradeDB) -> Self {
        let trade_type = TradeType::from_str(&db.trade_type).unwrap_or_else(|| {
            log::error!("Unknown trade_type '{}' on {}", db.trade_type, db.id);
            TradeType::Fee
        });
        CanonicalTrade {
            category: TradeCategory::from_str(&db.category).unwrap_or(trade_type.category()),
            trade_type,
            quantity: db
                .quantity
                .as_deref()
                .map(|v| parse_decimal_string_tolerant(v, "quantity")),
            price: db
                .price
                .as_deref()
                .map(|v| parse_decimal_string_tolerant(v, "price")),
            amount: parse_decimal_string_tolerant(&db.amount, "amount"),
            created_at: parse_timestamp_tolerant(&db.created_at, "created_at"),
            id: db.id,
            source: db.source,
            external_id: db.external_id,
            trade_date: db.trade_date,
            symbol: db.symbol,
            description: db.description,
        }
    }
}

impl From<&CanonicalTrade> for CanonicalTradeDB {
    fn from(trade: &CanonicalTrade) -> Self {
        CanonicalTradeDB {
            id: trade.id.clone(),
            source: trade.source.clone(),
            external_id: trade.external_id.clone(),
            trade_date: trade.trade_date,
            trade_type: trade.trade_type.as_str().to_string(),
            category: trade.category.as_str().to_string(),
            symbol: trade.symbol.clone(),
            quantity: trade.quantity.map(|v| v.to_string()),
            price: trade.price.map(|v| v.to_string()),
            amount: trade.amount.to_string(),
            description: trade.description.clone(),
            created_at: format_timestamp(&trade.created_at),
        }
    }
}
