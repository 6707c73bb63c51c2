//! Source-specific classification of raw brokerage transactions.
//!
//! Each supported source gets one mapper; both normalize into the same
//! canonical shape. Mapping is deterministic over the stored payload, so
//! the load stage can re-derive a trade from a transformed row at any time.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use super::reconciliation_model::{MappedTrade, RawBrokerageTransaction, TradeType};
use fundledger_brokerage::{SOURCE_ALPACA, SOURCE_IB_PORTAL};

/// Result of classifying one raw row.
#[derive(Debug, Clone, PartialEq)]
pub enum MappingOutcome {
    /// The row is a financial transaction; load it as this trade.
    Trade(MappedTrade),
    /// The row is deliberately not loaded (non-financial metadata).
    Skip(String),
    /// The row's shape was not recognized; recorded on the row, does not
    /// halt the batch.
    Error(String),
}

/// Classifies a raw row according to its source's rules.
pub fn map_raw(raw: &RawBrokerageTransaction) -> MappingOutcome {
    match raw.source.as_str() {
        SOURCE_ALPACA => map_alpaca(raw),
        SOURCE_IB_PORTAL => map_ib_portal(raw),
        other => MappingOutcome::Error(format!("no mapping rules for source '{other}'")),
    }
}

fn field_str<'a>(raw: &'a RawBrokerageTransaction, key: &str) -> Option<&'a str> {
    raw.payload.get(key).and_then(|v| v.as_str())
}

fn field_decimal(raw: &RawBrokerageTransaction, key: &str) -> Option<Decimal> {
    match raw.payload.get(key)? {
        serde_json::Value::String(s) => Decimal::from_str(s).ok(),
        serde_json::Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        _ => None,
    }
}

fn trade_date(raw: &RawBrokerageTransaction, key: &str) -> Option<NaiveDate> {
    raw.transacted_on.or_else(|| {
        field_str(raw, key)
            .and_then(|s| s.get(..10))
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
    })
}

/// Alpaca account activities: `activity_type` drives the classification.
fn map_alpaca(raw: &RawBrokerageTransaction) -> MappingOutcome {
    let Some(activity_type) = field_str(raw, "activity_type") else {
        return MappingOutcome::Error("activity record has no activity_type".to_string());
    };

    let Some(date) = trade_date(raw, "date").or_else(|| trade_date(raw, "transaction_time"))
    else {
        return MappingOutcome::Error(format!(
            "activity {activity_type} has no usable date"
        ));
    };

    let description = field_str(raw, "description").map(str::to_string);

    match activity_type {
        "FILL" => {
            let side = field_str(raw, "side").unwrap_or_default();
            let trade_type = match side {
                "buy" => TradeType::Buy,
                "sell" | "sell_short" => TradeType::Sell,
                other => {
                    return MappingOutcome::Error(format!("unrecognized fill side '{other}'"))
                }
            };
            let qty = field_decimal(raw, "qty");
            let price = field_decimal(raw, "price");
            let amount = match (qty, price) {
                (Some(q), Some(p)) => (q * p).abs(),
                _ => return MappingOutcome::Error("fill without qty/price".to_string()),
            };
            MappingOutcome::Trade(MappedTrade {
                trade_date: date,
                trade_type,
                symbol: field_str(raw, "symbol").map(str::to_string),
                quantity: qty.map(|q| q.abs()),
                price,
                amount,
                description,
            })
        }
        "CSD" | "CSW" | "TRANS" | "ACATC" | "ACATS" => {
            let net_amount = field_decimal(raw, "net_amount").unwrap_or_default();
            if net_amount.is_zero() {
                // Position-only transfers carry no cash and are matched by
                // their FILL-equivalent entries instead.
                return MappingOutcome::Skip(format!(
                    "{activity_type} with no cash movement"
                ));
            }
            let trade_type = if activity_type == "CSD"
                || (activity_type != "CSW" && net_amount > Decimal::ZERO)
            {
                TradeType::AchDeposit
            } else {
                TradeType::AchWithdrawal
            };
            MappingOutcome::Trade(MappedTrade {
                trade_date: date,
                trade_type,
                symbol: None,
                quantity: None,
                price: None,
                amount: net_amount.abs(),
                description,
            })
        }
        "DIV" | "DIVCGL" | "DIVCGS" | "DIVNRA" | "DIVROC" => {
            match field_decimal(raw, "net_amount") {
                Some(amount) if !amount.is_zero() => MappingOutcome::Trade(MappedTrade {
                    trade_date: date,
                    trade_type: TradeType::Dividend,
                    symbol: field_str(raw, "symbol").map(str::to_string),
                    quantity: None,
                    price: None,
                    amount: amount.abs(),
                    description,
                }),
                _ => MappingOutcome::Error(format!("{activity_type} without net_amount")),
            }
        }
        "INT" | "INTNRA" => match field_decimal(raw, "net_amount") {
            Some(amount) => MappingOutcome::Trade(MappedTrade {
                trade_date: date,
                trade_type: TradeType::Interest,
                symbol: None,
                quantity: None,
                price: None,
                amount: amount.abs(),
                description,
            }),
            None => MappingOutcome::Error("INT without net_amount".to_string()),
        },
        "FEE" | "PTC" | "NRA" => match field_decimal(raw, "net_amount") {
            Some(amount) => MappingOutcome::Trade(MappedTrade {
                trade_date: date,
                trade_type: TradeType::Fee,
                symbol: None,
                quantity: None,
                price: None,
                amount: amount.abs(),
                description,
            }),
            None => MappingOutcome::Error(format!("{activity_type} without net_amount")),
        },
        // Corporate-action memos carry no cash and no shares of ours.
        "MA" | "REORG" | "SPIN" | "SPLIT" | "SSO" | "SSP" => {
            MappingOutcome::Skip(format!("non-financial corporate action {activity_type}"))
        }
        other => MappingOutcome::Error(format!("unrecognized activity_type '{other}'")),
    }
}

/// IB Client Portal transactions: free-form `type` strings.
fn map_ib_portal(raw: &RawBrokerageTransaction) -> MappingOutcome {
    let Some(txn_type) = field_str(raw, "type") else {
        return MappingOutcome::Error("transaction record has no type".to_string());
    };

    let Some(date) = trade_date(raw, "date") else {
        return MappingOutcome::Error(format!("transaction '{txn_type}' has no usable date"));
    };

    let amount = field_decimal(raw, "amt").unwrap_or_default();
    let description = field_str(raw, "desc").map(str::to_string);
    let symbol = field_str(raw, "symbol").map(str::to_string);

    let trade_type = match txn_type {
        "Buy" => TradeType::Buy,
        "Sell" => TradeType::Sell,
        "Dividends" | "Payment In Lieu Of Dividends" => TradeType::Dividend,
        "Broker Interest Received" | "Broker Interest Paid" | "Interest" => TradeType::Interest,
        "Other Fees" | "Commission Adjustments" | "Fees" => TradeType::Fee,
        "Deposits & Withdrawals" | "Deposits/Withdrawals" => {
            if amount.is_zero() {
                return MappingOutcome::Skip("cash movement with zero amount".to_string());
            } else if amount > Decimal::ZERO {
                TradeType::AchDeposit
            } else {
                TradeType::AchWithdrawal
            }
        }
        "Corporate Actions" | "Transfers" => {
            return MappingOutcome::Skip(format!("non-cash entry '{txn_type}'"));
        }
        other => return MappingOutcome::Error(format!("unrecognized transaction type '{other}'")),
    };

    if matches!(trade_type, TradeType::Buy | TradeType::Sell) {
        let quantity = field_decimal(raw, "qty").map(|q| q.abs());
        let price = field_decimal(raw, "pr");
        return MappingOutcome::Trade(MappedTrade {
            trade_date: date,
            trade_type,
            symbol,
            quantity,
            price,
            amount: amount.abs(),
            description,
        });
    }

    MappingOutcome::Trade(MappedTrade {
        trade_date: date,
        trade_type,
        symbol,
        quantity: None,
        price: None,
        amount: amount.abs(),
        description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconciliation::EtlStatus;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn raw(source: &str, payload: serde_json::Value) -> RawBrokerageTransaction {
        RawBrokerageTransaction {
            id: "raw-1".to_string(),
            source: source.to_string(),
            external_id: "ext-1".to_string(),
            transacted_on: None,
            payload,
            etl_status: EtlStatus::Pending,
            etl_message: None,
            trade_id: None,
            imported_at: Utc::now(),
        }
    }

    #[test]
    fn test_alpaca_fill_buy() {
        let row = raw(
            SOURCE_ALPACA,
            json!({
                "activity_type": "FILL",
                "side": "buy",
                "symbol": "VTI",
                "qty": "10",
                "price": "220.50",
                "transaction_time": "2025-06-02T14:30:00Z"
            }),
        );
        match map_raw(&row) {
            MappingOutcome::Trade(trade) => {
                assert_eq!(trade.trade_type, TradeType::Buy);
                assert_eq!(trade.symbol.as_deref(), Some("VTI"));
                assert_eq!(trade.amount, dec!(2205.00));
            }
            other => panic!("expected trade, got {other:?}"),
        }
    }

    #[test]
    fn test_alpaca_cash_deposit() {
        let row = raw(
            SOURCE_ALPACA,
            json!({
                "activity_type": "CSD",
                "net_amount": "5000",
                "date": "2025-06-02"
            }),
        );
        match map_raw(&row) {
            MappingOutcome::Trade(trade) => {
                assert_eq!(trade.trade_type, TradeType::AchDeposit);
                assert_eq!(trade.amount, dec!(5000));
            }
            other => panic!("expected trade, got {other:?}"),
        }
    }

    #[test]
    fn test_alpaca_corporate_action_skipped() {
        let row = raw(
            SOURCE_ALPACA,
            json!({ "activity_type": "SPLIT", "date": "2025-06-02" }),
        );
        assert!(matches!(map_raw(&row), MappingOutcome::Skip(_)));
    }

    #[test]
    fn test_alpaca_unknown_type_is_error() {
        let row = raw(
            SOURCE_ALPACA,
            json!({ "activity_type": "XYZ", "date": "2025-06-02" }),
        );
        assert!(matches!(map_raw(&row), MappingOutcome::Error(_)));
    }

    #[test]
    fn test_ib_withdrawal_by_sign() {
        let row = raw(
            SOURCE_IB_PORTAL,
            json!({
                "type": "Deposits & Withdrawals",
                "amt": -2500.0,
                "date": "2025-06-03",
                "desc": "ACH DISBURSEMENT"
            }),
        );
        match map_raw(&row) {
            MappingOutcome::Trade(trade) => {
                assert_eq!(trade.trade_type, TradeType::AchWithdrawal);
                assert_eq!(trade.amount, dec!(2500.0));
            }
            other => panic!("expected trade, got {other:?}"),
        }
    }

    #[test]
    fn test_ib_sell_with_quantity() {
        let row = raw(
            SOURCE_IB_PORTAL,
            json!({
                "type": "Sell",
                "amt": 1102.5,
                "qty": -5.0,
                "pr": 220.5,
                "symbol": "VTI",
                "date": "2025-06-03"
            }),
        );
        match map_raw(&row) {
            MappingOutcome::Trade(trade) => {
                assert_eq!(trade.trade_type, TradeType::Sell);
                assert_eq!(trade.quantity, Some(dec!(5.0)));
            }
            other => panic!("expected trade, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_date_is_error() {
        let row = raw(SOURCE_ALPACA, json!({ "activity_type": "FILL", "side": "buy" }));
        assert!(matches!(map_raw(&row), MappingOutcome::Error(_)));
    }

    #[test]
    fn test_unknown_source_is_error() {
        let row = raw("ROBINHOOD", json!({ "activity_type": "FILL" }));
        assert!(matches!(map_raw(&row), MappingOutcome::Error(_)));
    }
}
