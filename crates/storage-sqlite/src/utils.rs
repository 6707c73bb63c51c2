//! Parsing helpers for TEXT-stored decimals and timestamps.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parses a stored decimal string, with a fallback through f64 for
/// scientific notation. Unparseable values log and fall back to zero
/// rather than poisoning a whole result set.
pub fn parse_decimal_string_tolerant(value_str: &str, field_name: &str) -> Decimal {
    match Decimal::from_str(value_str) {
        Ok(d) => d,
        Err(e_decimal) => match f64::from_str(value_str).ok().and_then(Decimal::from_f64) {
            Some(dec_val) => dec_val,
            None => {
                log::error!(
                    "Failed to parse {} '{}' as Decimal ({}). Falling back to ZERO.",
                    field_name,
                    value_str,
                    e_decimal
                );
                Decimal::ZERO
            }
        },
    }
}

/// Parses an RFC 3339 timestamp, logging and substituting the current time
/// on failure.
pub fn parse_timestamp_tolerant(value_str: &str, field_name: &str) -> DateTime<Utc> {
    match DateTime::parse_from_rfc3339(value_str) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(e) => {
            log::error!(
                "Failed to parse {} '{}' as timestamp ({}). Substituting now.",
                field_name,
                value_str,
                e
            );
            Utc::now()
        }
    }
}

/// Serializes a timestamp the way every table stores it.
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339()
}
