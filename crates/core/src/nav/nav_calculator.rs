//! Pure NAV math. No I/O here; the service owns fetching and persistence.

use chrono::{NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use super::nav_errors::NavError;
use super::nav_model::NavRecord;
use crate::constants::SHARE_SCALE;
use crate::utils::round_money;

/// Computes the per-share price for a portfolio valuation.
///
/// Rejects funds with no shares outstanding (a per-share price is undefined)
/// and any result that is not strictly positive.
pub fn compute_nav_per_share(
    date: NaiveDate,
    portfolio_value: Decimal,
    total_shares: Decimal,
) -> Result<Decimal, NavError> {
    if total_shares <= Decimal::ZERO {
        return Err(NavError::NoSharesOutstanding { date, total_shares });
    }

    let nav_per_share = (portfolio_value / total_shares)
        .round_dp_with_strategy(SHARE_SCALE, RoundingStrategy::MidpointAwayFromZero);

    if nav_per_share <= Decimal::ZERO {
        return Err(NavError::InvalidNav {
            date,
            portfolio_value,
            nav_per_share,
        });
    }

    Ok(nav_per_share)
}

/// Builds the record for a trading date, deriving the day-over-day change
/// from the previous published record when one exists.
pub fn build_nav_record(
    date: NaiveDate,
    portfolio_value: Decimal,
    total_shares: Decimal,
    previous: Option<&NavRecord>,
) -> Result<NavRecord, NavError> {
    let portfolio_value = round_money(portfolio_value);
    let nav_per_share = compute_nav_per_share(date, portfolio_value, total_shares)?;

    let day_change_pct = previous.map(|prev| {
        ((nav_per_share - prev.nav_per_share) / prev.nav_per_share * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(SHARE_SCALE, RoundingStrategy::MidpointAwayFromZero)
    });

    Ok(NavRecord {
        nav_date: date,
        portfolio_value,
        total_shares,
        nav_per_share,
        day_change_pct,
        calculated_at: Utc::now(),
    })
}
