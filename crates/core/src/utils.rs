//! Decimal rounding helpers.
//!
//! All money figures are carried at full precision through a calculation and
//! rounded once at the edge: money to 2 decimals, shares and per-share
//! prices to 4.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::constants::{MONEY_SCALE, SHARE_SCALE};

pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

pub fn round_shares(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(SHARE_SCALE, RoundingStrategy::MidpointAwayFromZero)
}
