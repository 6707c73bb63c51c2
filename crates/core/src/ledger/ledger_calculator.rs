//! Pure share math for issuance and redemption.
//!
//! Redemption uses proportional allocation: the position is one fungible
//! pool, and a withdrawal liquidates the same fraction of shares and of
//! cost basis. There is no lot tracking.

use rust_decimal::Decimal;

use super::ledger_errors::LedgerError;
use crate::utils::{round_money, round_shares};

/// Shares issued for a contribution at the given price.
pub fn issuance_shares(amount: Decimal, nav_per_share: Decimal) -> Decimal {
    round_shares(amount / nav_per_share)
}

/// Figures for a proportional-allocation redemption.
#[derive(Debug, Clone, PartialEq)]
pub struct RedemptionFigures {
    /// Value of the full position at the redemption price.
    pub current_value: Decimal,
    /// Shares leaving the position.
    pub shares_to_redeem: Decimal,
    /// Cost basis leaving the position: `net_investment * proportion`.
    pub basis_reduction: Decimal,
}

/// Computes a redemption, rejecting any withdrawal that would drive the
/// share balance negative.
pub fn redemption_figures(
    investor_id: &str,
    current_shares: Decimal,
    net_investment: Decimal,
    amount: Decimal,
    nav_per_share: Decimal,
) -> Result<RedemptionFigures, LedgerError> {
    let current_value = round_money(current_shares * nav_per_share);
    let shares_to_redeem = round_shares(amount / nav_per_share);

    if shares_to_redeem > current_shares {
        return Err(LedgerError::InsufficientShares {
            investor_id: investor_id.to_string(),
            requested_amount: amount,
            required_shares: shares_to_redeem,
            current_shares,
        });
    }

    let proportion = amount / current_value;
    let basis_reduction = round_money(net_investment * proportion);

    Ok(RedemptionFigures {
        current_value,
        shares_to_redeem,
        basis_reduction,
    })
}
