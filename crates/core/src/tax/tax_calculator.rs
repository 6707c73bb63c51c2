//! Pure realized-gain math.
//!
//! A withdrawal liquidates a proportion of the whole position, so the same
//! proportion of the position's unrealized gain becomes realized. Break-even
//! and loss positions realize nothing; they are valid withdrawals, not
//! errors.

use rust_decimal::Decimal;

use super::tax_model::{TaxConfig, TaxPolicy};
use crate::utils::round_money;

/// Outcome of the gain calculation for one withdrawal.
#[derive(Debug, Clone, PartialEq)]
pub struct WithdrawalTaxFigures {
    pub unrealized_gain: Decimal,
    pub realized_gain: Decimal,
    pub tax_due: Decimal,
    pub net_proceeds: Decimal,
}

/// Computes the realized gain and settlement figures for a withdrawal under
/// the configured policy.
pub fn withdrawal_figures(
    config: &TaxConfig,
    withdrawal_amount: Decimal,
    current_value: Decimal,
    net_investment_before: Decimal,
) -> WithdrawalTaxFigures {
    if current_value <= Decimal::ZERO {
        return WithdrawalTaxFigures {
            unrealized_gain: Decimal::ZERO,
            realized_gain: Decimal::ZERO,
            tax_due: Decimal::ZERO,
            net_proceeds: withdrawal_amount,
        };
    }

    let unrealized_gain = (current_value - net_investment_before).max(Decimal::ZERO);
    let proportion = withdrawal_amount / current_value;
    let realized_gain = round_money(unrealized_gain * proportion);

    let (tax_due, net_proceeds) = match config.policy {
        TaxPolicy::Withholding => {
            let tax_due = round_money(realized_gain * config.rate);
            (tax_due, withdrawal_amount - tax_due)
        }
        TaxPolicy::QuarterlySettlement => (Decimal::ZERO, withdrawal_amount),
    };

    WithdrawalTaxFigures {
        unrealized_gain,
        realized_gain,
        tax_due,
        net_proceeds,
    }
}

/// Estimate of how much an investor can withdraw after the tax the
/// withdrawal itself would trigger: `current_value - unrealized_gain * rate`.
///
/// This is a preview shown before a withdrawal is requested. The booked
/// liability is always computed by `withdrawal_figures` at redemption time;
/// the two are intentionally separate.
pub fn eligible_withdrawal(
    config: &TaxConfig,
    current_value: Decimal,
    net_investment: Decimal,
) -> Decimal {
    let unrealized_gain = (current_value - net_investment).max(Decimal::ZERO);
    round_money(current_value - unrealized_gain * config.rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn withholding() -> TaxConfig {
        TaxConfig {
            policy: TaxPolicy::Withholding,
            rate: dec!(0.37),
        }
    }

    fn quarterly() -> TaxConfig {
        TaxConfig {
            policy: TaxPolicy::QuarterlySettlement,
            rate: dec!(0.37),
        }
    }

    #[test]
    fn test_withdrawal_with_gain_under_withholding() {
        // 14,750 shares at 1.2864 -> 18,974.40 against a 15,000 basis.
        let figures = withdrawal_figures(&withholding(), dec!(1000), dec!(18974.40), dec!(15000));
        assert_eq!(figures.unrealized_gain, dec!(3974.40));
        assert_eq!(figures.realized_gain, dec!(209.46));
        assert_eq!(figures.tax_due, dec!(77.50));
        assert_eq!(figures.net_proceeds, dec!(922.50));
    }

    #[test]
    fn test_withdrawal_with_gain_under_quarterly_settlement() {
        let figures = withdrawal_figures(&quarterly(), dec!(1000), dec!(18974.40), dec!(15000));
        // Gain is still recorded for the quarterly aggregate; nothing is
        // withheld now.
        assert_eq!(figures.realized_gain, dec!(209.46));
        assert_eq!(figures.tax_due, dec!(0));
        assert_eq!(figures.net_proceeds, dec!(1000));
    }

    #[test]
    fn test_break_even_withdrawal_is_tax_free() {
        let figures = withdrawal_figures(&withholding(), dec!(1000), dec!(15000), dec!(15000));
        assert_eq!(figures.realized_gain, dec!(0));
        assert_eq!(figures.tax_due, dec!(0));
        assert_eq!(figures.net_proceeds, dec!(1000));
    }

    #[test]
    fn test_loss_position_realizes_nothing() {
        let figures = withdrawal_figures(&withholding(), dec!(1000), dec!(12000), dec!(15000));
        assert_eq!(figures.unrealized_gain, dec!(0));
        assert_eq!(figures.realized_gain, dec!(0));
        assert_eq!(figures.net_proceeds, dec!(1000));
    }

    #[test]
    fn test_zero_value_position_does_not_error() {
        let figures = withdrawal_figures(&withholding(), dec!(0), dec!(0), dec!(100));
        assert_eq!(figures.realized_gain, dec!(0));
        assert_eq!(figures.tax_due, dec!(0));
    }

    #[test]
    fn test_eligible_withdrawal_estimate() {
        // Value 18,974.40, gain 3,974.40: the estimate nets out the tax the
        // full liquidation would trigger.
        let estimate = eligible_withdrawal(&withholding(), dec!(18974.40), dec!(15000));
        assert_eq!(estimate, dec!(17503.87));
    }

    #[test]
    fn test_eligible_withdrawal_at_a_loss_is_full_value() {
        let estimate = eligible_withdrawal(&withholding(), dec!(12000), dec!(15000));
        assert_eq!(estimate, dec!(12000.00));
    }
}
