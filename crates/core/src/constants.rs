//! Shared constants.

/// Decimal places for share quantities and per-share prices.
pub const SHARE_SCALE: u32 = 4;

/// Decimal places for money amounts.
pub const MONEY_SCALE: u32 = 2;

/// Settings key holding the active tax policy ("WITHHOLDING" or
/// "QUARTERLY_SETTLEMENT").
pub const SETTING_TAX_POLICY: &str = "tax_policy";

/// Settings key holding the capital-gains tax rate as a decimal string.
pub const SETTING_TAX_RATE: &str = "tax_rate";

/// Default capital-gains rate applied when no setting has been stored.
pub const DEFAULT_TAX_RATE: &str = "0.37";
