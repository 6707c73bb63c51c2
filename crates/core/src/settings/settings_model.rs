//! Settings domain models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::tax::TaxPolicy;

/// Materialized view of the stored settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub tax_policy: TaxPolicy,
    pub tax_rate: Decimal,
}

/// Partial update; absent fields keep their stored values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub tax_policy: Option<TaxPolicy>,
    pub tax_rate: Option<Decimal>,
}
