use async_trait::async_trait;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;

use super::settings_model::{Settings, SettingsUpdate};
use super::settings_traits::{SettingsRepositoryTrait, SettingsServiceTrait};
use crate::constants::{DEFAULT_TAX_RATE, SETTING_TAX_POLICY, SETTING_TAX_RATE};
use crate::errors::ValidationError;
use crate::tax::{TaxConfig, TaxPolicy};
use crate::{Error, Result};

/// Service over the key/value settings store.
pub struct SettingsService {
    settings_repository: Arc<dyn SettingsRepositoryTrait>,
}

impl SettingsService {
    pub fn new(settings_repository: Arc<dyn SettingsRepositoryTrait>) -> Self {
        Self {
            settings_repository,
        }
    }

    fn stored_policy(&self) -> Result<TaxPolicy> {
        match self.settings_repository.get_setting(SETTING_TAX_POLICY)? {
            Some(value) => Ok(TaxPolicy::parse(&value)?),
            None => Ok(TaxPolicy::default()),
        }
    }

    fn stored_rate(&self) -> Result<Decimal> {
        let raw = self
            .settings_repository
            .get_setting(SETTING_TAX_RATE)?
            .unwrap_or_else(|| DEFAULT_TAX_RATE.to_string());
        Ok(Decimal::from_str(&raw)?)
    }
}

#[async_trait]
impl SettingsServiceTrait for SettingsService {
    fn get_settings(&self) -> Result<Settings> {
        Ok(Settings {
            tax_policy: self.stored_policy()?,
            tax_rate: self.stored_rate()?,
        })
    }

    async fn update_settings(&self, update: &SettingsUpdate) -> Result<Settings> {
        if let Some(policy) = update.tax_policy {
            self.settings_repository
                .set_setting(SETTING_TAX_POLICY, policy.as_str())
                .await?;
        }
        if let Some(rate) = update.tax_rate {
            if rate < Decimal::ZERO || rate >= Decimal::ONE {
                return Err(Error::Validation(ValidationError::InvalidInput(format!(
                    "Tax rate must be in [0, 1), got {rate}"
                ))));
            }
            self.settings_repository
                .set_setting(SETTING_TAX_RATE, &rate.to_string())
                .await?;
        }
        self.get_settings()
    }

    fn tax_config(&self) -> Result<TaxConfig> {
        let settings = self.get_settings()?;
        Ok(TaxConfig {
            policy: settings.tax_policy,
            rate: settings.tax_rate,
        })
    }
}
