use async_trait::async_trait;

use super::settings_model::{Settings, SettingsUpdate};
use crate::tax::TaxConfig;
use crate::Result;

/// Trait defining the contract for settings repository operations.
#[async_trait]
pub trait SettingsRepositoryTrait: Send + Sync {
    /// Returns the stored value for a key, or `None` if unset.
    fn get_setting(&self, key: &str) -> Result<Option<String>>;
    async fn set_setting(&self, key: &str, value: &str) -> Result<()>;
}

/// Trait defining the contract for settings service operations.
#[async_trait]
pub trait SettingsServiceTrait: Send + Sync {
    fn get_settings(&self) -> Result<Settings>;
    async fn update_settings(&self, update: &SettingsUpdate) -> Result<Settings>;

    /// Builds the explicit config handed to the tax and valuation engines at
    /// construction time. Engines never read settings ambiently.
    fn tax_config(&self) -> Result<TaxConfig>;
}
