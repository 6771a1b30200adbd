use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::config::BillingConfig;
use crate::core::Result;
use crate::modules::settings::models::{
    ShopSettings, UpdateSettingsRequest, CGST_PERCENT_KEY, METAL_RATES_KEY, SGST_PERCENT_KEY,
};
use crate::modules::settings::repositories::SettingsRepository;

/// Reads and writes shop settings, falling back to factory defaults per key
pub struct SettingsService {
    repo: Arc<dyn SettingsRepository>,
    billing: BillingConfig,
}

impl SettingsService {
    pub fn new(repo: Arc<dyn SettingsRepository>, billing: BillingConfig) -> Self {
        Self { repo, billing }
    }

    pub async fn get_settings(&self) -> Result<ShopSettings> {
        let defaults = ShopSettings::defaults(&self.billing);

        Ok(ShopSettings {
            metal_rates: self.load(METAL_RATES_KEY).await?.unwrap_or(defaults.metal_rates),
            cgst_percent: self.load(CGST_PERCENT_KEY).await?.unwrap_or(defaults.cgst_percent),
            sgst_percent: self.load(SGST_PERCENT_KEY).await?.unwrap_or(defaults.sgst_percent),
        })
    }

    pub async fn update_settings(&self, request: UpdateSettingsRequest) -> Result<ShopSettings> {
        request.validate()?;

        if let Some(rates) = &request.metal_rates {
            self.repo.put(METAL_RATES_KEY, &serde_json::to_value(rates)?).await?;
        }
        if let Some(cgst) = request.cgst_percent {
            self.repo.put(CGST_PERCENT_KEY, &serde_json::to_value(cgst)?).await?;
        }
        if let Some(sgst) = request.sgst_percent {
            self.repo.put(SGST_PERCENT_KEY, &serde_json::to_value(sgst)?).await?;
        }

        tracing::info!("Shop settings updated");
        self.get_settings().await
    }

    /// Drop every stored setting so defaults apply again
    pub async fn reset_settings(&self) -> Result<ShopSettings> {
        self.repo.clear().await?;

        tracing::info!("Shop settings reset to defaults");
        Ok(ShopSettings::defaults(&self.billing))
    }

    async fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.repo.get(key).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }
}
