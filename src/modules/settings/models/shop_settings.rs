use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::BillingConfig;
use crate::core::{AppError, Result};
use crate::modules::invoices::services::pricing_calculator::validate_non_negative;

/// Keys of the settings table
pub const METAL_RATES_KEY: &str = "metal_rates";
pub const CGST_PERCENT_KEY: &str = "cgst_percent";
pub const SGST_PERCENT_KEY: &str = "sgst_percent";

/// Default price per gram and surcharges for one metal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetalRate {
    pub rate: Decimal,
    pub wastage_percent: Decimal,
    pub making_percent: Decimal,
}

impl MetalRate {
    pub fn new(rate: Decimal, wastage_percent: Decimal, making_percent: Decimal) -> Self {
        Self {
            rate,
            wastage_percent,
            making_percent,
        }
    }

    pub fn validate(&self, metal: &str) -> Result<()> {
        validate_non_negative(&format!("{} rate", metal), self.rate)?;
        validate_non_negative(&format!("{} wastage percent", metal), self.wastage_percent)?;
        validate_non_negative(&format!("{} making percent", metal), self.making_percent)?;
        Ok(())
    }
}

/// Shop-wide billing settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopSettings {
    pub metal_rates: BTreeMap<String, MetalRate>,
    pub cgst_percent: Decimal,
    pub sgst_percent: Decimal,
}

impl ShopSettings {
    /// Factory settings: the standard metal table plus the configured GST
    pub fn defaults(billing: &BillingConfig) -> Self {
        Self {
            metal_rates: default_metal_rates(),
            cgst_percent: billing.default_cgst_percent,
            sgst_percent: billing.default_sgst_percent,
        }
    }

    pub fn metal_rate(&self, metal: &str) -> Option<&MetalRate> {
        self.metal_rates.get(metal.trim())
    }
}

pub fn default_metal_rates() -> BTreeMap<String, MetalRate> {
    [
        ("Gold 24K", MetalRate::new(Decimal::new(6500, 0), Decimal::new(5, 0), Decimal::new(10, 0))),
        ("Gold 22K", MetalRate::new(Decimal::new(6000, 0), Decimal::new(6, 0), Decimal::new(12, 0))),
        ("Gold 18K", MetalRate::new(Decimal::new(5500, 0), Decimal::new(7, 0), Decimal::new(14, 0))),
        ("Silver", MetalRate::new(Decimal::new(75, 0), Decimal::new(3, 0), Decimal::new(8, 0))),
    ]
    .into_iter()
    .map(|(metal, rate)| (metal.to_string(), rate))
    .collect()
}

/// Partial settings update; omitted fields keep their current value.
/// A supplied metal table replaces the stored one entirely.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSettingsRequest {
    #[serde(default)]
    pub metal_rates: Option<BTreeMap<String, MetalRate>>,
    #[serde(default)]
    pub cgst_percent: Option<Decimal>,
    #[serde(default)]
    pub sgst_percent: Option<Decimal>,
}

impl UpdateSettingsRequest {
    pub fn validate(&self) -> Result<()> {
        if let Some(rates) = &self.metal_rates {
            if rates.is_empty() {
                return Err(AppError::validation("Metal rate table cannot be empty"));
            }

            for (metal, rate) in rates {
                if metal.trim().is_empty() {
                    return Err(AppError::validation("Metal name cannot be empty"));
                }
                rate.validate(metal)?;
            }
        }

        if let Some(cgst) = self.cgst_percent {
            validate_non_negative("CGST percent", cgst)?;
        }

        if let Some(sgst) = self.sgst_percent {
            validate_non_negative("SGST percent", sgst)?;
        }

        Ok(())
    }
}
