// LineItem model: one metal entry priced by weight, rate, wastage and making.
//
// The four inputs are the only settable state. Monetary amounts are derived
// through the pricing calculator at construction, so a LineItem can never
// carry amounts that disagree with its inputs.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::core::{AppError, Result};
use crate::modules::invoices::services::pricing_calculator::compute_line_item;

/// Monetary breakdown of a single line item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineAmounts {
    /// weight × rate
    pub item_value: Decimal,
    /// item_value × wastage_percent / 100
    pub wastage_amount: Decimal,
    /// item_value × making_percent / 100
    pub making_amount: Decimal,
    /// item_value + wastage_amount + making_amount
    pub line_total: Decimal,
}

/// A priced jewellery entry within an invoice
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineItem {
    metal: String,
    weight: Decimal,
    rate: Decimal,
    wastage_percent: Decimal,
    making_percent: Decimal,
    #[serde(flatten)]
    amounts: LineAmounts,
}

impl LineItem {
    /// Create a line item, deriving its amounts
    ///
    /// # Arguments
    /// * `metal` - Metal label such as "Gold 22K" (max 100 chars)
    /// * `weight` - Grams, non-negative
    /// * `rate` - Price per gram, non-negative
    /// * `wastage_percent` / `making_percent` - Non-negative surcharges
    pub fn new(
        metal: impl Into<String>,
        weight: Decimal,
        rate: Decimal,
        wastage_percent: Decimal,
        making_percent: Decimal,
    ) -> Result<Self> {
        let metal = metal.into().trim().to_string();
        Self::validate_metal(&metal)?;

        let amounts = compute_line_item(weight, rate, wastage_percent, making_percent)?;

        Ok(Self {
            metal,
            weight,
            rate,
            wastage_percent,
            making_percent,
            amounts,
        })
    }

    pub fn metal(&self) -> &str {
        &self.metal
    }

    pub fn weight(&self) -> Decimal {
        self.weight
    }

    pub fn rate(&self) -> Decimal {
        self.rate
    }

    pub fn wastage_percent(&self) -> Decimal {
        self.wastage_percent
    }

    pub fn making_percent(&self) -> Decimal {
        self.making_percent
    }

    pub fn amounts(&self) -> &LineAmounts {
        &self.amounts
    }

    pub fn line_total(&self) -> Decimal {
        self.amounts.line_total
    }

    /// Whether this item contributes a positive amount to an invoice
    pub fn is_billable(&self) -> bool {
        self.amounts.line_total > Decimal::ZERO
    }

    /// Checks an already trimmed label
    fn validate_metal(metal: &str) -> Result<()> {
        if metal.is_empty() {
            return Err(AppError::validation("Metal cannot be empty"));
        }

        if metal.chars().count() > 100 {
            return Err(AppError::validation("Metal cannot exceed 100 characters"));
        }

        Ok(())
    }
}
