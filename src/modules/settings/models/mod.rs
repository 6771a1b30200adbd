mod shop_settings;

pub use shop_settings::{
    default_metal_rates, MetalRate, ShopSettings, UpdateSettingsRequest, CGST_PERCENT_KEY,
    METAL_RATES_KEY, SGST_PERCENT_KEY,
};
