mod correction_config;
mod price_row;

pub use correction_config::{AppConfig, CorrectionConfig, PathConfig};
pub use price_row::PriceRow;

/// Ordered price rows for one instrument, index 0 = oldest
pub type Series = Vec<PriceRow>;
