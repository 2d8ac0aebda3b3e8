//! Market configuration shared by all engines.

pub mod config;

pub use config::{PricingConfig, PricingConfigBuilder};
