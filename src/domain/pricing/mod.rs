//! Pricing configuration
//!
//! Rate tables keyed by currency and availability class, with a built-in
//! default and TOML loading.

mod defaults;
pub mod model;

pub use model::{
    hit_tier, Availability, Currency, CurrencyPricing, DevelopmentAllowance, EnvironmentRates,
    HitSchedule, HitTier, PricingConfig, RateCard,
};
