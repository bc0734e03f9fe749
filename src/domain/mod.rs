pub mod billing;
pub mod modifier;
pub mod pricing;
pub mod usage;

// Re-export commonly used types
pub use billing::{BillingGroup, ComponentCosts, CostBreakdown, EnvironmentCost, GroupCosts};
pub use modifier::{
    apply_modifiers, Modifier, ModifierKind, ModifierOutcome, ModifierRecord, ModifierSource,
};
pub use pricing::{Availability, Currency, PricingConfig, RateCard};
pub use usage::{BillingPeriod, EnvironmentTotals, RawEnvironmentUsage, UsageField, UsageRecord};

// Re-export DomainError from support for convenience
pub use crate::support::errors::{DomainError, DomainResult};
