//! Project usage
//!
//! Usage records, billing periods and the aggregation helpers that reduce
//! them into group totals.

pub mod aggregate;
pub mod model;

pub use aggregate::{
    aggregate, billing_period, calculate_project_environments_totals_to_bill,
    normalize_environments, total_hits, STORAGE_UNITS_PER_GB,
};
pub use model::{
    BillingPeriod, EnvironmentTotals, HitCount, HourCount, RawEnvironmentUsage, StorageSnapshot,
    UsageField, UsageRecord,
};
