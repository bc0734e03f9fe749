//! Usage aggregation
//!
//! Reduces per-project usage into group totals and converts raw environment
//! counters into the normalized per-project shape.

use std::str::FromStr;

use rust_decimal::Decimal;

use super::model::{
    BillingPeriod, EnvironmentTotals, RawEnvironmentUsage, UsageField, UsageRecord,
};
use crate::domain::pricing::Availability;
use crate::support::{to_quantity, usage_quantity, DomainError, DomainResult};

/// Storage units reported per GB-day.
pub const STORAGE_UNITS_PER_GB: u64 = 1_000_000;

/// Decimal places kept for storage-days.
pub const STORAGE_DAYS_DECIMALS: u32 = 6;

/// Sum one numeric field across projects.
///
/// Month homogeneity is not checked here; see [`billing_period`].
pub fn aggregate(projects: &[UsageRecord], field: UsageField) -> f64 {
    projects.iter().map(|p| field.value(p)).sum()
}

/// Total hits across projects. A total past `u64::MAX` is invalid usage.
pub fn total_hits(projects: &[UsageRecord]) -> DomainResult<u64> {
    projects.iter().try_fold(0u64, |total, project| {
        total
            .checked_add(project.hits)
            .ok_or_else(|| DomainError::invalid_usage(UsageField::Hits.name(), project.hits))
    })
}

/// The single billing month shared by all projects.
pub fn billing_period(projects: &[UsageRecord]) -> DomainResult<BillingPeriod> {
    let first = projects
        .first()
        .ok_or_else(|| DomainError::Validation("no projects to bill".into()))?;
    let period = first.period()?;

    if let Some(other) = projects.iter().find(|p| (p.year, p.month) != (first.year, first.month)) {
        return Err(DomainError::Validation(format!(
            "project {:?} is billed for {}-{:02}, expected {period}",
            other.name, other.year, other.month
        )));
    }

    Ok(period)
}

/// Sum raw environment counters of one project into billable totals.
///
/// Hits are summed, storage is converted to GB-days, and hours are split into
/// production (environment type `production`) and development (every other
/// type).
pub fn calculate_project_environments_totals_to_bill(
    environments: &[RawEnvironmentUsage],
) -> DomainResult<EnvironmentTotals> {
    let mut hits: u64 = 0;
    let mut storage_units = Decimal::ZERO;
    let mut prod_hours = Decimal::ZERO;
    let mut dev_hours = Decimal::ZERO;

    for env in environments {
        BillingPeriod::from_str(&env.storage.month)?;
        BillingPeriod::from_str(&env.hours.month)?;

        hits = hits
            .checked_add(env.hits.total)
            .ok_or_else(|| DomainError::invalid_usage("hits.total", env.hits.total))?;

        let bytes = Decimal::from_str(env.storage.bytes_used.trim())
            .map_err(|_| DomainError::invalid_usage("storage.bytesUsed", &env.storage.bytes_used))?;
        if bytes.is_sign_negative() {
            return Err(DomainError::invalid_usage("storage.bytesUsed", bytes));
        }
        storage_units += bytes;

        let hours = usage_quantity("hours.hours", env.hours.hours)?;
        if env.is_production() {
            prod_hours += hours;
        } else {
            dev_hours += hours;
        }
    }

    let storage_days =
        (storage_units / Decimal::from(STORAGE_UNITS_PER_GB)).round_dp(STORAGE_DAYS_DECIMALS);

    Ok(EnvironmentTotals {
        hits,
        storage_days: to_quantity("storageDays", storage_days)?,
        prod_hours: to_quantity("prodHours", prod_hours)?,
        dev_hours: to_quantity("devHours", dev_hours)?,
    })
}

/// Normalize one project's environments into a [`UsageRecord`].
///
/// The billing month comes from the environments' hour counters, which must
/// all report the same month.
pub fn normalize_environments(
    name: impl Into<String>,
    environments: &[RawEnvironmentUsage],
    availability: Availability,
) -> DomainResult<UsageRecord> {
    let name = name.into();
    let first = environments.first().ok_or_else(|| {
        DomainError::Validation(format!("project {name:?} has no environments"))
    })?;
    let period = BillingPeriod::from_str(&first.hours.month)?;

    if let Some(env) = environments
        .iter()
        .find(|env| env.hours.month.trim() != first.hours.month.trim())
    {
        return Err(DomainError::Validation(format!(
            "environment {:?} reports hours for {}, expected {period}",
            env.name, env.hours.month
        )));
    }

    let totals = calculate_project_environments_totals_to_bill(environments)?;

    Ok(UsageRecord {
        name,
        month: period.month(),
        year: period.year(),
        hits: totals.hits,
        availability,
        storage_days: totals.storage_days,
        prod_hours: totals.prod_hours,
        dev_hours: totals.dev_hours,
    })
}

// ── Tests ──────────────────────────────────────────────────────
