//! Tier and rate calculators
//!
//! Each calculator aggregates one usage quantity across a homogeneous set of
//! projects, prices it with a resolved [`RateCard`] and rounds to cents.

use rust_decimal::Decimal;

use crate::domain::pricing::{hit_tier, HitTier, RateCard};
use crate::domain::usage::{billing_period, total_hits, BillingPeriod, UsageField, UsageRecord};
use crate::support::{round_money, usage_quantity, DomainError, DomainResult};

/// Validate every record and return their shared billing month.
fn checked_period(projects: &[UsageRecord]) -> DomainResult<BillingPeriod> {
    for project in projects {
        project.validate()?;
    }
    billing_period(projects)
}

fn sum_quantity(projects: &[UsageRecord], field: UsageField) -> DomainResult<Decimal> {
    projects.iter().try_fold(Decimal::ZERO, |acc, project| {
        let value = field.value(project);
        acc.checked_add(usage_quantity(field.name(), value)?)
            .ok_or_else(|| DomainError::invalid_usage(field.name(), value))
    })
}

fn checked_charge(field: UsageField, quantity: Decimal, rate: Decimal) -> DomainResult<Decimal> {
    quantity
        .checked_mul(rate)
        .map(round_money)
        .ok_or_else(|| DomainError::invalid_usage(field.name(), quantity))
}

/// Hits falling inside `tier`. The top tier reached takes every hit above
/// its floor, whatever its upper bound.
fn hits_within(tier: &HitTier, hits: u64, top: bool) -> u64 {
    let ceiling = match tier.max {
        Some(max) if !top => hits.min(max),
        _ => hits,
    };
    if tier.min == 0 {
        ceiling
    } else {
        ceiling.saturating_sub(tier.min - 1)
    }
}

/// Progressive charge for a hit total: the base charge plus, for every tier
/// the total reaches, that tier's rate on the hits inside it.
pub fn progressive_hits_charge(card: &RateCard<'_>, hits: u64) -> Decimal {
    let top = hit_tier(card.tiers, hits);

    card.tiers
        .iter()
        .take(top + 1)
        .zip(&card.hits.rates)
        .enumerate()
        .fold(card.hits.base, |charge, (position, (tier, rate))| {
            charge + *rate * Decimal::from(hits_within(tier, hits, position == top))
        })
}

/// Progressive hit cost for the group, converted with the currency
/// multiplier.
pub fn hits_cost(card: &RateCard<'_>, projects: &[UsageRecord]) -> DomainResult<Decimal> {
    checked_period(projects)?;
    let hits = total_hits(projects)?;
    let charge = progressive_hits_charge(card, hits) * card.pricing.hit_multiplier;
    Ok(round_money(charge))
}

/// Storage beyond the included GB-days allowance, at the currency rate.
pub fn storage_cost(card: &RateCard<'_>, projects: &[UsageRecord]) -> DomainResult<Decimal> {
    let period = checked_period(projects)?;
    let storage_days = sum_quantity(projects, UsageField::StorageDays)?;
    let included = card.pricing.storage_included_gb
        * Decimal::from(period.days())
        * Decimal::from(projects.len() as u64);
    let billable = (storage_days - included).max(Decimal::ZERO);
    checked_charge(UsageField::StorageDays, billable, card.pricing.storage_rate)
}

/// Production hours at the availability's production rate.
pub fn prod_cost(card: &RateCard<'_>, projects: &[UsageRecord]) -> DomainResult<Decimal> {
    checked_period(projects)?;
    let hours = sum_quantity(projects, UsageField::ProdHours)?;
    checked_charge(UsageField::ProdHours, hours, card.environment.prod)
}

/// Development hours beyond the included allowance at the availability's
/// development rate.
pub fn dev_cost(card: &RateCard<'_>, projects: &[UsageRecord]) -> DomainResult<Decimal> {
    let period = checked_period(projects)?;
    let hours = sum_quantity(projects, UsageField::DevHours)?;
    let included = Decimal::from(card.pricing.dev_allowance.environments(projects.len()))
        * Decimal::from(period.hours());
    let billable = (hours - included).max(Decimal::ZERO);
    checked_charge(UsageField::DevHours, billable, card.environment.dev)
}

// ── Tests ──────────────────────────────────────────────────────
