//! Billing group cost orchestration
//!
//! Composes the usage aggregator, the rate calculators and the modifier engine
//! into cost breakdowns. The free functions are pure; [`BillingService`] adds
//! modifier retrieval through an injected [`ModifierSource`].

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::domain::billing::{
    dev_cost, hits_cost, prod_cost, storage_cost, BillingGroup, ComponentCosts, CostBreakdown,
    EnvironmentCost, GroupCosts,
};
use crate::domain::modifier::{apply_modifiers, Modifier, ModifierSource};
use crate::domain::pricing::{Availability, Currency, PricingConfig};
use crate::domain::usage::{billing_period, total_hits, BillingPeriod, UsageRecord};
use crate::domain::{DomainError, DomainResult};

/// Rounded component costs of projects sharing one availability class.
pub fn component_costs(
    pricing: &PricingConfig,
    currency: Currency,
    availability: Availability,
    projects: &[UsageRecord],
) -> DomainResult<ComponentCosts> {
    let card = pricing.rate_card(currency, availability)?;

    if let Some(project) = projects.iter().find(|p| p.availability != availability) {
        return Err(DomainError::Validation(format!(
            "project {:?} has availability {}, expected {availability}",
            project.name, project.availability
        )));
    }

    let costs = ComponentCosts {
        availability,
        hit_cost: hits_cost(&card, projects)?,
        storage_cost: storage_cost(&card, projects)?,
        environment_cost: EnvironmentCost {
            prod: prod_cost(&card, projects)?,
            dev: dev_cost(&card, projects)?,
        },
    };
    let hits = total_hits(projects)?;

    debug!(
        %currency,
        %availability,
        projects = projects.len(),
        hits,
        hit_cost = %costs.hit_cost,
        storage_cost = %costs.storage_cost,
        prod_cost = %costs.environment_cost.prod,
        dev_cost = %costs.environment_cost.dev,
        "Component costs calculated"
    );

    Ok(costs)
}

fn breakdown(
    pricing: &PricingConfig,
    currency: Currency,
    availability: Availability,
    projects: &[UsageRecord],
    modifiers: &[Modifier],
) -> DomainResult<CostBreakdown> {
    let period = billing_period(projects)?;
    let components = component_costs(pricing, currency, availability, projects)?;
    let subtotal = components.subtotal();
    let outcome = apply_modifiers(subtotal, modifiers, period);

    Ok(CostBreakdown {
        currency,
        availability,
        hit_cost: components.hit_cost,
        storage_cost: components.storage_cost,
        environment_cost: components.environment_cost,
        subtotal,
        modifiers_applied: outcome.applied,
        total: outcome.total,
    })
}

/// Cost a set of projects that share one availability class.
///
/// Mixed availability is rejected; split the projects first or use
/// [`billing_group_costs`].
pub fn get_projects_costs(
    pricing: &PricingConfig,
    currency: Currency,
    projects: &[UsageRecord],
    modifiers: &[Modifier],
) -> DomainResult<CostBreakdown> {
    let availability = projects
        .first()
        .map(|p| p.availability)
        .ok_or_else(|| DomainError::Validation("no projects to cost".into()))?;

    if projects.iter().any(|p| p.availability != availability) {
        return Err(DomainError::Validation(
            "projects have mixed availability, cost each availability separately".into(),
        ));
    }

    breakdown(pricing, currency, availability, projects, modifiers)
}

/// Cost only the projects with the given availability.
///
/// Returns `None` when no project matches. Missing pricing is reported even
/// then.
pub fn availability_projects_costs(
    pricing: &PricingConfig,
    projects: &[UsageRecord],
    availability: Availability,
    currency: Currency,
    modifiers: &[Modifier],
) -> DomainResult<Option<CostBreakdown>> {
    pricing.rate_card(currency, availability)?;

    let matching: Vec<UsageRecord> = projects
        .iter()
        .filter(|p| p.availability == availability)
        .cloned()
        .collect();

    if matching.is_empty() {
        return Ok(None);
    }

    breakdown(pricing, currency, availability, &matching, modifiers).map(Some)
}

/// Cost a whole billing group for one month.
///
/// Each availability class is costed on its own; their subtotals are summed
/// and the modifier chain is applied once to that sum.
pub fn billing_group_costs(
    pricing: &PricingConfig,
    group: &BillingGroup,
    modifiers: &[Modifier],
) -> DomainResult<GroupCosts> {
    let period = billing_period(&group.projects)?;
    let mut standard = None;
    let mut high = None;

    for availability in group.availabilities() {
        let projects: Vec<UsageRecord> = group
            .projects
            .iter()
            .filter(|p| p.availability == availability)
            .cloned()
            .collect();
        let costs = component_costs(pricing, group.currency, availability, &projects)?;
        match availability {
            Availability::Standard => standard = Some(costs),
            Availability::High => high = Some(costs),
        }
    }

    let subtotal: Decimal = standard
        .iter()
        .chain(high.iter())
        .map(ComponentCosts::subtotal)
        .sum();
    let outcome = apply_modifiers(subtotal, modifiers, period);

    Ok(GroupCosts {
        name: group.name.clone(),
        currency: group.currency,
        period,
        standard,
        high,
        subtotal,
        modifiers_applied: outcome.applied,
        total: outcome.total,
    })
}

/// Service computing group costs with modifiers fetched from a source
pub struct BillingService {
    pricing: Arc<PricingConfig>,
    modifiers: Arc<dyn ModifierSource>,
}

impl BillingService {
    pub fn new(pricing: Arc<PricingConfig>, modifiers: Arc<dyn ModifierSource>) -> Self {
        Self { pricing, modifiers }
    }

    pub fn pricing(&self) -> &PricingConfig {
        &self.pricing
    }

    /// Cost the group's usage for `period` with the group's modifiers.
    pub async fn group_costs(
        &self,
        group: &BillingGroup,
        period: BillingPeriod,
    ) -> DomainResult<GroupCosts> {
        let result = self.compute_group_costs(group, period).await;

        let outcome = if result.is_ok() { "ok" } else { "error" };
        metrics::counter!(
            "billing_group_costs_total",
            "currency" => group.currency.as_str(),
            "outcome" => outcome
        )
        .increment(1);

        match &result {
            Ok(costs) => info!(
                group = %group.name,
                currency = %group.currency,
                %period,
                subtotal = %costs.subtotal,
                total = %costs.rounded_total(),
                modifiers = costs.modifiers_applied.len(),
                "Group costs calculated"
            ),
            Err(e) => warn!(
                group = %group.name,
                currency = %group.currency,
                %period,
                error = %e,
                "Group costs failed"
            ),
        }

        result
    }

    async fn compute_group_costs(
        &self,
        group: &BillingGroup,
        period: BillingPeriod,
    ) -> DomainResult<GroupCosts> {
        let projects = group.projects_for(period);
        if projects.is_empty() {
            return Err(DomainError::NotFound {
                entity: "Usage",
                field: "period",
                value: period.to_string(),
            });
        }

        let modifiers = self.modifiers.modifiers_for(&group.name, period).await?;
        let scoped = BillingGroup {
            projects,
            ..group.clone()
        };

        billing_group_costs(&self.pricing, &scoped, &modifiers)
    }

    /// Cost the projects of one availability class with the group's
    /// modifiers.
    pub async fn availability_costs(
        &self,
        group: &str,
        currency: Currency,
        availability: Availability,
        projects: &[UsageRecord],
    ) -> DomainResult<Option<CostBreakdown>> {
        let period = billing_period(projects)?;
        let modifiers = self.modifiers.modifiers_for(group, period).await?;
        availability_projects_costs(&self.pricing, projects, availability, currency, &modifiers)
    }
}

// ── Tests ──────────────────────────────────────────────────────
