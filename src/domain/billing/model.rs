//! Billing group and cost breakdown entities

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::modifier::Modifier;
use crate::domain::pricing::{Availability, Currency};
use crate::domain::usage::{BillingPeriod, UsageRecord};
use crate::support::round_money;

/// Projects billed together in one currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingGroup {
    pub name: String,
    pub currency: Currency,
    pub projects: Vec<UsageRecord>,
    /// Invoicing system label, carried through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_software: Option<String>,
}

impl BillingGroup {
    /// Projects whose usage belongs to `period`.
    pub fn projects_for(&self, period: BillingPeriod) -> Vec<UsageRecord> {
        self.projects
            .iter()
            .filter(|p| p.year == period.year() && p.month == period.month())
            .cloned()
            .collect()
    }

    /// Availability classes present in the group, in declaration order.
    pub fn availabilities(&self) -> Vec<Availability> {
        Availability::ALL
            .into_iter()
            .filter(|a| self.projects.iter().any(|p| p.availability == *a))
            .collect()
    }
}

/// Hourly compute cost split by environment class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentCost {
    pub prod: Decimal,
    pub dev: Decimal,
}

impl EnvironmentCost {
    pub fn total(&self) -> Decimal {
        self.prod + self.dev
    }
}

/// Rounded per-category costs for one availability class, before modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentCosts {
    pub availability: Availability,
    pub hit_cost: Decimal,
    pub storage_cost: Decimal,
    pub environment_cost: EnvironmentCost,
}

impl ComponentCosts {
    pub fn subtotal(&self) -> Decimal {
        self.hit_cost + self.storage_cost + self.environment_cost.total()
    }
}

/// Cost of a homogeneous set of projects, modifiers included
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub currency: Currency,
    pub availability: Availability,
    pub hit_cost: Decimal,
    pub storage_cost: Decimal,
    pub environment_cost: EnvironmentCost,
    /// Sum of the rounded components
    pub subtotal: Decimal,
    pub modifiers_applied: Vec<Modifier>,
    /// Post-modifier amount, never negative
    pub total: Decimal,
}

impl CostBreakdown {
    pub fn components(&self) -> ComponentCosts {
        ComponentCosts {
            availability: self.availability,
            hit_cost: self.hit_cost,
            storage_cost: self.storage_cost,
            environment_cost: self.environment_cost,
        }
    }

    pub fn rounded_total(&self) -> Decimal {
        round_money(self.total)
    }

    pub fn format_total(&self) -> String {
        format!("{:.2} {}", self.rounded_total(), self.currency)
    }
}

/// Cost of a whole billing group for one month.
///
/// Each availability class present in the group is costed separately; the
/// modifier chain runs once over the combined subtotal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupCosts {
    pub name: String,
    pub currency: Currency,
    pub period: BillingPeriod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard: Option<ComponentCosts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<ComponentCosts>,
    pub subtotal: Decimal,
    pub modifiers_applied: Vec<Modifier>,
    pub total: Decimal,
}

impl GroupCosts {
    pub fn components(&self) -> impl Iterator<Item = &ComponentCosts> {
        self.standard.iter().chain(self.high.iter())
    }

    pub fn rounded_total(&self) -> Decimal {
        round_money(self.total)
    }

    pub fn format_total(&self) -> String {
        format!("{:.2} {}", self.rounded_total(), self.currency)
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn project(month: u32, availability: Availability) -> UsageRecord {
        UsageRecord {
            name: format!("p-{month}"),
            month,
            year: 2019,
            hits: 0,
            availability,
            storage_days: 0.0,
            prod_hours: 0.0,
            dev_hours: 0.0,
        }
    }

    fn sample_breakdown() -> CostBreakdown {
        CostBreakdown {
            currency: Currency::Usd,
            availability: Availability::Standard,
            hit_cost: dec!(324.00),
            storage_cost: dec!(656.01),
            environment_cost: EnvironmentCost {
                prod: dec!(60.05),
                dev: dec!(1.67),
            },
            subtotal: dec!(1041.73),
            modifiers_applied: vec![],
            total: dec!(520.865),
        }
    }

    #[test]
    fn subtotal_sums_components() {
        let breakdown = sample_breakdown();
        assert_eq!(breakdown.components().subtotal(), dec!(1041.73));
        assert_eq!(breakdown.environment_cost.total(), dec!(61.72));
    }

    #[test]
    fn totals_present_at_two_decimals() {
        let breakdown = sample_breakdown();
        assert_eq!(breakdown.rounded_total(), dec!(520.87));
        assert_eq!(breakdown.format_total(), "520.87 USD");
    }

    #[test]
    fn group_filters_projects_by_period() {
        let group = BillingGroup {
            name: "FC".into(),
            currency: Currency::Usd,
            projects: vec![
                project(7, Availability::High),
                project(8, Availability::High),
                project(8, Availability::Standard),
            ],
            billing_software: None,
        };
        let august = BillingPeriod::new(2019, 8).unwrap();
        assert_eq!(group.projects_for(august).len(), 2);
        assert!(group.projects_for(august.next()).is_empty());
        assert_eq!(
            group.availabilities(),
            vec![Availability::Standard, Availability::High]
        );
    }

    #[test]
    fn breakdown_serializes_camel_case() {
        let json = serde_json::to_value(sample_breakdown()).unwrap();
        assert!(json.get("hitCost").is_some());
        assert!(json.get("modifiersApplied").is_some());
        let prod = json["environmentCost"]["prod"].as_f64().unwrap();
        assert!((prod - 60.05).abs() < 1e-9);
        assert_eq!(json["availability"], "STANDARD");
    }

    #[test]
    fn group_json_accepts_missing_billing_software() {
        let raw = r#"{
            "name": "MIS",
            "currency": "GBP",
            "projects": [{
                "month": 8, "year": 2019, "hits": 86766, "availability": "STANDARD",
                "storageDays": 0, "prodHours": 744, "devHours": 0
            }]
        }"#;
        let group: BillingGroup = serde_json::from_str(raw).unwrap();
        assert_eq!(group.currency, Currency::Gbp);
        assert_eq!(group.billing_software, None);
        assert_eq!(group.projects[0].name, "");
    }
}
