//! Group cost calculation: calculators and breakdown types

pub mod calculators;
pub mod model;

pub use calculators::{dev_cost, hits_cost, prod_cost, progressive_hits_charge, storage_cost};
pub use model::{BillingGroup, ComponentCosts, CostBreakdown, EnvironmentCost, GroupCosts};
