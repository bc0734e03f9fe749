//! # Usage Billing
//!
//! Monthly cost engine for groups of hosted projects. Usage (hits, storage,
//! production and development hours) is priced with currency and availability
//! specific rate tables, then discounts and surcharges are applied in weight
//! order with the total floored at zero.
//!
//! ## Architecture
//!
//! - **domain**: pricing tables, usage aggregation, rate calculators and the
//!   modifier engine. Pure and synchronous.
//! - **application**: group cost orchestration and the `BillingService`
//! - **infrastructure**: modifier store implementations
//! - **support**: errors and decimal helpers

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logging;
pub mod support;

pub use config::{default_config_path, AppConfig};
pub use logging::init_tracing;

pub use application::{
    availability_projects_costs, billing_group_costs, get_projects_costs, BillingService,
};
pub use domain::usage::{calculate_project_environments_totals_to_bill, normalize_environments};
pub use infrastructure::InMemoryModifierStore;
