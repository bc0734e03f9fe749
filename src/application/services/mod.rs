//! Application services

mod billing;

pub use billing::{
    availability_projects_costs, billing_group_costs, component_costs, get_projects_costs,
    BillingService,
};
