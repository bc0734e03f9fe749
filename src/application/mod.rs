pub mod services;

// Re-export key types for convenience
pub use services::{
    availability_projects_costs, billing_group_costs, get_projects_costs, BillingService,
};
