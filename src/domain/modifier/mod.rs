//! Billing modifiers: discounts and surcharges applied after costing

pub mod engine;
pub mod model;
pub mod repository;

pub use engine::{active_modifiers, apply_modifiers, ModifierOutcome};
pub use model::{decode_modifiers, Modifier, ModifierKind, ModifierRecord};
pub use repository::ModifierSource;
