//! Modifier retrieval port

use async_trait::async_trait;

use super::model::Modifier;
use crate::domain::usage::BillingPeriod;
use crate::support::DomainResult;

/// Source of the modifiers attached to a billing group.
///
/// Implementations may return modifiers outside `period`; the engine
/// re-checks activity before applying anything.
#[async_trait]
pub trait ModifierSource: Send + Sync {
    async fn modifiers_for(&self, group: &str, period: BillingPeriod)
        -> DomainResult<Vec<Modifier>>;
}
