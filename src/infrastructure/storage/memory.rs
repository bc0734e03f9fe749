//! In-memory modifier store

use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use crate::domain::modifier::{Modifier, ModifierRecord, ModifierSource};
use crate::domain::usage::BillingPeriod;
use crate::domain::{DomainError, DomainResult};

/// In-memory modifier store for development and testing
pub struct InMemoryModifierStore {
    modifiers: DashMap<i32, Modifier>,
    modifier_counter: AtomicI32,
}

impl InMemoryModifierStore {
    pub fn new() -> Self {
        Self {
            modifiers: DashMap::new(),
            modifier_counter: AtomicI32::new(1),
        }
    }

    /// Store a modifier under a fresh id and return the stored copy.
    pub fn add(&self, mut modifier: Modifier) -> Modifier {
        let id = self.modifier_counter.fetch_add(1, Ordering::SeqCst);
        modifier.id = Some(id);
        self.modifiers.insert(id, modifier.clone());
        debug!(id, group = %modifier.group_ref, kind = %modifier.kind, "Modifier stored");
        modifier
    }

    /// Store every modifier a column-shaped record expands into.
    pub fn add_record(&self, record: ModifierRecord) -> Vec<Modifier> {
        record
            .into_modifiers()
            .into_iter()
            .map(|modifier| self.add(modifier))
            .collect()
    }

    pub fn get(&self, id: i32) -> Option<Modifier> {
        self.modifiers.get(&id).map(|m| m.clone())
    }

    pub fn remove(&self, id: i32) -> DomainResult<Modifier> {
        self.modifiers
            .remove(&id)
            .map(|(_, modifier)| modifier)
            .ok_or_else(|| DomainError::NotFound {
                entity: "Modifier",
                field: "id",
                value: id.to_string(),
            })
    }

    /// Remove all modifiers of a group, returning how many were dropped.
    pub fn clear_group(&self, group: &str) -> usize {
        let mut removed = 0;
        self.modifiers.retain(|_, m| {
            let keep = m.group_ref != group;
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    /// Modifiers of a group in insertion order.
    pub fn list_group(&self, group: &str) -> Vec<Modifier> {
        let mut modifiers: Vec<Modifier> = self
            .modifiers
            .iter()
            .filter(|entry| entry.group_ref == group)
            .map(|entry| entry.value().clone())
            .collect();
        modifiers.sort_by_key(|m| m.id);
        modifiers
    }

    pub fn len(&self) -> usize {
        self.modifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }
}

impl Default for InMemoryModifierStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModifierSource for InMemoryModifierStore {
    async fn modifiers_for(
        &self,
        group: &str,
        period: BillingPeriod,
    ) -> DomainResult<Vec<Modifier>> {
        Ok(self
            .list_group(group)
            .into_iter()
            .filter(|m| m.is_active_for(period))
            .collect())
    }
}

// ── Tests ──────────────────────────────────────────────────────
