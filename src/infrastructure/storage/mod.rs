//! Modifier store implementations

mod memory;

pub use memory::InMemoryModifierStore;
