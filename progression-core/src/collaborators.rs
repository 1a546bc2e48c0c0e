//! Narrow contracts for the systems this crate consumes but does not own.
//!
//! The host supplies implementations at character spawn time. All of them
//! take `&self`; a host that needs mutation behind these calls uses its own
//! interior mutability.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::types::{ItemId, Stat};

/// The base-stat engine: level + equipment + modifiers → stat values.
///
/// Level-up notifications are not part of this contract. The host observes
/// its own level-up events and calls
/// [`VitalityTracker::regenerate_on_level_up`](crate::VitalityTracker::regenerate_on_level_up)
/// (see `GameEvent::LeveledUp` in `progression-host`).
pub trait StatSource: Send + Sync {
    /// Current value of `stat` for the owning character.
    fn stat(&self, stat: Stat) -> f32;
}

/// A fixed stat table. Unset stats read as `0.0`.
///
/// Stands in for the stat engine in tests, tools, and hosts whose stats do
/// not depend on level or equipment.
#[derive(Debug, Default)]
pub struct StatTable {
    values: RwLock<HashMap<Stat, f32>>,
}

impl StatTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    #[must_use]
    pub fn with(self, stat: Stat, value: f32) -> Self {
        self.set(stat, value);
        self
    }

    /// Overwrite the value of `stat`.
    pub fn set(&self, stat: Stat, value: f32) {
        self.values.write().insert(stat, value);
    }
}

impl StatSource for StatTable {
    fn stat(&self, stat: Stat) -> f32 {
        self.values.read().get(&stat).copied().unwrap_or(0.0)
    }
}

/// A contributor of stat modifiers, consumed by the stat engine.
///
/// The engine folds providers as `(base + Σ additive) × (1 + Σ percentage / 100)`;
/// see [`modified_stat`].
pub trait ModifierProvider {
    /// Flat bonuses for `stat`.
    fn additive_modifiers(&self, stat: Stat) -> Box<dyn Iterator<Item = f32> + '_>;
    /// Percentage bonuses for `stat` (`10.0` means +10%).
    fn percentage_modifiers(&self, stat: Stat) -> Box<dyn Iterator<Item = f32> + '_>;
}

/// Apply every provider's modifiers for `stat` to a base value.
#[must_use]
pub fn modified_stat(base: f32, stat: Stat, providers: &[&dyn ModifierProvider]) -> f32 {
    let additive: f32 = providers.iter().flat_map(|p| p.additive_modifiers(stat)).sum();
    let percentage: f32 = providers.iter().flat_map(|p| p.percentage_modifiers(stat)).sum();
    (base + additive) * (1.0 + percentage / 100.0)
}

/// Cancels whatever the character is currently doing (attacking, moving).
pub trait ActionCanceller: Send + Sync {
    /// Abort the active action, if any.
    fn cancel_current_action(&self);
}

/// The character's inventory, as far as quest rewards are concerned.
pub trait InventorySink: Send + Sync {
    /// Place `count` of `item` in the first free slot. `false` if it did not fit.
    fn add_to_first_empty_slot(&self, item: &ItemId, count: u32) -> bool;
}

/// Drops items into the world next to the character.
pub trait ItemDropper: Send + Sync {
    /// Spawn a pickup for `count` of `item`.
    fn drop_item(&self, item: &ItemId, count: u32);
}

/// Anything that can be credited with experience.
pub trait ExperienceSink {
    /// Add `amount` experience points.
    fn gain_experience(&mut self, amount: f32);
}
