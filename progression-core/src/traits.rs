//! Trait allocator: two-phase trait point allocation and trait bonuses.
//!
//! Points are first *staged* ([`TraitAllocator::assign_points`]) and then made
//! permanent by [`TraitAllocator::commit`]. The capacity check runs at staging
//! time: committed plus staged points never exceed the stat engine's
//! [`Stat::TotalTraitPoints`]. A later drop in total points (for example a
//! respec item being unequipped) is not corrected retroactively.
//!
//! Committed points feed back into the stat engine through
//! [`ModifierProvider`], using per-point bonus tables built once from
//! [`TraitConfig`].

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::collaborators::{ModifierProvider, StatSource};
use crate::config::TraitConfig;
use crate::error::{ProgressionError, Result};
use crate::predicate::{self, PredicateEvaluator};
use crate::save::Saveable;
use crate::types::{Stat, Trait};

type BonusTable = HashMap<Stat, BTreeMap<Trait, f32>>;

/// Trait points of one character.
pub struct TraitAllocator {
    stats: Arc<dyn StatSource>,
    committed: BTreeMap<Trait, i32>,
    staged: BTreeMap<Trait, i32>,
    additive: BonusTable,
    percentage: BonusTable,
}

impl std::fmt::Debug for TraitAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraitAllocator")
            .field("committed", &self.committed)
            .field("staged", &self.staged)
            .finish_non_exhaustive()
    }
}

impl TraitAllocator {
    /// Create an allocator with no points and bonus tables folded from `config`.
    #[must_use]
    pub fn new(config: &TraitConfig, stats: Arc<dyn StatSource>) -> Self {
        let mut additive = BonusTable::new();
        let mut percentage = BonusTable::new();
        for bonus in &config.bonuses {
            additive
                .entry(bonus.stat)
                .or_default()
                .insert(bonus.trait_, bonus.additive_per_point);
            percentage
                .entry(bonus.stat)
                .or_default()
                .insert(bonus.trait_, bonus.percentage_per_point);
        }
        Self {
            stats,
            committed: BTreeMap::new(),
            staged: BTreeMap::new(),
            additive,
            percentage,
        }
    }

    /// Committed points in `trait_`.
    #[must_use]
    pub fn points(&self, trait_: Trait) -> i32 {
        self.committed.get(&trait_).copied().unwrap_or(0)
    }

    /// Staged, uncommitted points in `trait_`.
    #[must_use]
    pub fn staged_points(&self, trait_: Trait) -> i32 {
        self.staged.get(&trait_).copied().unwrap_or(0)
    }

    /// Committed plus staged points in `trait_`.
    #[must_use]
    pub fn proposed_points(&self, trait_: Trait) -> i32 {
        self.points(trait_).saturating_add(self.staged_points(trait_))
    }

    /// Capacity reported by the stat engine, truncated toward zero.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn assignable_points(&self) -> i32 {
        self.stats.stat(Stat::TotalTraitPoints) as i32
    }

    /// Committed plus staged points over every trait, saturating at `i32::MAX`.
    #[must_use]
    pub fn total_proposed_points(&self) -> i32 {
        self.committed
            .values()
            .chain(self.staged.values())
            .fold(0_i32, |total, points| total.saturating_add(*points))
    }

    /// Capacity not yet committed or staged.
    #[must_use]
    pub fn unassigned_points(&self) -> i32 {
        self.assignable_points().saturating_sub(self.total_proposed_points())
    }

    /// Whether staging `delta` points (possibly negative) in `trait_` is allowed.
    #[must_use]
    pub fn can_assign_points(&self, trait_: Trait, delta: i32) -> bool {
        match self.staged_points(trait_).checked_add(delta) {
            Some(staged) if staged >= 0 => {}
            _ => return false,
        }
        delta <= self.unassigned_points()
    }

    /// Stage `delta` points in `trait_`. Returns whether the change was applied;
    /// a rejected change leaves the allocator untouched.
    pub fn assign_points(&mut self, trait_: Trait, delta: i32) -> bool {
        if !self.can_assign_points(trait_, delta) {
            debug!(%trait_, delta, unassigned = self.unassigned_points(), "Trait assignment rejected");
            return false;
        }
        let staged = self.staged.entry(trait_).or_insert(0);
        *staged += delta;
        if *staged == 0 {
            self.staged.remove(&trait_);
        }
        debug!(%trait_, delta, "Trait points staged");
        true
    }

    /// Make every staged allocation permanent and clear the staging area.
    pub fn commit(&mut self) {
        let staged = std::mem::take(&mut self.staged);
        for (trait_, delta) in staged {
            if delta == 0 {
                continue;
            }
            let total = self.points(trait_).saturating_add(delta);
            self.committed.insert(trait_, total);
            info!(%trait_, points = total, "Trait points committed");
        }
    }

    /// Iterate committed points, in declaration order of [`Trait`].
    pub fn committed(&self) -> impl Iterator<Item = (Trait, i32)> + '_ {
        self.committed.iter().map(|(t, p)| (*t, *p))
    }

    #[allow(clippy::cast_precision_loss)]
    fn modifiers<'a>(&'a self, table: &'a BonusTable, stat: Stat) -> Box<dyn Iterator<Item = f32> + 'a> {
        match table.get(&stat) {
            Some(bonuses) => Box::new(
                bonuses
                    .iter()
                    .map(move |(trait_, per_point)| per_point * self.points(*trait_) as f32),
            ),
            None => Box::new(std::iter::empty()),
        }
    }
}

impl ModifierProvider for TraitAllocator {
    fn additive_modifiers(&self, stat: Stat) -> Box<dyn Iterator<Item = f32> + '_> {
        self.modifiers(&self.additive, stat)
    }

    fn percentage_modifiers(&self, stat: Stat) -> Box<dyn Iterator<Item = f32> + '_> {
        self.modifiers(&self.percentage, stat)
    }
}

impl PredicateEvaluator for TraitAllocator {
    /// Handles `MinimumTrait [trait, threshold]`: committed points in the
    /// trait are at least the threshold.
    fn evaluate(&self, predicate: &str, parameters: &[String]) -> Result<Option<bool>> {
        if predicate != "MinimumTrait" {
            return Ok(None);
        }
        let trait_ = Trait::parse(predicate::parameter(predicate, parameters, 0)?)?;
        let raw = predicate::parameter(predicate, parameters, 1)?;
        let threshold: i32 = raw.trim().parse().map_err(|_| ProgressionError::InvalidPredicateParameter {
            predicate: predicate.to_string(),
            reason: format!("threshold `{raw}` is not an integer"),
        })?;
        Ok(Some(self.points(trait_) >= threshold))
    }
}

impl Saveable for TraitAllocator {
    const SAVE_KEY: &'static str = "traits";

    fn capture(&self) -> Value {
        let map: Map<String, Value> = self
            .committed
            .iter()
            .map(|(trait_, points)| (trait_.to_string(), Value::from(*points)))
            .collect();
        Value::Object(map)
    }

    /// Replaces committed points and discards staged ones. Unknown trait
    /// names, non-integer values and negative values are skipped. A snapshot that is not an
    /// object is ignored.
    fn restore(&mut self, state: &Value) -> Result<()> {
        let Some(map) = state.as_object() else {
            warn!("Ignoring malformed trait snapshot");
            return Ok(());
        };

        let mut committed = BTreeMap::new();
        for (name, value) in map {
            let Ok(trait_) = Trait::parse(name) else {
                warn!(name = %name, "Skipping unknown trait in snapshot");
                continue;
            };
            let Some(points) = value.as_i64().and_then(|p| i32::try_from(p).ok()) else {
                warn!(%trait_, value = %value, "Skipping non-integer trait points");
                continue;
            };
            if points < 0 {
                warn!(%trait_, points, "Skipping negative trait points");
                continue;
            }
            committed.insert(trait_, points);
        }

        self.committed = committed;
        self.staged.clear();
        info!(traits = self.committed.len(), "Trait points restored");
        Ok(())
    }
}
