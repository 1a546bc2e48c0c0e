//! Vitality tracker: current health, damage, healing, death.
//!
//! Current health starts *unmaterialised*: the tracker does not know its
//! value until [`VitalityTracker::initialize`] reads max health from the stat
//! engine. Mutations materialise implicitly; readers fall back to max
//! health without storing it, so reads never change state.
//!
//! Every mutation ends with a death-edge update that compares the current
//! dead/alive state with the previous one:
//!
//! - alive → dead: emit [`VitalityEvent::Collapsed`] and cancel the current action
//! - dead → alive: emit [`VitalityEvent::Revived`]
//!
//! [`VitalityTracker::health_fraction`] divides by max health without a guard.
//! A stat engine that reports zero max health yields `NaN`/`inf`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::collaborators::{ActionCanceller, ExperienceSink, StatSource};
use crate::config::VitalityConfig;
use crate::error::Result;
use crate::events::{Notifier, Subscription, VitalityEvent};
use crate::save::{self, Saveable};
use crate::types::Stat;

/// Persisted form of a [`VitalityTracker`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VitalitySnapshot {
    /// Current health.
    pub health: f32,
}

/// Health state of one character.
pub struct VitalityTracker {
    config: VitalityConfig,
    stats: Arc<dyn StatSource>,
    actions: Arc<dyn ActionCanceller>,
    current: Option<f32>,
    was_dead_last_update: bool,
    notifier: Notifier<VitalityEvent>,
}

impl std::fmt::Debug for VitalityTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VitalityTracker")
            .field("config", &self.config)
            .field("current", &self.current)
            .field("was_dead_last_update", &self.was_dead_last_update)
            .finish_non_exhaustive()
    }
}

impl VitalityTracker {
    /// Create a tracker whose health is not yet materialised.
    #[must_use]
    pub fn new(
        config: VitalityConfig,
        stats: Arc<dyn StatSource>,
        actions: Arc<dyn ActionCanceller>,
    ) -> Self {
        Self {
            config,
            stats,
            actions,
            current: None,
            was_dead_last_update: false,
            notifier: Notifier::new(),
        }
    }

    /// Materialise current health from the stat engine's max health.
    /// No-op once health is known.
    pub fn initialize(&mut self) {
        if self.current.is_none() {
            let max = self.max_health_points();
            debug!(health = max, "Vitality initialised from max health");
            self.current = Some(max);
        }
    }

    /// Whether health has been materialised.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.current.is_some()
    }

    /// Apply `amount` damage dealt by `instigator`.
    ///
    /// Health is clamped to `[0, max]`. The hit that brings health to zero
    /// emits [`VitalityEvent::Died`] and credits `instigator` with this
    /// character's [`Stat::ExperienceReward`]; every other hit (including
    /// hits on an already-dead character) emits [`VitalityEvent::DamageTaken`]
    /// with the raw `amount`. Negative damage is treated as zero.
    pub fn take_damage(&mut self, instigator: Option<&mut dyn ExperienceSink>, amount: f32) {
        self.initialize();
        let was_dead = self.is_dead();
        let max = self.max_health_points();
        let health = (self.health_points() - amount.max(0.0)).clamp(0.0, max.max(0.0));
        self.current = Some(health);
        debug!(amount, health, max, "Damage applied");

        if health <= 0.0 && !was_dead {
            info!("Character died");
            self.notifier.emit(&VitalityEvent::Died);
            self.award_experience(instigator);
        } else {
            self.notifier.emit(&VitalityEvent::DamageTaken { amount });
        }

        self.update_death_edge();
    }

    /// Restore up to `amount` health, never above max health.
    /// Negative amounts are treated as zero.
    pub fn heal(&mut self, amount: f32) {
        self.initialize();
        let max = self.max_health_points();
        let health = (self.health_points() + amount.max(0.0)).clamp(0.0, max.max(0.0));
        self.current = Some(health);
        debug!(amount, health, max, "Healed");
        self.update_death_edge();
    }

    /// Level-up regeneration: raise health to `regeneration_percentage` of
    /// max health if it is below that. Never lowers health.
    pub fn regenerate_on_level_up(&mut self) {
        self.initialize();
        let floor = self.max_health_points() * (self.config.regeneration_percentage / 100.0);
        let health = self.health_points().max(floor);
        self.current = Some(health);
        debug!(health, floor, "Regenerated on level up");
    }

    /// `true` once health has reached zero.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.health_points() <= 0.0
    }

    /// Current health.
    #[must_use]
    pub fn health_points(&self) -> f32 {
        self.current.unwrap_or_else(|| self.max_health_points())
    }

    /// Max health as reported by the stat engine.
    #[must_use]
    pub fn max_health_points(&self) -> f32 {
        self.stats.stat(Stat::Health)
    }

    /// `current / max`. Unguarded; see the module docs.
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        self.health_points() / self.max_health_points()
    }

    /// `100 × health_fraction()`.
    #[must_use]
    pub fn health_percentage(&self) -> f32 {
        100.0 * self.health_fraction()
    }

    /// Listen for [`VitalityEvent`]s.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&VitalityEvent) + Send + Sync + 'static,
    {
        self.notifier.subscribe(listener)
    }

    fn award_experience(&self, instigator: Option<&mut dyn ExperienceSink>) {
        let Some(instigator) = instigator else {
            return;
        };
        let reward = self.stats.stat(Stat::ExperienceReward);
        debug!(reward, "Awarding experience to killer");
        instigator.gain_experience(reward);
    }

    fn update_death_edge(&mut self) {
        let dead = self.is_dead();
        if !self.was_dead_last_update && dead {
            self.notifier.emit(&VitalityEvent::Collapsed);
            self.actions.cancel_current_action();
        }
        if self.was_dead_last_update && !dead {
            info!("Character revived");
            self.notifier.emit(&VitalityEvent::Revived);
        }
        self.was_dead_last_update = dead;
    }
}

impl Saveable for VitalityTracker {
    const SAVE_KEY: &'static str = "vitality";

    fn capture(&self) -> Value {
        save::to_value(&VitalitySnapshot {
            health: self.health_points(),
        })
    }

    fn validate(state: &Value) -> Result<()> {
        save::from_value::<VitalitySnapshot>(Self::SAVE_KEY, state).map(|_| ())
    }

    /// Overwrites health verbatim (no clamping), then runs the death-edge
    /// update, so restoring a dead snapshot collapses the character and
    /// restoring a live one over a dead character revives it.
    fn restore(&mut self, state: &Value) -> Result<()> {
        let snapshot: VitalitySnapshot = save::from_value(Self::SAVE_KEY, state)?;
        self.current = Some(snapshot.health);
        debug!(health = snapshot.health, "Vitality restored");
        self.update_death_edge();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::StatTable;
    use crate::experience::ExperienceLedger;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingCanceller(AtomicUsize);

    impl ActionCanceller for CountingCanceller {
        fn cancel_current_action(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn tracker(max: f32) -> (VitalityTracker, Arc<StatTable>, Arc<CountingCanceller>) {
        let stats = Arc::new(StatTable::new().with(Stat::Health, max).with(Stat::ExperienceReward, 25.0));
        let actions = Arc::new(CountingCanceller::default());
        let mut vitality = VitalityTracker::new(VitalityConfig::default(), stats.clone(), actions.clone());
        vitality.initialize();
        (vitality, stats, actions)
    }

    fn record(vitality: &VitalityTracker) -> (Arc<Mutex<Vec<VitalityEvent>>>, Subscription) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let sub = vitality.subscribe(move |e| sink.lock().push(*e));
        (events, sub)
    }

    #[test]
    fn reads_before_initialize_fall_back_to_max() {
        let stats = Arc::new(StatTable::new().with(Stat::Health, 80.0));
        let vitality = VitalityTracker::new(
            VitalityConfig::default(),
            stats.clone(),
            Arc::new(CountingCanceller::default()),
        );
        assert!(!vitality.is_initialized());
        assert!((vitality.health_points() - 80.0).abs() < f32::EPSILON);

        stats.set(Stat::Health, 120.0);
        assert!((vitality.health_points() - 120.0).abs() < f32::EPSILON);
        assert!(!vitality.is_initialized());
    }

    #[test]
    fn initialize_pins_value() {
        let (vitality, stats, _) = tracker(100.0);
        stats.set(Stat::Health, 150.0);
        assert!((vitality.health_points() - 100.0).abs() < f32::EPSILON);
    }

    #[test]
    fn damage_is_clamped_at_zero() {
        let (mut vitality, _, _) = tracker(50.0);
        vitality.take_damage(None, 80.0);
        assert!(vitality.health_points().abs() < f32::EPSILON);
        assert!(vitality.is_dead());
    }

    #[test]
    fn non_lethal_hit_reports_raw_amount() {
        let (mut vitality, _, _) = tracker(100.0);
        let (events, _sub) = record(&vitality);
        vitality.take_damage(None, 30.0);
        assert_eq!(*events.lock(), vec![VitalityEvent::DamageTaken { amount: 30.0 }]);
        assert!((vitality.health_points() - 70.0).abs() < f32::EPSILON);
    }

    #[test]
    fn lethal_hit_fires_died_once_and_awards_experience() {
        let (mut vitality, _, actions) = tracker(100.0);
        let (events, _sub) = record(&vitality);
        let mut killer = ExperienceLedger::new();

        vitality.take_damage(Some(&mut killer), 100.0);
        vitality.take_damage(Some(&mut killer), 10.0);

        assert_eq!(
            *events.lock(),
            vec![
                VitalityEvent::Died,
                VitalityEvent::Collapsed,
                VitalityEvent::DamageTaken { amount: 10.0 },
            ]
        );
        assert!((killer.points() - 25.0).abs() < f32::EPSILON);
        assert_eq!(actions.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn heal_never_exceeds_max() {
        let (mut vitality, _, _) = tracker(100.0);
        vitality.take_damage(None, 40.0);
        vitality.heal(1_000.0);
        assert!((vitality.health_points() - 100.0).abs() < f32::EPSILON);
    }

    #[test]
    fn negative_amounts_are_ignored() {
        let (mut vitality, _, _) = tracker(100.0);
        vitality.take_damage(None, 10.0);
        vitality.take_damage(None, -50.0);
        vitality.heal(-50.0);
        assert!((vitality.health_points() - 90.0).abs() < f32::EPSILON);
    }

    #[test]
    fn regeneration_raises_but_never_lowers() {
        let (mut vitality, stats, _) = tracker(100.0);
        vitality.take_damage(None, 90.0);
        vitality.regenerate_on_level_up();
        assert!((vitality.health_points() - 70.0).abs() < f32::EPSILON);

        stats.set(Stat::Health, 50.0);
        vitality.regenerate_on_level_up();
        assert!((vitality.health_points() - 70.0).abs() < f32::EPSILON);
    }

    #[test]
    fn fraction_and_percentage() {
        let (mut vitality, _, _) = tracker(200.0);
        vitality.take_damage(None, 50.0);
        assert!((vitality.health_fraction() - 0.75).abs() < f32::EPSILON);
        assert!((vitality.health_percentage() - 75.0).abs() < 1e-4);
    }

    #[test]
    fn restore_is_raw_and_runs_death_edge() {
        let (mut vitality, _, actions) = tracker(100.0);
        let (events, _sub) = record(&vitality);

        vitality.restore(&serde_json::json!({ "health": 0.0 })).expect("restore");
        assert!(vitality.is_dead());
        assert_eq!(actions.0.load(Ordering::SeqCst), 1);

        vitality.restore(&serde_json::json!({ "health": 140.0 })).expect("restore");
        assert!((vitality.health_points() - 140.0).abs() < f32::EPSILON);

        assert_eq!(*events.lock(), vec![VitalityEvent::Collapsed, VitalityEvent::Revived]);
    }

    #[test]
    fn capture_reports_current_health() {
        let (mut vitality, _, _) = tracker(100.0);
        vitality.take_damage(None, 12.5);
        assert_eq!(vitality.capture(), serde_json::json!({ "health": 87.5 }));
    }
}
