//! World registry and the per-tick progression system.
//!
//! Gameplay code queues [`GameEvent`]s from anywhere holding a `&World`.
//! [`World::tick`] then runs in two phases so the predicate sweep always
//! observes settled tracker state:
//!
//! 1. Drain the event queue and apply every event in order.
//! 2. If the sweep cadence is due, run each character's quest predicate
//!    sweep with its trait allocator as the external evaluator.
//!
//! A failing event or sweep is logged and counted; it does not stop the
//! rest of the tick. Call [`World::apply`] directly to get the error.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use progression_core::config::ProgressionConfig;
use progression_core::predicate::PredicateEvaluator;
use progression_core::quest::QuestCatalog;
use progression_core::ExperienceSink;

use crate::components::{Character, Collaborators, EntityId};
use crate::error::{HostError, Result};
use crate::events::GameEvent;
use crate::save::CharacterSave;

/// Outcome of one [`World::tick`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Tick number, starting at 1.
    pub tick: u64,
    /// Events applied successfully.
    pub events_applied: usize,
    /// Events rejected by a tracker or addressed to an unknown entity.
    pub events_rejected: usize,
    /// Whether the predicate sweep ran this tick.
    pub swept: bool,
    /// Objectives completed by the sweep.
    pub objectives_completed: usize,
    /// Characters whose sweep returned an error.
    pub sweep_failures: usize,
}

/// All progression-enabled characters and their pending events.
pub struct World {
    config: ProgressionConfig,
    catalog: Arc<QuestCatalog>,
    characters: HashMap<EntityId, Character>,
    queue: Mutex<VecDeque<GameEvent>>,
    tick: u64,
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("characters", &self.characters.len())
            .field("queued", &self.queue.lock().len())
            .field("tick", &self.tick)
            .finish_non_exhaustive()
    }
}

impl World {
    /// Create an empty world whose quest catalog comes from `config`.
    ///
    /// # Errors
    /// Returns an error if the configuration fails validation.
    pub fn new(config: ProgressionConfig) -> Result<Self> {
        config.validate()?;
        let catalog = QuestCatalog::from_definitions(config.quests.definitions.iter().cloned())?;
        info!(quests = catalog.len(), "Progression world created");
        Ok(Self {
            config,
            catalog: Arc::new(catalog),
            characters: HashMap::new(),
            queue: Mutex::new(VecDeque::new()),
            tick: 0,
        })
    }

    /// The shared quest catalog.
    #[must_use]
    pub fn catalog(&self) -> &Arc<QuestCatalog> {
        &self.catalog
    }

    /// Spawn a character with a fresh id.
    pub fn spawn(&mut self, collaborators: Collaborators) -> EntityId {
        let id = EntityId::new();
        self.spawn_with_id(id, collaborators);
        id
    }

    /// Spawn a character under a known id, replacing any previous one.
    pub fn spawn_with_id(&mut self, id: EntityId, collaborators: Collaborators) {
        let character = Character::spawn(id, &self.config, Arc::clone(&self.catalog), collaborators);
        if self.characters.insert(id, character).is_some() {
            warn!(entity = %id, "Replaced existing character");
        }
    }

    /// Remove a character. Its subscriptions stay with whoever holds them.
    pub fn despawn(&mut self, id: EntityId) -> Option<Character> {
        self.characters.remove(&id)
    }

    /// Look up a character.
    #[must_use]
    pub fn character(&self, id: EntityId) -> Option<&Character> {
        self.characters.get(&id)
    }

    /// Look up a character mutably.
    pub fn character_mut(&mut self, id: EntityId) -> Option<&mut Character> {
        self.characters.get_mut(&id)
    }

    /// Number of characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.characters.len()
    }

    /// Whether the world has no characters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// Queue an event for the next tick.
    pub fn queue(&self, event: GameEvent) {
        self.queue.lock().push_back(event);
    }

    /// Number of events waiting for the next tick.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// Apply one event immediately.
    ///
    /// # Errors
    /// - [`HostError::UnknownEntity`] if the subject is not in the world.
    /// - [`HostError::Progression`] if a tracker rejects the event, for
    ///   example an unknown quest or objective.
    pub fn apply(&mut self, event: &GameEvent) -> Result<()> {
        match event {
            GameEvent::Hit {
                attacker,
                target,
                damage,
            } => self.apply_hit(*attacker, *target, *damage),
            GameEvent::Healed { target, amount } => {
                self.get_mut(*target)?.vitality.heal(*amount);
                Ok(())
            }
            GameEvent::LeveledUp { entity } => {
                self.get_mut(*entity)?.vitality.regenerate_on_level_up();
                Ok(())
            }
            GameEvent::QuestOffered { entity, quest } => {
                self.get_mut(*entity)?.quests.add_quest_by_name(quest)?;
                Ok(())
            }
            GameEvent::ObjectiveReached {
                entity,
                quest,
                objective,
            } => {
                self.get_mut(*entity)?
                    .quests
                    .complete_objective(quest, objective)?;
                Ok(())
            }
            GameEvent::TraitPointsAssigned {
                entity,
                trait_,
                delta,
            } => {
                let character = self.get_mut(*entity)?;
                if !character.traits.assign_points(*trait_, *delta) {
                    debug!(entity = %entity, %trait_, delta, "Trait assignment ignored");
                }
                Ok(())
            }
            GameEvent::TraitsCommitted { entity } => {
                self.get_mut(*entity)?.traits.commit();
                Ok(())
            }
        }
    }

    /// Run one logic tick: apply queued events, then sweep if due.
    pub fn tick(&mut self) -> TickReport {
        self.tick += 1;
        let mut report = TickReport {
            tick: self.tick,
            ..TickReport::default()
        };

        let events: Vec<GameEvent> = self.queue.lock().drain(..).collect();
        for event in &events {
            match self.apply(event) {
                Ok(()) => report.events_applied += 1,
                Err(e) => {
                    warn!(error = %e, entity = %event.subject(), "Game event rejected");
                    report.events_rejected += 1;
                }
            }
        }

        let interval = u64::from(self.config.quests.sweep_interval_ticks.max(1));
        if self.tick % interval == 0 {
            report.swept = true;
            for character in self.characters.values_mut() {
                let evaluators: [&dyn PredicateEvaluator; 1] = [&character.traits];
                match character.quests.complete_objectives_by_predicates(&evaluators) {
                    Ok(completed) => report.objectives_completed += completed,
                    Err(e) => {
                        warn!(error = %e, entity = %character.id, "Predicate sweep failed");
                        report.sweep_failures += 1;
                    }
                }
            }
        }

        debug!(?report, "Tick finished");
        report
    }

    /// Capture every tracker of a character.
    ///
    /// # Errors
    /// Returns [`HostError::UnknownEntity`] if the character is not in the world.
    pub fn save(&self, id: EntityId) -> Result<CharacterSave> {
        let character = self.characters.get(&id).ok_or(HostError::UnknownEntity(id))?;
        Ok(CharacterSave::capture(character))
    }

    /// Restore a save into the character it was captured from.
    ///
    /// # Errors
    /// Returns [`HostError::UnknownEntity`] if that character is not in the
    /// world, or the first component error.
    pub fn load(&mut self, save: &CharacterSave) -> Result<()> {
        let character = self.get_mut(save.entity)?;
        save.restore_into(character)
    }

    fn get_mut(&mut self, id: EntityId) -> Result<&mut Character> {
        self.characters.get_mut(&id).ok_or(HostError::UnknownEntity(id))
    }

    fn apply_hit(&mut self, attacker: Option<EntityId>, target: EntityId, damage: f32) -> Result<()> {
        // The victim leaves the map for the duration of the hit so the
        // attacker's ledger can be borrowed mutably alongside it.
        let mut victim = self
            .characters
            .remove(&target)
            .ok_or(HostError::UnknownEntity(target))?;

        let killer = match attacker {
            Some(id) if id != target => {
                let found = self.characters.get_mut(&id);
                if found.is_none() {
                    debug!(attacker = %id, "Attacker not in world, no experience awarded");
                }
                found
            }
            _ => None,
        };
        victim.vitality.take_damage(
            killer.map(|k| &mut k.experience as &mut dyn ExperienceSink),
            damage,
        );

        self.characters.insert(target, victim);
        Ok(())
    }
}
