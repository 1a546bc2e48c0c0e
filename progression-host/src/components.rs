//! Character entities: the four progression trackers plus the host systems
//! they are wired to.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use progression_core::config::ProgressionConfig;
use progression_core::quest::QuestCatalog;
use progression_core::{
    ActionCanceller, ExperienceLedger, InventorySink, ItemDropper, QuestTracker, StatSource,
    TraitAllocator, VitalityTracker,
};

/// Unique identifier for a character in a [`crate::systems::World`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    /// Create a new random entity ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Host systems a character's trackers call into.
#[derive(Clone)]
pub struct Collaborators {
    /// Stat engine (max health, experience reward, trait capacity).
    pub stats: Arc<dyn StatSource>,
    /// Action scheduler, cancelled on death.
    pub actions: Arc<dyn ActionCanceller>,
    /// Inventory receiving quest rewards.
    pub inventory: Arc<dyn InventorySink>,
    /// World drop for rewards that do not fit the inventory.
    pub dropper: Arc<dyn ItemDropper>,
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

/// A progression-enabled entity.
#[derive(Debug)]
pub struct Character {
    /// Identity within the world.
    pub id: EntityId,
    /// Health state.
    pub vitality: VitalityTracker,
    /// Experience total.
    pub experience: ExperienceLedger,
    /// Trait points.
    pub traits: TraitAllocator,
    /// Quest log.
    pub quests: QuestTracker,
    collaborators: Collaborators,
}

impl Character {
    /// Build the four trackers and materialise health from the stat engine.
    #[must_use]
    pub fn spawn(
        id: EntityId,
        config: &ProgressionConfig,
        catalog: Arc<QuestCatalog>,
        collaborators: Collaborators,
    ) -> Self {
        let mut vitality = VitalityTracker::new(
            config.vitality,
            Arc::clone(&collaborators.stats),
            Arc::clone(&collaborators.actions),
        );
        vitality.initialize();

        let character = Self {
            id,
            vitality,
            experience: ExperienceLedger::new(),
            traits: TraitAllocator::new(&config.traits, Arc::clone(&collaborators.stats)),
            quests: QuestTracker::new(
                catalog,
                Arc::clone(&collaborators.inventory),
                Arc::clone(&collaborators.dropper),
            ),
            collaborators,
        };
        debug!(entity = %id, health = character.vitality.health_points(), "Character spawned");
        character
    }

    /// The host systems this character was spawned with.
    #[must_use]
    pub fn collaborators(&self) -> &Collaborators {
        &self.collaborators
    }
}
