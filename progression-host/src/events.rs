//! Game events that drive tracker mutations.
//!
//! Events are queued on the [`crate::systems::World`] as gameplay produces
//! them and applied in order at the start of the next tick.

use serde::{Deserialize, Serialize};

use progression_core::Trait;

use crate::components::EntityId;

/// Something that happened in the game and changes a character's progression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// `attacker` dealt `damage` to `target`. `attacker` is `None` for
    /// environmental damage.
    Hit {
        attacker: Option<EntityId>,
        target: EntityId,
        damage: f32,
    },

    /// `target` was healed.
    Healed { target: EntityId, amount: f32 },

    /// `entity` gained a level; the stat engine has already updated.
    LeveledUp { entity: EntityId },

    /// `entity` accepted the catalog quest named `quest`.
    QuestOffered { entity: EntityId, quest: String },

    /// Gameplay reached a manually completed objective.
    ObjectiveReached {
        entity: EntityId,
        quest: String,
        objective: String,
    },

    /// The trait UI staged `delta` points.
    TraitPointsAssigned {
        entity: EntityId,
        #[serde(rename = "trait")]
        trait_: Trait,
        delta: i32,
    },

    /// The trait UI confirmed its staged points.
    TraitsCommitted { entity: EntityId },
}

impl GameEvent {
    /// The character whose trackers this event mutates.
    #[must_use]
    pub fn subject(&self) -> EntityId {
        match self {
            Self::Hit { target, .. } | Self::Healed { target, .. } => *target,
            Self::LeveledUp { entity }
            | Self::QuestOffered { entity, .. }
            | Self::ObjectiveReached { entity, .. }
            | Self::TraitPointsAssigned { entity, .. }
            | Self::TraitsCommitted { entity } => *entity,
        }
    }
}
