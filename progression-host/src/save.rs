//! Whole-character save documents.
//!
//! A [`CharacterSave`] bundles the snapshots of all four trackers under
//! their [`Saveable::SAVE_KEY`]s:
//!
//! ```json
//! {
//!   "entity": "4f0c…",
//!   "saved_at": "2024-05-01T12:00:00Z",
//!   "components": {
//!     "vitality":   { "health": 87.5 },
//!     "experience": { "points": 1200.0 },
//!     "traits":     { "Strength": 3 },
//!     "quests":     [ { "quest": "Kill10Rats", "completedObjectives": [] } ]
//!   }
//! }
//! ```
//!
//! Components missing from a document are skipped on restore, so older
//! saves load into newer characters. Writing documents to disk is the
//! caller's job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use progression_core::{ExperienceLedger, QuestTracker, Saveable, TraitAllocator, VitalityTracker};

use crate::components::{Character, EntityId};
use crate::error::Result;

/// Snapshot of every progression tracker of one character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterSave {
    /// Character the snapshot was captured from.
    pub entity: EntityId,
    /// Capture time.
    pub saved_at: DateTime<Utc>,
    /// Tracker snapshots keyed by save key.
    #[serde(default)]
    pub components: Map<String, Value>,
}

impl CharacterSave {
    /// Capture all four trackers of `character`.
    #[must_use]
    pub fn capture(character: &Character) -> Self {
        let mut components = Map::new();
        capture_component(&character.vitality, &mut components);
        capture_component(&character.experience, &mut components);
        capture_component(&character.traits, &mut components);
        capture_component(&character.quests, &mut components);
        debug!(entity = %character.id, "Character captured");
        Self {
            entity: character.id,
            saved_at: Utc::now(),
            components,
        }
    }

    /// Restore every component present in this save into `character`.
    ///
    /// Every component is validated before any is restored, so a save with
    /// one bad component leaves `character` untouched.
    ///
    /// # Errors
    /// Returns the first component error.
    pub fn restore_into(&self, character: &mut Character) -> Result<()> {
        if self.entity != character.id {
            warn!(saved = %self.entity, target = %character.id, "Restoring save into a different entity");
        }
        validate_component::<VitalityTracker>(&self.components)?;
        validate_component::<ExperienceLedger>(&self.components)?;
        validate_component::<TraitAllocator>(&self.components)?;
        validate_component::<QuestTracker>(&self.components)?;
        restore_component(&mut character.vitality, &self.components)?;
        restore_component(&mut character.experience, &self.components)?;
        restore_component(&mut character.traits, &self.components)?;
        restore_component(&mut character.quests, &self.components)?;
        info!(entity = %character.id, saved_at = %self.saved_at, "Character restored");
        Ok(())
    }

    /// Encode as a pretty-printed JSON document.
    ///
    /// # Errors
    /// Returns [`crate::HostError::Json`] if encoding fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode a JSON document.
    ///
    /// # Errors
    /// Returns [`crate::HostError::Json`] if the document is not a save.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

fn capture_component<T: Saveable>(tracker: &T, components: &mut Map<String, Value>) {
    components.insert(T::SAVE_KEY.to_string(), tracker.capture());
}

fn validate_component<T: Saveable>(components: &Map<String, Value>) -> Result<()> {
    if let Some(state) = components.get(T::SAVE_KEY) {
        T::validate(state)?;
    }
    Ok(())
}

fn restore_component<T: Saveable>(tracker: &mut T, components: &Map<String, Value>) -> Result<()> {
    match components.get(T::SAVE_KEY) {
        Some(state) => tracker.restore(state)?,
        None => debug!(component = T::SAVE_KEY, "Component missing from save, skipped"),
    }
    Ok(())
}
