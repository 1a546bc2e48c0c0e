//! Quest definitions, the quest catalog, and per-character quest progress.
//!
//! Definitions ([`Quest`]) are immutable and shared through `Arc`. A
//! character's progress against one definition is a [`QuestStatus`]; the
//! [`QuestTracker`] owns all of a character's statuses.

pub mod status;
pub mod tracker;

pub use status::QuestStatus;
pub use tracker::{QuestRecordSnapshot, QuestTracker};

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ProgressionError, Result};
use crate::predicate::Condition;
use crate::types::ItemId;

/// An immutable quest definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quest {
    /// Unique quest name; also the persisted identifier.
    pub name: String,
    /// Objectives in display order.
    #[serde(default)]
    pub objectives: Vec<Objective>,
    /// Items granted once every objective is complete.
    #[serde(default)]
    pub rewards: Vec<Reward>,
}

impl Quest {
    /// A quest with no objectives or rewards yet.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            objectives: Vec::new(),
            rewards: Vec::new(),
        }
    }

    /// Builder: append an objective.
    #[must_use]
    pub fn with_objective(mut self, objective: Objective) -> Self {
        self.objectives.push(objective);
        self
    }

    /// Builder: append a reward.
    #[must_use]
    pub fn with_reward(mut self, item: impl Into<String>, count: u32) -> Self {
        self.rewards.push(Reward {
            item: ItemId::new(item),
            count,
        });
        self
    }

    /// Look up an objective by reference.
    #[must_use]
    pub fn objective(&self, reference: &str) -> Option<&Objective> {
        self.objectives.iter().find(|o| o.reference == reference)
    }

    /// Whether `reference` names one of this quest's objectives.
    #[must_use]
    pub fn has_objective(&self, reference: &str) -> bool {
        self.objective(reference).is_some()
    }
}

/// One completable step of a quest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    /// Identifier, unique within its quest.
    pub reference: String,
    /// Player-facing text.
    #[serde(default)]
    pub description: String,
    /// When present, the predicate sweep completes the objective as soon as
    /// the condition holds.
    #[serde(default)]
    pub condition: Option<Condition>,
}

impl Objective {
    /// A manually completed objective.
    #[must_use]
    pub fn new(reference: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            description: description.into(),
            condition: None,
        }
    }

    /// Builder: complete automatically once `condition` holds.
    #[must_use]
    pub fn completed_when(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }
}

/// An item stack handed out on quest completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    /// Item definition.
    pub item: ItemId,
    /// Stack size.
    pub count: u32,
}

/// Name → definition registry shared by every tracker in a world.
#[derive(Debug, Clone, Default)]
pub struct QuestCatalog {
    quests: HashMap<String, Arc<Quest>>,
    order: Vec<String>,
}

impl QuestCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from definitions.
    ///
    /// # Errors
    /// Returns [`ProgressionError::Config`] if two definitions share a name.
    pub fn from_definitions(definitions: impl IntoIterator<Item = Quest>) -> Result<Self> {
        let mut catalog = Self::new();
        for quest in definitions {
            catalog.insert(quest)?;
        }
        Ok(catalog)
    }

    /// Register a definition and return the shared handle.
    ///
    /// # Errors
    /// Returns [`ProgressionError::Config`] if the name is already taken.
    pub fn insert(&mut self, quest: Quest) -> Result<Arc<Quest>> {
        if self.quests.contains_key(&quest.name) {
            return Err(ProgressionError::Config(format!(
                "duplicate quest `{}`",
                quest.name
            )));
        }
        let quest = Arc::new(quest);
        self.order.push(quest.name.clone());
        self.quests.insert(quest.name.clone(), Arc::clone(&quest));
        Ok(quest)
    }

    /// Look up a definition by name.
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<Arc<Quest>> {
        self.quests.get(name).cloned()
    }

    /// Definitions in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Quest>> {
        self.order.iter().filter_map(|name| self.quests.get(name))
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.quests.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quests.is_empty()
    }
}
