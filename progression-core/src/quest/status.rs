//! Progress of one character against one quest definition.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::error::{ProgressionError, Result};
use crate::quest::Quest;

/// Completed objectives for one [`Quest`].
#[derive(Debug, Clone, PartialEq)]
pub struct QuestStatus {
    quest: Arc<Quest>,
    completed: BTreeSet<String>,
}

impl QuestStatus {
    /// Fresh progress with nothing completed.
    #[must_use]
    pub fn new(quest: Arc<Quest>) -> Self {
        Self {
            quest,
            completed: BTreeSet::new(),
        }
    }

    /// Progress restored from a snapshot. References the quest does not
    /// define are dropped.
    pub(crate) fn restored(quest: Arc<Quest>, completed: impl IntoIterator<Item = String>) -> Self {
        let completed = completed
            .into_iter()
            .filter(|reference| quest.has_objective(reference))
            .collect();
        Self { quest, completed }
    }

    /// The definition this progress tracks.
    #[must_use]
    pub fn quest(&self) -> &Arc<Quest> {
        &self.quest
    }

    /// Completed objective references, sorted.
    pub fn completed_objectives(&self) -> impl Iterator<Item = &str> {
        self.completed.iter().map(String::as_str)
    }

    /// Number of completed objectives.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    /// Whether `reference` has been completed.
    #[must_use]
    pub fn is_objective_complete(&self, reference: &str) -> bool {
        self.completed.contains(reference)
    }

    /// Every objective in the definition is complete.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.quest
            .objectives
            .iter()
            .all(|o| self.completed.contains(&o.reference))
    }

    /// Mark `reference` complete. Returns whether it was newly completed.
    pub(crate) fn complete_objective(&mut self, reference: &str) -> Result<bool> {
        if !self.quest.has_objective(reference) {
            return Err(ProgressionError::UnknownObjective {
                quest: self.quest.name.clone(),
                objective: reference.to_string(),
            });
        }
        Ok(self.completed.insert(reference.to_string()))
    }
}
