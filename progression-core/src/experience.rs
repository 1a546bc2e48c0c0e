//! Experience ledger: accumulated experience points.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::collaborators::ExperienceSink;
use crate::error::Result;
use crate::events::{ExperienceEvent, Notifier, Subscription};
use crate::save::{self, Saveable};

/// Persisted form of an [`ExperienceLedger`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExperienceSnapshot {
    /// Total experience points.
    pub points: f32,
}

/// Running total of a character's experience.
#[derive(Debug, Default)]
pub struct ExperienceLedger {
    points: f32,
    gained: Notifier<ExperienceEvent>,
}

impl ExperienceLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ledger that already holds `points`.
    #[must_use]
    pub fn with_points(points: f32) -> Self {
        Self {
            points,
            gained: Notifier::new(),
        }
    }

    /// Add experience and notify listeners. Fires once per call.
    pub fn gain_experience(&mut self, amount: f32) {
        self.points += amount;
        debug!(amount, total = self.points, "Experience gained");
        self.gained.emit(&ExperienceEvent::Gained {
            amount,
            total: self.points,
        });
    }

    /// Total experience points.
    #[must_use]
    pub fn points(&self) -> f32 {
        self.points
    }

    /// Listen for [`ExperienceEvent`]s.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ExperienceEvent) + Send + Sync + 'static,
    {
        self.gained.subscribe(listener)
    }
}

impl ExperienceSink for ExperienceLedger {
    fn gain_experience(&mut self, amount: f32) {
        ExperienceLedger::gain_experience(self, amount);
    }
}

impl Saveable for ExperienceLedger {
    const SAVE_KEY: &'static str = "experience";

    fn capture(&self) -> Value {
        save::to_value(&ExperienceSnapshot { points: self.points })
    }

    fn validate(state: &Value) -> Result<()> {
        save::from_value::<ExperienceSnapshot>(Self::SAVE_KEY, state).map(|_| ())
    }

    fn restore(&mut self, state: &Value) -> Result<()> {
        let snapshot: ExperienceSnapshot = save::from_value(Self::SAVE_KEY, state)?;
        self.points = snapshot.points;
        Ok(())
    }
}
