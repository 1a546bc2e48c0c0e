//! Configuration for the progression system.
//!
//! Loadable from TOML. Example:
//!
//! ```toml
//! [general]
//! log_level = "debug"
//! log_json = false
//!
//! [vitality]
//! regeneration_percentage = 70.0
//!
//! [[traits.bonuses]]
//! trait = "Strength"
//! stat = "Damage"
//! additive_per_point = 2.0
//! percentage_per_point = 1.5
//!
//! [quests]
//! sweep_interval_ticks = 1
//!
//! [[quests.definitions]]
//! name = "Kill10Rats"
//! objectives = [{ reference = "rats", description = "Kill ten rats" }]
//! rewards = [{ item = "rat-tail", count = 10 }]
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{ProgressionError, Result};
use crate::quest::Quest;
use crate::types::{Stat, Trait};

/// Top-level progression configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgressionConfig {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Health behaviour.
    #[serde(default)]
    pub vitality: VitalityConfig,
    /// Trait bonus table.
    #[serde(default)]
    pub traits: TraitConfig,
    /// Quest catalog and sweep cadence.
    #[serde(default)]
    pub quests: QuestConfig,
}

impl ProgressionConfig {
    /// Load and validate configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `ProgressionError::Config` if the TOML is invalid, names an
    /// unknown trait or stat, or fails [`ProgressionConfig::validate`].
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| ProgressionError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Check cross-field constraints serde cannot express.
    ///
    /// # Errors
    /// Returns `ProgressionError::Config` describing the first violation.
    pub fn validate(&self) -> Result<()> {
        let regen = self.vitality.regeneration_percentage;
        if !(0.0..=100.0).contains(&regen) {
            return Err(ProgressionError::Config(format!(
                "vitality.regeneration_percentage must be within 0..=100, got {regen}"
            )));
        }
        if self.quests.sweep_interval_ticks == 0 {
            return Err(ProgressionError::Config(
                "quests.sweep_interval_ticks must be at least 1".to_string(),
            ));
        }

        let mut names = HashSet::new();
        for quest in &self.quests.definitions {
            if quest.name.trim().is_empty() {
                return Err(ProgressionError::Config("quest with empty name".to_string()));
            }
            if !names.insert(quest.name.as_str()) {
                return Err(ProgressionError::Config(format!(
                    "duplicate quest `{}`",
                    quest.name
                )));
            }
            let mut references = HashSet::new();
            for objective in &quest.objectives {
                if objective.reference.trim().is_empty() {
                    return Err(ProgressionError::Config(format!(
                        "quest `{}` has an objective with an empty reference",
                        quest.name
                    )));
                }
                if !references.insert(objective.reference.as_str()) {
                    return Err(ProgressionError::Config(format!(
                        "quest `{}` defines objective `{}` twice",
                        quest.name, objective.reference
                    )));
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// General system settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Emit one JSON object per log line instead of human-readable text.
    #[serde(default)]
    pub log_json: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

/// Health behaviour.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VitalityConfig {
    /// Health restored on level up, as a percentage of max health.
    #[serde(default = "default_regeneration")]
    pub regeneration_percentage: f32,
}

impl Default for VitalityConfig {
    fn default() -> Self {
        Self {
            regeneration_percentage: 70.0,
        }
    }
}

/// Static trait → stat bonus configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraitConfig {
    /// Per-point bonuses. A later entry for the same (trait, stat) pair
    /// overrides an earlier one.
    #[serde(default)]
    pub bonuses: Vec<TraitBonus>,
}

/// Bonus granted to one stat per point invested in one trait.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraitBonus {
    /// Trait that grants the bonus.
    #[serde(rename = "trait")]
    pub trait_: Trait,
    /// Stat receiving the bonus.
    pub stat: Stat,
    /// Flat bonus per committed point.
    #[serde(default)]
    pub additive_per_point: f32,
    /// Percentage bonus per committed point.
    #[serde(default)]
    pub percentage_per_point: f32,
}

impl TraitBonus {
    /// Convenience constructor.
    #[must_use]
    pub fn new(trait_: Trait, stat: Stat, additive_per_point: f32, percentage_per_point: f32) -> Self {
        Self {
            trait_,
            stat,
            additive_per_point,
            percentage_per_point,
        }
    }
}

/// Quest catalog and sweep cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestConfig {
    /// Run the predicate sweep every N host ticks.
    #[serde(default = "default_1_u32")]
    pub sweep_interval_ticks: u32,
    /// Every quest the game knows about.
    #[serde(default)]
    pub definitions: Vec<Quest>,
}

impl Default for QuestConfig {
    fn default() -> Self {
        Self {
            sweep_interval_ticks: 1,
            definitions: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_log_level() -> String { "info".to_string() }
fn default_regeneration() -> f32 { 70.0 }
fn default_1_u32() -> u32 { 1 }
