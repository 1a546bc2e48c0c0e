//! Core type definitions for the progression system.
//!
//! [`Trait`] and [`Stat`] are closed sets. Anything that arrives as a string
//! (predicate parameters, persisted trait names, configuration) goes through
//! [`Trait::parse`] / [`Stat::parse`], which report an unrecognised name
//! explicitly instead of guessing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ProgressionError, Result};

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// A category of investable character points.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Trait {
    /// Raw physical power.
    Strength,
    /// Agility and precision.
    Dexterity,
    /// Toughness and endurance.
    Constitution,
    /// Reasoning and arcane aptitude.
    Intelligence,
    /// Force of personality.
    Charisma,
}

impl Trait {
    /// Parse a trait name, ignoring ASCII case.
    ///
    /// # Errors
    /// Returns [`ProgressionError::UnrecognizedTrait`] for names outside the set.
    pub fn parse(name: &str) -> Result<Self> {
        Self::from_str(name.trim()).map_err(|_| ProgressionError::UnrecognizedTrait(name.to_string()))
    }

    /// Iterate every trait in declaration order.
    pub fn all() -> impl Iterator<Item = Self> {
        <Self as strum::IntoEnumIterator>::iter()
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// A derived character attribute computed by the host's stat engine.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Stat {
    /// Maximum health.
    Health,
    /// Experience granted to whoever kills this character.
    ExperienceReward,
    /// Experience needed to reach the next level.
    ExperienceToLevelUp,
    /// Outgoing damage.
    Damage,
    /// Maximum mana.
    Mana,
    /// Mana regenerated per second.
    ManaRegenRate,
    /// Trait points the character may allocate in total.
    TotalTraitPoints,
    /// Discount applied when buying from shops, in percent.
    BuyingDiscountPercentage,
}

impl Stat {
    /// Parse a stat name, ignoring ASCII case.
    ///
    /// # Errors
    /// Returns [`ProgressionError::Config`] for names outside the set.
    pub fn parse(name: &str) -> Result<Self> {
        Self::from_str(name.trim()).map_err(|_| ProgressionError::Config(format!("unknown stat `{name}`")))
    }

    /// Iterate every stat in declaration order.
    pub fn all() -> impl Iterator<Item = Self> {
        <Self as strum::IntoEnumIterator>::iter()
    }
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// Identifier of an inventory item definition, as understood by the host's
/// inventory system.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    /// Create an item id from anything string-like.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trait_parse_ignores_case() {
        assert_eq!(Trait::parse("strength").expect("parse"), Trait::Strength);
        assert_eq!(Trait::parse("CHARISMA").expect("parse"), Trait::Charisma);
        assert_eq!(Trait::parse(" Dexterity ").expect("parse"), Trait::Dexterity);
    }

    #[test]
    fn trait_parse_rejects_unknown() {
        let err = Trait::parse("Luck").expect_err("Luck is not a trait");
        assert!(matches!(err, ProgressionError::UnrecognizedTrait(name) if name == "Luck"));
    }

    #[test]
    fn display_round_trips_through_parse() {
        for t in Trait::all() {
            assert_eq!(Trait::parse(&t.to_string()).expect("parse"), t);
        }
        for s in Stat::all() {
            assert_eq!(Stat::parse(s.as_ref()).expect("parse"), s);
        }
    }
}
