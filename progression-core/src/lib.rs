//! # Progression Core Library
//!
//! Game-agnostic character progression state. Every character owns four
//! independent trackers:
//!
//! - **Vitality**: current health, damage, healing, death edges ([`VitalityTracker`])
//! - **Experience**: accumulated experience points ([`ExperienceLedger`])
//! - **Traits**: staged/committed trait points and stat bonuses ([`TraitAllocator`])
//! - **Quests**: quest progress and reward dispatch ([`QuestTracker`])
//!
//! Each tracker implements [`Saveable`] and round-trips through a
//! `serde_json::Value` snapshot. Systems this crate does not own (stat
//! engine, inventory, action scheduler) are reached through the narrow
//! traits in [`collaborators`]. Quest objectives complete automatically
//! through named predicates, see [`predicate`].
//!
//! ## Threading
//!
//! Trackers are plain `&mut self` state machines meant to be driven from a
//! single logic thread. A multi-threaded host wraps each tracker in its own
//! lock; see the `progression-host` crate.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod collaborators;
pub mod config;
pub mod error;
pub mod events;
pub mod experience;
pub mod predicate;
pub mod quest;
pub mod save;
pub mod traits;
pub mod types;
pub mod vitality;

pub use collaborators::{
    ActionCanceller, ExperienceSink, InventorySink, ItemDropper, ModifierProvider, StatSource,
    StatTable,
};
pub use config::ProgressionConfig;
pub use error::{ProgressionError, Result};
pub use events::{ExperienceEvent, Notifier, QuestEvent, Subscription, VitalityEvent};
pub use experience::ExperienceLedger;
pub use predicate::{Condition, EvaluatorChain, Predicate, PredicateEvaluator};
pub use quest::{Quest, QuestCatalog, QuestStatus, QuestTracker};
pub use save::Saveable;
pub use traits::TraitAllocator;
pub use types::{ItemId, Stat, Trait};
pub use vitality::VitalityTracker;
