//! # progression-host: Host Integration for Progression Core
//!
//! This crate provides the integration layer between the game-agnostic
//! `progression-core` trackers and a game loop.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │               Game loop                 │
//! │  ┌───────────────────────────────────┐  │
//! │  │       progression-host            │  │
//! │  │  ┌─────────────┐ ┌─────────────┐  │  │
//! │  │  │ Characters  │ │ World tick  │  │  │
//! │  │  └──────┬──────┘ └──────┬──────┘  │  │
//! │  │         │               │         │  │
//! │  │         ▼               ▼         │  │
//! │  │    ┌─────────────────────────┐    │  │
//! │  │    │    progression-core     │    │  │
//! │  │    └─────────────────────────┘    │  │
//! │  └───────────────────────────────────┘  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `components`: `Character` entities and the collaborator bundle
//! - `events`: Game events that mutate trackers
//! - `systems`: `World` registry and the per-tick system
//! - `save`: Whole-character save documents
//! - `logging`: Tracing subscriber setup

pub mod components;
pub mod error;
pub mod events;
pub mod logging;
pub mod save;
pub mod systems;

pub use components::{Character, Collaborators, EntityId};
pub use error::HostError;
pub use events::GameEvent;
pub use logging::init_tracing;
pub use save::CharacterSave;
pub use systems::{TickReport, World};
