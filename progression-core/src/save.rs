//! Capture/restore contract shared by every tracker.
//!
//! Snapshots are `serde_json::Value` trees. Shapes:
//!
//! ```text
//! vitality    { "health": 87.5 }
//! experience  { "points": 1200.0 }
//! traits      { "Strength": 3, "Dexterity": 1 }
//! quests      [ { "quest": "Kill10Rats", "completedObjectives": ["rats"] } ]
//! ```
//!
//! Moving snapshots to and from disk is the host's job.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ProgressionError, Result};

/// A component whose state can be captured and later restored.
pub trait Saveable {
    /// Key under which this component is stored in a whole-character save.
    const SAVE_KEY: &'static str;

    /// Capture the persistent part of this component's state.
    fn capture(&self) -> Value;

    /// Replace this component's persistent state with `state`.
    ///
    /// # Errors
    /// Returns [`ProgressionError::Snapshot`] when the snapshot cannot be
    /// applied. The component is left untouched in that case.
    fn restore(&mut self, state: &Value) -> Result<()>;

    /// Check that [`Saveable::restore`] would accept `state`, without
    /// touching any component. Components whose restore never fails keep
    /// the default.
    ///
    /// # Errors
    /// Returns the error `restore` would return.
    fn validate(state: &Value) -> Result<()> {
        let _ = state;
        Ok(())
    }
}

/// Serialize a snapshot struct into a JSON tree.
pub(crate) fn to_value<T: Serialize>(snapshot: &T) -> Value {
    // Snapshot structs only hold strings, numbers, and maps keyed by strings,
    // none of which can fail to serialize.
    serde_json::to_value(snapshot).unwrap_or(Value::Null)
}

/// Deserialize a snapshot struct, naming the component in the error.
pub(crate) fn from_value<T: DeserializeOwned>(component: &str, state: &Value) -> Result<T> {
    T::deserialize(state).map_err(|e| ProgressionError::Snapshot(format!("{component}: {e}")))
}
