//! Error types for the progression core library.

use thiserror::Error;

/// Top-level error type for all progression operations.
#[derive(Error, Debug)]
pub enum ProgressionError {
    /// A quest was referenced that the tracker (or catalog) does not know.
    #[error("Unknown quest: {0}")]
    UnknownQuest(String),

    /// An objective id was referenced that the quest does not define.
    #[error("Quest {quest} has no objective {objective}")]
    UnknownObjective {
        /// Quest the lookup was made against.
        quest: String,
        /// The offending objective reference.
        objective: String,
    },

    /// A trait name did not parse into a known [`crate::Trait`].
    #[error("Unrecognized trait: {0}")]
    UnrecognizedTrait(String),

    /// A predicate parameter was present but could not be interpreted.
    #[error("Invalid parameter for predicate {predicate}: {reason}")]
    InvalidPredicateParameter {
        /// Predicate name.
        predicate: String,
        /// Why the parameter was rejected.
        reason: String,
    },

    /// A predicate was evaluated with fewer parameters than it needs.
    #[error("Predicate {predicate} is missing parameter #{index}")]
    MissingPredicateParameter {
        /// Predicate name.
        predicate: String,
        /// Zero-based index of the missing parameter.
        index: usize,
    },

    /// A snapshot could not be captured or restored.
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, ProgressionError>;
