//! Error types for the engine.

use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur while playing.
///
/// An empty selection is not an error: [`crate::select_step`] and
/// [`crate::Session::enter`] return `None` for it.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The content names no start location.
    #[error("content has no start location")]
    NoStartLocation,

    /// A choice was made with no step on screen.
    #[error("no current step")]
    NoCurrentStep,

    /// The option index does not exist on the current step.
    #[error("invalid choice: {0}")]
    InvalidChoice(usize),

    /// The option's tag gate does not hold.
    #[error("option unavailable: {0}")]
    OptionUnavailable(String),

    /// Not enough unspent stat points.
    #[error("cannot spend {requested} points, {available} available")]
    InsufficientPoints {
        /// Points asked for.
        requested: u32,
        /// Points unspent.
        available: u32,
    },

    /// A snapshot refers to a step the content does not have.
    #[error("snapshot does not match content: {0}")]
    InvalidSnapshot(String),
}
