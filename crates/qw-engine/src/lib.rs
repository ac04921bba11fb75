//! Narrative state engine for Questweave.
//!
//! Given a player's tags and a location, the engine picks the next step
//! ([`select_step`]), layers applicable patches onto it ([`apply_patches`]),
//! resolves skill checks ([`resolve_check`]), and mutates player state
//! ([`apply_mutations`]). [`Session`] threads all of it through a playthrough.
//!
//! Every random draw goes through a [`RandomSource`], so a seeded
//! [`rand::rngs::StdRng`] or a [`ScriptedSource`] makes runs reproducible.

/// Skill-check resolution.
pub mod check;
/// Error types for the engine.
pub mod error;
/// Grant/consume application.
pub mod mutation;
/// Patch composition.
pub mod patch;
/// Player state and its tag view.
pub mod player;
/// Injectable randomness.
pub mod random;
/// Step selection.
pub mod select;
/// Playthrough state and turn handling.
pub mod session;
/// Quest variables and text interpolation.
pub mod vars;

pub use check::{Bonus, BonusKind, CheckOutcome, resolve_check};
pub use error::{EngineError, EngineResult};
pub use mutation::{Mutation, apply_mutations};
pub use patch::{applicable_patches, apply_patches};
pub use player::{PlayerState, StateView};
pub use random::{RandomSource, ScriptedSource};
pub use select::{Selection, eligible_steps, score_step, select_step};
pub use session::{AvailableOption, ChoiceResult, Scene, Session, SessionConfig, SessionSnapshot};
pub use vars::{Interpolated, QuestVars, interpolate, placeholders};
