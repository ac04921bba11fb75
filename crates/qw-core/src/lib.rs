//! Core types for Questweave: tags, steps, patches, and the content bundle.
//!
//! This crate defines the read-only content model that the engine, the lint
//! tool, and the graph tool share. It also owns the two pieces of tag logic
//! every consumer must agree on: tag parsing ([`Tag::parse`]) and the static
//! transition check ([`are_compatible`]).

/// Static tag-compatibility analysis between steps.
pub mod compat;
/// Loaded content bundle and its load-time checks.
pub mod content;
/// The die rolled by skill checks.
pub mod dice;
/// Error types used throughout the crate.
pub mod error;
/// Game configuration and ability scores.
pub mod config;
/// Step/option transition graph and reachability.
pub mod graph;
/// Coordinate vs. virtual location ids.
pub mod location;
/// Option records, shorthands, and preset expansion.
pub mod options;
/// Conditional partial overrides of steps.
pub mod patch;
/// Steps: the atomic unit of narrative content.
pub mod step;
/// Tag parsing, evaluation, and the held-tag multiset.
pub mod tag;

pub use compat::{Conflict, ConflictRule, TagProfile, are_compatible};
pub use config::{GameConfig, Stat, Stats};
pub use content::{Content, ContentWarning};
pub use dice::Die;
pub use error::{ContentError, CoreResult};
pub use graph::{Edge, EdgeKind, Node, StepGraph};
pub use location::{is_coordinate, is_virtual};
pub use options::{ChoiceOption, OptionEntry, SkillSource, StepOptions};
pub use patch::{PATCH_MARKER, Patch};
pub use step::{Step, VarDefs};
pub use tag::{Comparison, Tag, TagBag, TagOp, TagState};
