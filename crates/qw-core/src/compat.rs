//! Static tag-compatibility between steps.
//!
//! [`are_compatible`] decides whether a transition from one step to another
//! could ever fire, without knowing any particular player's tags. It reports
//! a conflict only on a proven contradiction:
//!
//! 1. the source grants a tag the target blocks;
//! 2. the source consumes a tag the target requires;
//! 3. the source blocks a tag the target requires, unless it also grants it;
//! 4. the source requires a tag the target blocks, unless it also consumes it.
//!
//! Only plain required/blocked tags take part. A comparison (`@gold>2`)
//! proves nothing about presence without a concrete count, so those tags are
//! left out of both sides.
//!
//! Mutations that only happen sometimes (those of a gated patch) are kept
//! apart as conditional: they can satisfy the "unless" clauses of rules 3
//! and 4 but never prove a conflict themselves.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::step::Step;
use crate::tag::{Tag, TagOp, parse_tags};

/// The base names a step requires, blocks, grants, and consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagProfile {
    /// Plain `@` names.
    pub required: BTreeSet<String>,
    /// Plain `!` names.
    pub blocked: BTreeSet<String>,
    /// `+` names.
    pub grants: BTreeSet<String>,
    /// `-` names.
    pub consumes: BTreeSet<String>,
    /// `+` names applied only on some visits.
    pub maybe_grants: BTreeSet<String>,
    /// `-` names applied only on some visits.
    pub maybe_consumes: BTreeSet<String>,
}

impl TagProfile {
    /// Classify parsed tags.
    pub fn from_tags<'a>(tags: impl IntoIterator<Item = &'a Tag>) -> Self {
        let mut profile = Self::default();
        for tag in tags {
            profile.insert(tag);
        }
        profile
    }

    /// Classify raw tag strings.
    pub fn from_raw<S: AsRef<str>>(raw: &[S]) -> Self {
        Self::from_tags(&parse_tags(raw))
    }

    /// The profile of a step.
    pub fn of_step(step: &Step) -> Self {
        Self::from_raw(&step.tags)
    }

    /// Fold in the mutations of an option taken on the way out.
    pub fn with_mutations<S: AsRef<str>>(mut self, raw: &[S]) -> Self {
        for tag in parse_tags(raw).iter().filter(|t| t.op.is_mutation()) {
            self.insert(tag);
        }
        self
    }

    /// Fold in every tag of something applied on top of the step, such as a
    /// patch known to be active.
    pub fn with_tags<S: AsRef<str>>(mut self, raw: &[S]) -> Self {
        for tag in &parse_tags(raw) {
            self.insert(tag);
        }
        self
    }

    /// Fold in mutations that may or may not happen on the way out.
    pub fn with_conditional<S: AsRef<str>>(mut self, raw: &[S]) -> Self {
        for tag in parse_tags(raw) {
            match tag.op {
                TagOp::Grant => self.maybe_grants.insert(tag.name),
                TagOp::Consume => self.maybe_consumes.insert(tag.name),
                _ => continue,
            };
        }
        self
    }

    fn insert(&mut self, tag: &Tag) {
        let set = match (tag.op, tag.comparison) {
            (TagOp::Required, None) => &mut self.required,
            (TagOp::Blocked, None) => &mut self.blocked,
            (TagOp::Grant, _) => &mut self.grants,
            (TagOp::Consume, _) => &mut self.consumes,
            _ => return,
        };
        set.insert(tag.name.clone());
    }
}

/// Which of the four rules a conflict breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictRule {
    /// Source grants what the target blocks.
    GrantBlocked,
    /// Source consumes what the target requires.
    ConsumeRequired,
    /// Source blocks (without granting) what the target requires.
    BlockRequired,
    /// Source requires (without consuming) what the target blocks.
    RequireBlocked,
}

/// A proven contradiction between two steps.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Conflict {
    /// The rule broken.
    pub rule: ConflictRule,
    /// The base tag name involved.
    pub tag: String,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = &self.tag;
        match self.rule {
            ConflictRule::GrantBlocked => write!(f, "source grants '{tag}', target blocks it"),
            ConflictRule::ConsumeRequired => {
                write!(f, "source consumes '{tag}', target requires it")
            }
            ConflictRule::BlockRequired => write!(f, "source blocks '{tag}', target requires it"),
            ConflictRule::RequireBlocked => {
                write!(f, "source requires '{tag}', target blocks it")
            }
        }
    }
}

/// Every conflict between a source and a target profile, rule by rule.
pub fn conflicts(source: &TagProfile, target: &TagProfile) -> Vec<Conflict> {
    let mut found = Vec::new();
    let mut push = |rule, names: Vec<&String>| {
        found.extend(names.into_iter().map(|tag| Conflict {
            rule,
            tag: tag.clone(),
        }));
    };

    push(
        ConflictRule::GrantBlocked,
        source.grants.intersection(&target.blocked).collect(),
    );
    push(
        ConflictRule::ConsumeRequired,
        source.consumes.intersection(&target.required).collect(),
    );
    push(
        ConflictRule::BlockRequired,
        source
            .blocked
            .intersection(&target.required)
            .filter(|t| !source.grants.contains(*t) && !source.maybe_grants.contains(*t))
            .collect(),
    );
    push(
        ConflictRule::RequireBlocked,
        source
            .required
            .intersection(&target.blocked)
            .filter(|t| !source.consumes.contains(*t) && !source.maybe_consumes.contains(*t))
            .collect(),
    );

    found
}

/// The first conflict between two profiles, if any.
pub fn find_conflict(source: &TagProfile, target: &TagProfile) -> Option<Conflict> {
    conflicts(source, target).into_iter().next()
}

/// Whether a transition from `source` to `target` could ever fire.
pub fn are_compatible(source: &Step, target: &Step) -> bool {
    find_conflict(&TagProfile::of_step(source), &TagProfile::of_step(target)).is_none()
}
