//! Skill-check resolution.

use std::fmt;

use serde::Serialize;

use qw_core::{Die, GameConfig, Stat, TagState};

use crate::player::PlayerState;
use crate::random::RandomSource;

/// Where a bonus came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BonusKind {
    /// An ability score's effective value.
    Stat {
        /// The stat read.
        stat: Stat,
    },
    /// Held copies of a tag times the per-tag bonus.
    Tag {
        /// Copies held.
        count: u32,
    },
}

/// One skill source's contribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bonus {
    /// The source name as authored.
    pub source: String,
    /// How it was resolved.
    pub kind: BonusKind,
    /// Amount added to the roll.
    pub value: i64,
}

/// The full breakdown of a resolved check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    /// Die rolled.
    pub die: Die,
    /// The face rolled.
    pub roll: u32,
    /// Per-source bonuses, in source order.
    pub bonuses: Vec<Bonus>,
    /// Sum of every bonus.
    pub total_bonus: i64,
    /// `roll + total_bonus`.
    pub total: i64,
    /// Difficulty class.
    pub dc: i64,
    /// `total >= dc`.
    pub success: bool,
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rolled {}", self.die, self.roll)?;
        for bonus in &self.bonuses {
            write!(f, " {:+} ({})", bonus.value, bonus.source)?;
        }
        let verdict = if self.success { "success" } else { "failure" };
        write!(f, " = {} vs DC {}: {verdict}", self.total, self.dc)
    }
}

/// Roll the configured die and add every source's bonus.
///
/// A source naming a stat adds that stat's effective value; any other source
/// is a tag and adds `count × tag_bonus`.
pub fn resolve_check<R: RandomSource + ?Sized>(
    sources: &[&str],
    dc: i64,
    player: &PlayerState,
    config: &GameConfig,
    rng: &mut R,
) -> CheckOutcome {
    let bonuses: Vec<Bonus> = sources
        .iter()
        .map(|&source| match Stat::parse(source) {
            Some(stat) => Bonus {
                source: source.to_string(),
                kind: BonusKind::Stat { stat },
                value: player.effective_stat(stat, config),
            },
            None => {
                let count = player.tags.count(source);
                Bonus {
                    source: source.to_string(),
                    kind: BonusKind::Tag { count },
                    value: i64::from(count) * config.tag_bonus,
                }
            }
        })
        .collect();

    let die = config.check_die;
    let roll = rng.roll_die(die.sides());
    let total_bonus: i64 = bonuses.iter().map(|b| b.value).sum();
    let total = i64::from(roll) + total_bonus;
    let outcome = CheckOutcome {
        die,
        roll,
        bonuses,
        total_bonus,
        total,
        dc,
        success: total >= dc,
    };
    tracing::debug!(%outcome, "resolved skill check");
    outcome
}
