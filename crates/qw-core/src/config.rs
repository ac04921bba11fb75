//! Game configuration and ability scores.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dice::Die;

/// One of the three ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stat {
    /// Strength and endurance.
    Might,
    /// Agility and precision.
    Finesse,
    /// Perception and cunning.
    Wits,
}

impl Stat {
    /// Every stat, in display order.
    pub const ALL: [Stat; 3] = [Stat::Might, Stat::Finesse, Stat::Wits];

    /// Parse a stat name (case-insensitive).
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.name().eq_ignore_ascii_case(name.trim()))
    }

    /// The lowercase name used in content.
    pub fn name(self) -> &'static str {
        match self {
            Self::Might => "might",
            Self::Finesse => "finesse",
            Self::Wits => "wits",
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A full set of ability scores. Omitted scores default to 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    /// Might score.
    pub might: i64,
    /// Finesse score.
    pub finesse: i64,
    /// Wits score.
    pub wits: i64,
}

impl Default for Stats {
    fn default() -> Self {
        Self::uniform(1)
    }
}

impl Stats {
    /// All three scores set to `value`.
    pub fn uniform(value: i64) -> Self {
        Self {
            might: value,
            finesse: value,
            wits: value,
        }
    }

    /// Read one score.
    pub fn get(&self, stat: Stat) -> i64 {
        match stat {
            Stat::Might => self.might,
            Stat::Finesse => self.finesse,
            Stat::Wits => self.wits,
        }
    }

    /// Mutable access to one score.
    pub fn get_mut(&mut self, stat: Stat) -> &mut i64 {
        match stat {
            Stat::Might => &mut self.might,
            Stat::Finesse => &mut self.finesse,
            Stat::Wits => &mut self.wits,
        }
    }
}

/// The `config` section of a content bundle.
///
/// Every field has a default, so `"config": {}` is a valid (if bland) game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameConfig {
    /// Ability scores of a freshly created character.
    pub starting_stats: Stats,
    /// Completed steps between stat point awards (0 disables awards).
    pub stats_increase_every: u32,
    /// Stat points awarded each time.
    pub stat_increase_amount: u32,
    /// Score contributed by each held preferred tag.
    pub preferred_tag_weight: i64,
    /// Unspent stat points at character creation.
    pub starting_points: u32,
    /// Per-tag stat deltas: `{ "blessed": { "wits": 1 } }` adds one wits per
    /// held `blessed`.
    pub stat_modifiers: BTreeMap<String, BTreeMap<String, i64>>,
    /// Die rolled for skill checks.
    pub check_die: Die,
    /// Skill-check bonus per held copy of a tag named as a skill source.
    pub tag_bonus: i64,
    /// Per-tag overrides of `preferred_tag_weight`.
    pub tag_weights: BTreeMap<String, i64>,
    /// Tags whose comparison suffixes are honored. `None` honors all of them;
    /// stats always honor comparisons.
    pub comparable_tags: Option<Vec<String>>,
    /// Experience gained per executed step.
    pub experience_per_step: u32,
    /// Where a new session begins. Defaults to the first step's id.
    pub start_location: Option<String>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_stats: Stats::default(),
            stats_increase_every: 10,
            stat_increase_amount: 1,
            preferred_tag_weight: 1,
            starting_points: 0,
            stat_modifiers: BTreeMap::new(),
            check_die: Die::D20,
            tag_bonus: 2,
            tag_weights: BTreeMap::new(),
            comparable_tags: None,
            experience_per_step: 1,
            start_location: None,
        }
    }
}

impl GameConfig {
    /// Score weight of one preferred occurrence of `tag`.
    pub fn weight_for(&self, tag: &str) -> i64 {
        self.tag_weights
            .get(tag)
            .copied()
            .unwrap_or(self.preferred_tag_weight)
    }

    /// Whether comparison suffixes on `name` are honored.
    pub fn compares(&self, name: &str) -> bool {
        Stat::parse(name).is_some()
            || self
                .comparable_tags
                .as_ref()
                .is_none_or(|tags| tags.iter().any(|t| t == name))
    }

    /// Stat deltas granted per held copy of `tag`, skipping unknown stat names.
    pub fn modifiers_for(&self, tag: &str) -> impl Iterator<Item = (Stat, i64)> + '_ {
        self.stat_modifiers
            .get(tag)
            .into_iter()
            .flatten()
            .filter_map(|(stat, delta)| Stat::parse(stat).map(|s| (s, *delta)))
    }
}
