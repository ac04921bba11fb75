//! Player state management.

use serde::{Deserialize, Serialize};

use qw_core::{GameConfig, Stat, Stats, TagBag, TagState};

use crate::error::{EngineError, EngineResult};

/// The player's state across a playthrough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Base ability scores.
    pub stats: Stats,
    /// Stat points not yet allocated.
    pub unspent_points: u32,
    /// Steps executed so far.
    pub steps_completed: u32,
    /// Experience earned.
    pub experience: u32,
    /// Held tags; counts matter.
    pub tags: TagBag,
}

impl PlayerState {
    /// A freshly created character.
    pub fn new(config: &GameConfig) -> Self {
        Self {
            stats: config.starting_stats,
            unspent_points: config.starting_points,
            steps_completed: 0,
            experience: 0,
            tags: TagBag::new(),
        }
    }

    /// Builder: add one copy of each listed tag.
    pub fn with_tags<S: Into<String>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        for tag in tags {
            self.tags.add(tag);
        }
        self
    }

    /// Builder: set a base stat.
    pub fn with_stat(mut self, stat: Stat, value: i64) -> Self {
        *self.stats.get_mut(stat) = value;
        self
    }

    /// A stat's base value plus the modifiers of every held tag.
    pub fn effective_stat(&self, stat: Stat, config: &GameConfig) -> i64 {
        let modifiers: i64 = self
            .tags
            .iter()
            .flat_map(|(tag, count)| {
                config
                    .modifiers_for(tag)
                    .filter(move |(s, _)| *s == stat)
                    .map(move |(_, delta)| delta * i64::from(count))
            })
            .sum();
        self.stats.get(stat) + modifiers
    }

    /// Spend unspent points on a stat.
    pub fn allocate(&mut self, stat: Stat, points: u32) -> EngineResult<()> {
        if points > self.unspent_points {
            return Err(EngineError::InsufficientPoints {
                requested: points,
                available: self.unspent_points,
            });
        }
        self.unspent_points -= points;
        *self.stats.get_mut(stat) += i64::from(points);
        Ok(())
    }

    /// Count one executed step. Returns the stat points it awarded.
    pub fn record_step(&mut self, config: &GameConfig) -> u32 {
        self.steps_completed += 1;
        self.experience += config.experience_per_step;
        let every = config.stats_increase_every;
        if every > 0 && self.steps_completed % every == 0 {
            self.unspent_points += config.stat_increase_amount;
            config.stat_increase_amount
        } else {
            0
        }
    }

    /// Start over as a fresh character.
    pub fn reset(&mut self, config: &GameConfig) {
        *self = Self::new(config);
    }

    /// Evaluate tags against this player under `config`'s rules.
    pub fn view<'a>(&'a self, config: &'a GameConfig) -> StateView<'a> {
        StateView {
            player: self,
            config,
        }
    }
}

/// A player's tags and stats as seen by tag conditions.
///
/// Comparisons on stat names read the effective stat; comparisons on other
/// names read the held count, unless the config's comparison policy excludes
/// the name.
#[derive(Debug, Clone, Copy)]
pub struct StateView<'a> {
    player: &'a PlayerState,
    config: &'a GameConfig,
}

impl TagState for StateView<'_> {
    fn count(&self, name: &str) -> u32 {
        self.player.tags.count(name)
    }

    fn compared_value(&self, name: &str) -> Option<i64> {
        if let Some(stat) = Stat::parse(name) {
            return Some(self.player.effective_stat(stat, self.config));
        }
        self.config
            .compares(name)
            .then(|| i64::from(self.count(name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qw_core::Tag;

    #[test]
    fn player_state_new() {
        let mut config = GameConfig::default();
        config.starting_points = 3;
        let state = PlayerState::new(&config);

        assert_eq!(state.stats, Stats::uniform(1));
        assert_eq!(state.unspent_points, 3);
        assert_eq!(state.steps_completed, 0);
        assert!(state.tags.is_empty());
    }

    #[test]
    fn allocate_points() {
        let mut config = GameConfig::default();
        config.starting_points = 2;
        let mut state = PlayerState::new(&config);

        state.allocate(Stat::Might, 2).unwrap();
        assert_eq!(state.stats.might, 3);
        assert_eq!(state.unspent_points, 0);

        let err = state.allocate(Stat::Wits, 1).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InsufficientPoints {
                requested: 1,
                available: 0
            }
        ));
    }

    #[test]
    fn stat_points_every_n_steps() {
        let mut config = GameConfig::default();
        config.stats_increase_every = 2;
        config.stat_increase_amount = 3;
        let mut state = PlayerState::new(&config);

        assert_eq!(state.record_step(&config), 0);
        assert_eq!(state.record_step(&config), 3);
        assert_eq!(state.unspent_points, 3);
        assert_eq!(state.steps_completed, 2);
        assert_eq!(state.experience, 2);
    }

    #[test]
    fn tag_modifiers_raise_stats() {
        let config: GameConfig =
            serde_json::from_str(r#"{ "statModifiers": { "blessed": { "wits": 2 } } }"#).unwrap();
        let state = PlayerState::new(&config).with_tags(["blessed", "blessed"]);
        assert_eq!(state.effective_stat(Stat::Wits, &config), 5);
        assert_eq!(state.effective_stat(Stat::Might, &config), 1);
    }

    #[test]
    fn view_compares_stats_and_counts() {
        let mut config = GameConfig::default();
        let state = PlayerState::new(&config)
            .with_stat(Stat::Might, 4)
            .with_tags(["gold", "gold"]);

        let view = state.view(&config);
        assert!(Tag::parse("@might>3").is_met(&view));
        assert!(!Tag::parse("@might<3").is_met(&view));
        assert!(Tag::parse("@gold=2").is_met(&view));

        config.comparable_tags = Some(Vec::new());
        let view = state.view(&config);
        // gold comparisons degrade to presence
        assert!(Tag::parse("@gold=7").is_met(&view));
        assert!(Tag::parse("@might>3").is_met(&view));
    }

    #[test]
    fn reset_restores_fresh_character() {
        let config = GameConfig::default();
        let mut state = PlayerState::new(&config).with_tags(["x"]);
        state.record_step(&config);
        state.reset(&config);
        assert_eq!(state, PlayerState::new(&config));
    }
}
