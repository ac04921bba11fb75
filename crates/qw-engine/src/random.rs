//! Injectable randomness.
//!
//! The engine draws at exactly three points: the tie-break among top-scoring
//! steps, the skill-check die, and variable candidate selection. All three go
//! through [`RandomSource`].

use std::collections::VecDeque;

use rand::Rng;
use rand::rngs::StdRng;

/// A source of the engine's random draws.
pub trait RandomSource {
    /// A uniform index in `0..len`. `len` is never zero.
    fn pick_index(&mut self, len: usize) -> usize;

    /// A uniform roll in `1..=sides`.
    fn roll_die(&mut self, sides: u32) -> u32;
}

impl RandomSource for StdRng {
    fn pick_index(&mut self, len: usize) -> usize {
        self.random_range(0..len.max(1))
    }

    fn roll_die(&mut self, sides: u32) -> u32 {
        self.random_range(1..=sides.max(1))
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn pick_index(&mut self, len: usize) -> usize {
        (**self).pick_index(len)
    }

    fn roll_die(&mut self, sides: u32) -> u32 {
        (**self).roll_die(sides)
    }
}

/// Replays a fixed list of values, for forcing outcomes in tests and demos.
///
/// Die rolls are clamped into range; indices wrap modulo the choice count.
/// Once exhausted, rolls return 1 and picks return 0.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    values: VecDeque<u32>,
}

impl ScriptedSource {
    /// Script the given values, consumed front to back by every draw.
    pub fn new(values: impl IntoIterator<Item = u32>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    /// Values not yet consumed.
    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

impl RandomSource for ScriptedSource {
    fn pick_index(&mut self, len: usize) -> usize {
        self.values
            .pop_front()
            .map_or(0, |v| v as usize % len.max(1))
    }

    fn roll_die(&mut self, sides: u32) -> u32 {
        self.values
            .pop_front()
            .map_or(1, |v| v.clamp(1, sides.max(1)))
    }
}
