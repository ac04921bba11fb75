//! The check die.
//!
//! Skill checks roll a single die whose range is set by the game config
//! (`"checkDie": "d20"`). Any die with two or more sides is accepted.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A die in `dN` notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Die {
    sides: u32,
}

impl Die {
    /// The default check die.
    pub const D20: Self = Self { sides: 20 };

    /// A die with `sides` faces, or `None` below two.
    pub fn new(sides: u32) -> Option<Self> {
        (sides >= 2).then_some(Self { sides })
    }

    /// Highest face; rolls land in `1..=sides`.
    pub fn sides(self) -> u32 {
        self.sides
    }
}

impl Default for Die {
    fn default() -> Self {
        Self::D20
    }
}

impl FromStr for Die {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        trimmed
            .strip_prefix(['d', 'D'])
            .and_then(|n| n.parse::<u32>().ok())
            .and_then(Self::new)
            .ok_or_else(|| format!("invalid die: \"{trimmed}\""))
    }
}

impl TryFrom<String> for Die {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Die> for String {
    fn from(die: Die) -> Self {
        die.to_string()
    }
}

impl fmt::Display for Die {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.sides)
    }
}
