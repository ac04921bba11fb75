//! Step selection: filter, score, then pick among the best.

use qw_core::{Content, GameConfig, Step, TagOp, TagState};

use crate::patch::{applicable_patches, merge};
use crate::random::RandomSource;

/// The outcome of a successful selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// The effective step, with applicable patches merged.
    pub step: Step,
    /// Index of the base variant in [`Content::steps`].
    pub index: usize,
    /// The winning score.
    pub score: i64,
    /// How many variants passed the tag gates.
    pub eligible: usize,
    /// How many of them tied at the winning score.
    pub tied: usize,
    /// Display names of the patches merged in.
    pub patches: Vec<String>,
}

/// Variants at `location` whose `@`/`!` tags all hold, in authored order.
///
/// `location` may be a step id or a display name from the locations table.
pub fn eligible_steps<'a, S: TagState + ?Sized>(
    content: &'a Content,
    location: &str,
    state: &S,
) -> Vec<(usize, &'a Step)> {
    let id = content.resolve_location(location);
    content
        .steps
        .iter()
        .enumerate()
        .filter(|(_, step)| step.id == id && step.is_eligible(state))
        .collect()
}

/// Sum of the configured weight of every preferred tag occurrence the
/// player holds. A tag listed twice counts twice.
pub fn score_step<S: TagState + ?Sized>(step: &Step, state: &S, config: &GameConfig) -> i64 {
    step.tags_with(TagOp::Preferred)
        .iter()
        .filter(|t| state.count(&t.name) > 0)
        .map(|t| config.weight_for(&t.name))
        .sum()
}

/// Pick the step shown at `location` for `state`.
///
/// Returns `None` when no variant is eligible. Randomness is drawn only when
/// more than one variant ties at the top score.
pub fn select_step<S, R>(
    content: &Content,
    location: &str,
    state: &S,
    rng: &mut R,
) -> Option<Selection>
where
    S: TagState + ?Sized,
    R: RandomSource + ?Sized,
{
    let eligible = eligible_steps(content, location, state);
    if eligible.is_empty() {
        tracing::warn!(location, "no eligible step");
        return None;
    }

    let scored: Vec<(usize, &Step, i64)> = eligible
        .iter()
        .map(|&(index, step)| (index, step, score_step(step, state, &content.config)))
        .collect();
    let best = scored.iter().map(|(_, _, score)| *score).max()?;
    let top: Vec<&(usize, &Step, i64)> = scored.iter().filter(|(_, _, s)| *s == best).collect();

    let pick = if top.len() > 1 {
        rng.pick_index(top.len())
    } else {
        0
    };
    let &(index, base, score) = *top.get(pick)?;

    let patches = applicable_patches(base, content.patches_for(&base.id), state);
    let names = patches.iter().map(|p| p.display_name()).collect();
    let step = patches.into_iter().fold(base.clone(), merge);

    tracing::debug!(
        location,
        index,
        score,
        eligible = eligible.len(),
        tied = top.len(),
        "selected step"
    );
    Some(Selection {
        step,
        index,
        score,
        eligible: eligible.len(),
        tied: top.len(),
        patches: names,
    })
}
