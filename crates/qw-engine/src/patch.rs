//! Patch composition.
//!
//! Each applicable patch is one pure merge over the step built so far. The
//! base step from the content is never modified; every call returns a fresh
//! effective step.

use qw_core::tag::gate_passes;
use qw_core::{Patch, Step, TagState};

/// Patches that target `base` and whose gate holds, in order of appearance.
pub fn applicable_patches<'a, S: TagState + ?Sized>(
    base: &Step,
    patches: impl IntoIterator<Item = &'a Patch>,
    state: &S,
) -> Vec<&'a Patch> {
    patches
        .into_iter()
        .filter(|p| p.target == base.id && gate_passes(&p.gate(), state))
        .collect()
}

/// Layer one patch onto a step.
///
/// Tags are unioned (new ones appended). `replace` wins over
/// `prepend`/`append`. `log`, `options`, and `vars` replace the step's field
/// when set.
pub fn merge(mut step: Step, patch: &Patch) -> Step {
    for tag in &patch.tags {
        if !step.tags.contains(tag) {
            step.tags.push(tag.clone());
        }
    }

    if let Some(replace) = &patch.replace {
        step.text = replace.clone();
    } else if patch.prepend.is_some() || patch.append.is_some() {
        step.text = format!(
            "{}{}{}",
            patch.prepend.as_deref().unwrap_or_default(),
            step.text,
            patch.append.as_deref().unwrap_or_default()
        );
    }

    if let Some(log) = &patch.log {
        step.log = Some(log.clone());
    }
    if let Some(options) = &patch.options {
        step.options = Some(options.clone());
    }
    if let Some(vars) = &patch.vars {
        step.vars = vars.clone();
    }
    step
}

/// The effective step: `base` with every applicable patch merged in order.
pub fn apply_patches<'a, S: TagState + ?Sized>(
    base: &Step,
    patches: impl IntoIterator<Item = &'a Patch>,
    state: &S,
) -> Step {
    applicable_patches(base, patches, state)
        .into_iter()
        .fold(base.clone(), merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qw_core::{StepOptions, TagBag};

    fn forge() -> Step {
        Step::new("forge_intro", "The forge roars.").with_tags(["!apprenticed"])
    }

    fn guild_patch() -> Patch {
        let mut patch = Patch::new("forge_intro");
        patch.tags = vec!["@guild_member".into(), "+apprenticed".into()];
        patch.append = Some(" The master nods at you.".into());
        patch
    }

    #[test]
    fn satisfied_gate_applies() {
        let patches = [guild_patch()];
        let bag: TagBag = ["guild_member"].into_iter().collect();

        let step = apply_patches(&forge(), &patches, &bag);
        assert_eq!(step.text, "The forge roars. The master nods at you.");
        assert_eq!(
            step.tags,
            vec!["!apprenticed", "@guild_member", "+apprenticed"]
        );
    }

    #[test]
    fn unsatisfied_gate_leaves_base() {
        let patches = [guild_patch()];
        let step = apply_patches(&forge(), &patches, &TagBag::new());
        assert_eq!(step, forge());
    }

    #[test]
    fn other_targets_ignored() {
        let mut patch = Patch::new("elsewhere");
        patch.replace = Some("gone".into());
        let step = apply_patches(&forge(), &[patch], &TagBag::new());
        assert_eq!(step.text, "The forge roars.");
    }

    #[test]
    fn repeated_composition_is_idempotent() {
        let patches = [guild_patch()];
        let bag: TagBag = ["guild_member"].into_iter().collect();
        let base = forge();

        let once = apply_patches(&base, &patches, &bag);
        let twice = apply_patches(&base, &patches, &bag);
        assert_eq!(once, twice);
        // merging the same patch again adds no tags
        assert_eq!(merge(once.clone(), &patches[0]).tags, once.tags);
    }

    #[test]
    fn replace_wins_over_prepend() {
        let mut patch = Patch::new("forge_intro");
        patch.prepend = Some("Hot. ".into());
        patch.replace = Some("Cold ashes.".into());
        let step = apply_patches(&forge(), &[patch], &TagBag::new());
        assert_eq!(step.text, "Cold ashes.");
    }

    #[test]
    fn patches_compose_in_order() {
        let mut first = Patch::new("forge_intro");
        first.prepend = Some("Dawn. ".into());
        let mut second = Patch::new("forge_intro");
        second.append = Some(" Dusk.".into());
        second.log = Some("Visited the forge".into());
        second.options = Some(StepOptions::Preset("leave".into()));

        let step = apply_patches(&forge(), &[first, second], &TagBag::new());
        assert_eq!(step.text, "Dawn. The forge roars. Dusk.");
        assert_eq!(step.log.as_deref(), Some("Visited the forge"));
        assert_eq!(step.options, Some(StepOptions::Preset("leave".into())));
    }
}
