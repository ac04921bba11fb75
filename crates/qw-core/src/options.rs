//! Player-facing options and preset expansion.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::tag::{Tag, parse_tags};

/// Separator between label and target in the option shorthand.
const SHORTHAND_SEPARATOR: &str = "::";

/// A step's `options` field: inline options or the name of a preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepOptions {
    /// Reference into the `option_presets` table.
    Preset(String),
    /// Options listed on the step itself.
    Inline(Vec<OptionEntry>),
}

/// One entry of an option list, as authored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionEntry {
    /// `"Label::targetStepId"`.
    Shorthand(String),
    /// The full record.
    Full(ChoiceOption),
}

impl OptionEntry {
    /// Expand into a full option record.
    pub fn to_choice(&self) -> ChoiceOption {
        match self {
            Self::Shorthand(s) => ChoiceOption::shorthand(s),
            Self::Full(option) => option.clone(),
        }
    }
}

/// Skill source(s) named by an option: a stat or tag name, or several.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SkillSource {
    /// A single source.
    One(String),
    /// Several sources whose bonuses sum.
    Many(Vec<String>),
}

impl SkillSource {
    /// The source names in authored order.
    pub fn names(&self) -> Vec<&str> {
        match self {
            Self::One(name) => vec![name.as_str()],
            Self::Many(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

/// A single player-facing choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceOption {
    /// Text shown to the player.
    pub label: String,
    /// Gate (`@`/`!`) and mutation (`+`/`-`) tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Skill source(s) rolled against `dc`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill: Option<SkillSource>,
    /// Difficulty class of the skill check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dc: Option<i64>,
    /// Step id reached on choice (or on a passed check).
    pub pass: String,
    /// Step id reached on a failed check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail: Option<String>,
    /// Omit the option entirely while its gate fails.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
}

impl ChoiceOption {
    /// A plain transition with no tags or check.
    pub fn new(label: impl Into<String>, pass: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            tags: Vec::new(),
            skill: None,
            dc: None,
            pass: pass.into(),
            fail: None,
            hidden: false,
        }
    }

    /// Expand `"Label::target"`. Without a separator the whole string is
    /// both label and target.
    pub fn shorthand(s: &str) -> Self {
        match s.split_once(SHORTHAND_SEPARATOR) {
            Some((label, target)) => Self::new(label.trim(), target.trim()),
            None => Self::new(s.trim(), s.trim()),
        }
    }

    /// The skill check attached to this option, if it is complete.
    pub fn check(&self) -> Option<(Vec<&str>, i64)> {
        match (&self.skill, self.dc) {
            (Some(skill), Some(dc)) => Some((skill.names(), dc)),
            _ => None,
        }
    }

    /// Parsed tags in authored order.
    pub fn parsed_tags(&self) -> Vec<Tag> {
        parse_tags(&self.tags)
    }

    /// Every step id this option can lead to.
    pub fn targets(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.pass.as_str()).chain(self.fail.as_deref())
    }
}

/// Expand a step's options against the preset table.
///
/// An unknown preset name resolves to no options.
pub fn resolve_options(
    options: Option<&StepOptions>,
    presets: &BTreeMap<String, Vec<OptionEntry>>,
) -> Vec<ChoiceOption> {
    let entries: &[OptionEntry] = match options {
        None => &[],
        Some(StepOptions::Inline(entries)) => entries,
        Some(StepOptions::Preset(name)) => presets.get(name).map(Vec::as_slice).unwrap_or(&[]),
    };
    entries.iter().map(OptionEntry::to_choice).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shorthand_split() {
        let option = ChoiceOption::shorthand("Enter the forge::forge_intro");
        assert_eq!(option.label, "Enter the forge");
        assert_eq!(option.pass, "forge_intro");
        assert!(option.check().is_none());

        let option = ChoiceOption::shorthand("B2");
        assert_eq!(option.label, "B2");
        assert_eq!(option.pass, "B2");
    }

    #[test]
    fn mixed_entries_deserialize() {
        let options: StepOptions = serde_json::from_str(
            r#"[
                "Leave::A1",
                { "label": "Force the lock", "skill": ["might", "lucky"], "dc": 12,
                  "pass": "vault", "fail": "alarm", "tags": ["+noisy"] }
            ]"#,
        )
        .unwrap();
        let resolved = resolve_options(Some(&options), &BTreeMap::new());
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].pass, "A1");
        let (sources, dc) = resolved[1].check().unwrap();
        assert_eq!(sources, vec!["might", "lucky"]);
        assert_eq!(dc, 12);
        assert_eq!(resolved[1].targets().collect::<Vec<_>>(), vec!["vault", "alarm"]);
    }

    #[test]
    fn preset_reference() {
        let mut presets = BTreeMap::new();
        presets.insert(
            "travel".to_string(),
            vec![OptionEntry::Shorthand("North::A2".to_string())],
        );
        let options: StepOptions = serde_json::from_str("\"travel\"").unwrap();
        let resolved = resolve_options(Some(&options), &presets);
        assert_eq!(resolved, vec![ChoiceOption::new("North", "A2")]);
    }

    #[test]
    fn unknown_preset_is_empty() {
        let options = StepOptions::Preset("missing".to_string());
        assert!(resolve_options(Some(&options), &BTreeMap::new()).is_empty());
        assert!(resolve_options(None, &BTreeMap::new()).is_empty());
    }

    #[test]
    fn single_skill_source() {
        let option: ChoiceOption =
            serde_json::from_str(r#"{ "label": "Sneak", "skill": "finesse", "dc": 8, "pass": "x" }"#)
                .unwrap();
        assert_eq!(option.check(), Some((vec!["finesse"], 8)));
        assert!(!option.hidden);
    }
}
