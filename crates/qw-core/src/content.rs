//! The loaded content bundle.
//!
//! Content is parsed once per session and shared read-only by the engine,
//! the lint tool, and the graph tool. Loading performs the checks that must
//! block play (missing config, patches targeting patches); softer problems
//! are kept as [`ContentWarning`]s.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::config::GameConfig;
use crate::error::{ContentError, CoreResult};
use crate::options::{ChoiceOption, OptionEntry, resolve_options};
use crate::patch::Patch;
use crate::step::Step;

/// Non-fatal problems found while loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentWarning {
    /// A patch names a step id no step has; the patch is inert.
    UnknownPatchTarget {
        /// Patch display name.
        patch: String,
        /// The missing target id.
        target: String,
    },
}

impl fmt::Display for ContentWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownPatchTarget { patch, target } => {
                write!(f, "{patch} targets unknown step '{target}'")
            }
        }
    }
}

#[derive(Deserialize)]
struct RawContent {
    #[serde(alias = "_config")]
    config: Option<GameConfig>,
    #[serde(default)]
    locations: BTreeMap<String, String>,
    #[serde(default)]
    option_presets: BTreeMap<String, Vec<OptionEntry>>,
    #[serde(default)]
    steps: Vec<Value>,
    #[serde(default)]
    patches: Vec<Patch>,
}

/// A validated content bundle.
#[derive(Debug, Clone)]
pub struct Content {
    /// Game configuration.
    pub config: GameConfig,
    /// Location id to display name.
    pub locations: BTreeMap<String, String>,
    /// Named, reusable option lists.
    pub option_presets: BTreeMap<String, Vec<OptionEntry>>,
    /// Every step variant, in authored order.
    pub steps: Vec<Step>,
    /// Every patch, `patches` entries first, then inline ones.
    pub patches: Vec<Patch>,
    warnings: Vec<ContentWarning>,
}

impl Content {
    /// Build content from already-parsed parts and run the load-time checks.
    pub fn new(config: GameConfig, steps: Vec<Step>, patches: Vec<Patch>) -> CoreResult<Self> {
        Self::assemble(config, BTreeMap::new(), BTreeMap::new(), steps, patches)
    }

    /// Parse a JSON content document.
    pub fn from_json(src: &str) -> CoreResult<Self> {
        let value: Value = serde_json::from_str(src)?;
        Self::from_value(value)
    }

    /// Read and parse a JSON content file.
    pub fn from_path(path: &Path) -> CoreResult<Self> {
        let src = std::fs::read_to_string(path).map_err(|source| ContentError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&src)
    }

    /// Interpret a parsed JSON document.
    pub fn from_value(value: Value) -> CoreResult<Self> {
        if value.get("steps").is_none()
            && let Some(message) = value.get("error").and_then(Value::as_str)
        {
            return Err(ContentError::Build(message.to_string()));
        }

        let raw: RawContent = serde_json::from_value(value)?;
        let config = raw.config.ok_or(ContentError::MissingConfig)?;

        let mut steps = Vec::new();
        let mut patches = raw.patches;
        for (index, entry) in raw.steps.into_iter().enumerate() {
            let id = entry
                .get("id")
                .and_then(Value::as_str)
                .ok_or(ContentError::MissingStepId { index })?
                .to_string();
            if Patch::is_patch_id(&id) {
                let patch = serde_json::from_value(entry)
                    .map_err(|source| ContentError::InvalidEntry { id, source })?;
                patches.push(patch);
            } else {
                let step = serde_json::from_value(entry)
                    .map_err(|source| ContentError::InvalidEntry { id, source })?;
                steps.push(step);
            }
        }

        Self::assemble(config, raw.locations, raw.option_presets, steps, patches)
    }

    fn assemble(
        config: GameConfig,
        locations: BTreeMap<String, String>,
        option_presets: BTreeMap<String, Vec<OptionEntry>>,
        steps: Vec<Step>,
        mut patches: Vec<Patch>,
    ) -> CoreResult<Self> {
        for patch in &mut patches {
            patch.normalize();
        }

        let mut warnings = Vec::new();
        for patch in &patches {
            if patch.target.is_empty() {
                return Err(ContentError::PatchWithoutTarget {
                    patch: patch.display_name(),
                });
            }
            let targets_patch = Patch::is_patch_id(&patch.target)
                || patches
                    .iter()
                    .any(|p| !p.id.is_empty() && p.id == patch.target);
            if targets_patch {
                return Err(ContentError::PatchTargetsPatch {
                    patch: patch.display_name(),
                    target: patch.target.clone(),
                });
            }
            if !steps.iter().any(|s| s.id == patch.target) {
                warnings.push(ContentWarning::UnknownPatchTarget {
                    patch: patch.display_name(),
                    target: patch.target.clone(),
                });
            }
        }

        Ok(Self {
            config,
            locations,
            option_presets,
            steps,
            patches,
            warnings,
        })
    }

    /// Non-fatal problems found while loading.
    pub fn warnings(&self) -> &[ContentWarning] {
        &self.warnings
    }

    /// All variants at a location id, in authored order.
    pub fn steps_at<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Step> {
        self.steps.iter().filter(move |s| s.id == id)
    }

    /// Whether any step has this id.
    pub fn has_step(&self, id: &str) -> bool {
        self.steps.iter().any(|s| s.id == id)
    }

    /// Patches targeting a step id, in application order.
    pub fn patches_for<'a>(&'a self, target: &'a str) -> impl Iterator<Item = &'a Patch> {
        self.patches.iter().filter(move |p| p.target == target)
    }

    /// Map a location reference to a step id.
    ///
    /// Known ids pass through; otherwise a case-insensitive match against the
    /// `locations` display names resolves to its id. Unknown input is
    /// returned unchanged.
    pub fn resolve_location<'a>(&'a self, location: &'a str) -> &'a str {
        if self.has_step(location) || self.locations.contains_key(location) {
            return location;
        }
        self.locations
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(location.trim()))
            .map(|(id, _)| id.as_str())
            .unwrap_or(location)
    }

    /// Display name of a location, if the table has one.
    pub fn display_name(&self, id: &str) -> Option<&str> {
        self.locations.get(id).map(String::as_str)
    }

    /// Where a new session begins.
    pub fn start_location(&self) -> Option<&str> {
        self.config
            .start_location
            .as_deref()
            .or_else(|| self.steps.first().map(|s| s.id.as_str()))
    }

    /// Concrete options of a step, with presets expanded.
    pub fn options_for(&self, step: &Step) -> Vec<ChoiceOption> {
        resolve_options(step.options.as_ref(), &self.option_presets)
    }

    /// Every distinct step id, in first-appearance order.
    pub fn step_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for step in &self.steps {
            if !ids.contains(&step.id.as_str()) {
                ids.push(&step.id);
            }
        }
        ids
    }
}
