//! Patches: conditional partial overrides of a step.
//!
//! A patch names a `target` step id and a tag gate. When the gate holds for
//! the current player, the patch's fields are layered onto every variant of
//! the target. Patches may be listed under `patches` or inline in `steps`
//! with an id starting with [`PATCH_MARKER`].

use serde::{Deserialize, Serialize};

use crate::options::StepOptions;
use crate::step::VarDefs;
use crate::tag::{Tag, parse_tags};

/// Id prefix that marks an entry of `steps` as a patch.
pub const PATCH_MARKER: &str = "patch:";

/// A partial override bound to a target step id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Patch {
    /// Patch id; may be empty for entries of `patches`.
    #[serde(default)]
    pub id: String,
    /// Id of the step this patch modifies.
    #[serde(default)]
    pub target: String,
    /// Gate tags (`@`/`!`) plus tags unioned into the target.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Text placed before the body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prepend: Option<String>,
    /// Text placed after the body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub append: Option<String>,
    /// Text replacing the body; wins over prepend/append.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replace: Option<String>,
    /// Replacement journal line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<String>,
    /// Replacement options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<StepOptions>,
    /// Replacement variable declarations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vars: Option<VarDefs>,
}

impl Patch {
    /// Create a patch for `target`.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Self::default()
        }
    }

    /// Whether an id names a patch rather than a step.
    pub fn is_patch_id(id: &str) -> bool {
        id.starts_with(PATCH_MARKER)
    }

    /// The `@`/`!` tags deciding whether the patch applies.
    pub fn gate(&self) -> Vec<Tag> {
        parse_tags(&self.tags)
            .into_iter()
            .filter(|t| t.op.is_signature())
            .collect()
    }

    /// True when `replace` is set together with `prepend` or `append`.
    pub fn has_text_conflict(&self) -> bool {
        self.replace.is_some() && (self.prepend.is_some() || self.append.is_some())
    }

    /// Fill in `target` from the id suffix when it was omitted.
    pub(crate) fn normalize(&mut self) {
        if self.target.is_empty()
            && let Some(rest) = self.id.strip_prefix(PATCH_MARKER)
        {
            self.target = rest.to_string();
        }
    }

    /// A human-readable name: the id, or `patch for <target>`.
    pub fn display_name(&self) -> String {
        if self.id.is_empty() {
            format!("patch for {}", self.target)
        } else {
            self.id.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_from_id_suffix() {
        let mut patch: Patch =
            serde_json::from_str(r#"{ "id": "patch:forge_intro", "append": "!" }"#).unwrap();
        patch.normalize();
        assert_eq!(patch.target, "forge_intro");
    }

    #[test]
    fn explicit_target_kept() {
        let mut patch: Patch =
            serde_json::from_str(r#"{ "id": "patch:guild", "target": "forge_intro" }"#).unwrap();
        patch.normalize();
        assert_eq!(patch.target, "forge_intro");
    }

    #[test]
    fn gate_is_signature_tags_only() {
        let mut patch = Patch::new("forge_intro");
        patch.tags = vec!["@guild_member".into(), "+apprenticed".into(), "warm".into()];
        assert_eq!(patch.gate().len(), 1);
        assert_eq!(patch.gate()[0].name, "guild_member");
    }

    #[test]
    fn text_conflict() {
        let mut patch = Patch::new("x");
        patch.prepend = Some("a".into());
        assert!(!patch.has_text_conflict());
        patch.replace = Some("b".into());
        assert!(patch.has_text_conflict());
    }
}
