//! Steps: the atomic unit of narrative content.
//!
//! Several steps may share an id. Each is a variant of the same location,
//! distinguished by its signature (`@`/`!` tags); selection picks among them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::location;
use crate::options::StepOptions;
use crate::tag::{Tag, TagOp, TagState, gate_passes, parse_tags};

/// Variable declarations: name to candidate list, or `null` to clear.
pub type VarDefs = BTreeMap<String, Option<Vec<serde_json::Value>>>;

/// One variant of the content at a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Location id this step is shown at.
    pub id: String,
    /// Raw tags in authored order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Variables bound when the step executes.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub vars: VarDefs,
    /// Body text; may contain `{{var}}` placeholders.
    #[serde(default)]
    pub text: String,
    /// Journal line recorded when the step executes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<String>,
    /// Inline options or a preset name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<StepOptions>,
}

impl Step {
    /// A step with only an id and text.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tags: Vec::new(),
            vars: BTreeMap::new(),
            text: text.into(),
            log: None,
            options: None,
        }
    }

    /// Builder: append raw tags.
    pub fn with_tags<S: Into<String>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Parsed tags in authored order.
    pub fn parsed_tags(&self) -> Vec<Tag> {
        parse_tags(&self.tags)
    }

    /// Parsed tags with the given operator.
    pub fn tags_with(&self, op: TagOp) -> Vec<Tag> {
        self.parsed_tags().into_iter().filter(|t| t.op == op).collect()
    }

    /// The `@`/`!` tags that define which variant this is.
    pub fn signature(&self) -> Vec<Tag> {
        self.parsed_tags()
            .into_iter()
            .filter(|t| t.op.is_signature())
            .collect()
    }

    /// The signature rendered as a stable key (authored order).
    pub fn signature_key(&self) -> String {
        let parts: Vec<String> = self.signature().iter().map(Tag::to_string).collect();
        parts.join(" ")
    }

    /// Whether every required tag is held and no blocked tag is.
    pub fn is_eligible<S: TagState + ?Sized>(&self, state: &S) -> bool {
        gate_passes(&self.signature(), state)
    }

    /// True when the id is not a map coordinate.
    pub fn is_virtual(&self) -> bool {
        location::is_virtual(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::TagBag;

    #[test]
    fn deserialize_minimal() {
        let step: Step = serde_json::from_str(r#"{ "id": "A1" }"#).unwrap();
        assert_eq!(step.id, "A1");
        assert!(step.tags.is_empty());
        assert!(step.text.is_empty());
        assert!(!step.is_virtual());
    }

    #[test]
    fn vars_null_clears() {
        let step: Step = serde_json::from_str(
            r#"{ "id": "inn", "vars": { "npc": ["Ada", "Bo"], "old": null } }"#,
        )
        .unwrap();
        assert_eq!(step.vars["npc"].as_ref().map(Vec::len), Some(2));
        assert_eq!(step.vars["old"], None);
    }

    #[test]
    fn signature_and_eligibility() {
        let step = Step::new("A1", "").with_tags(["@has_key", "!guard_alert", "+opened", "quiet"]);
        assert_eq!(step.signature_key(), "@has_key !guard_alert");
        assert_eq!(step.tags_with(TagOp::Grant), vec![Tag::new(TagOp::Grant, "opened")]);

        let mut bag = TagBag::new();
        assert!(!step.is_eligible(&bag));
        bag.add("has_key");
        assert!(step.is_eligible(&bag));
        bag.add("guard_alert");
        assert!(!step.is_eligible(&bag));
    }
}
