//! Quest variables and `{{var}}` interpolation.
//!
//! Variables are session-scoped: each [`crate::Session`] owns its own
//! [`QuestVars`], so concurrent sessions never share bindings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use qw_core::VarDefs;

use crate::random::RandomSource;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// The variable table of one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestVars {
    values: BTreeMap<String, String>,
    /// Bare field names bound by each record variable.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    records: BTreeMap<String, Vec<String>>,
}

impl QuestVars {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The bound value of `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Bind `name` to `value`, replacing any earlier binding.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Remove `name`, its `name.field` entries, and the bare fields a record
    /// bound under it.
    pub fn clear(&mut self, name: &str) {
        self.values.remove(name);
        let prefix = format!("{name}.");
        self.values.retain(|key, _| !key.starts_with(&prefix));
        for field in self.records.remove(name).unwrap_or_default() {
            self.values.remove(&field);
        }
    }

    /// Resolve a step's declarations.
    ///
    /// `null` clears the variable. A list of plain values binds one value
    /// picked at random. A list of records binds one whole record: every
    /// field as `name.field` and as bare `field`. Empty lists are skipped,
    /// and a single candidate is bound without a draw.
    pub fn bind<R: RandomSource + ?Sized>(&mut self, defs: &VarDefs, rng: &mut R) {
        for (name, candidates) in defs {
            let Some(candidates) = candidates else {
                self.clear(name);
                continue;
            };
            let pick = if candidates.len() > 1 {
                rng.pick_index(candidates.len())
            } else {
                0
            };
            let Some(picked) = candidates.get(pick) else {
                continue;
            };
            self.clear(name);
            match picked {
                Value::Object(fields) => {
                    for (field, value) in fields {
                        let text = value_text(value);
                        self.set(format!("{name}.{field}"), text.clone());
                        self.set(field.clone(), text);
                    }
                    self.records
                        .insert(name.clone(), fields.keys().cloned().collect());
                }
                other => self.set(name.clone(), value_text(other)),
            }
            tracing::trace!(name = name.as_str(), "bound quest variable");
        }
    }

    /// Every binding, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// A copy of the bindings.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.values.clone()
    }
}

/// Render a JSON value as interpolation text.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Interpolated text and the placeholders that did not resolve.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Interpolated {
    /// The rendered text.
    pub text: String,
    /// Placeholder names rendered as empty text.
    pub unresolved: Vec<String>,
}

impl Interpolated {
    /// True when every placeholder resolved.
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Replace every `{{name}}` with `lookup(name)`.
///
/// Unknown names render empty and are reported in
/// [`Interpolated::unresolved`]. An unterminated `{{` is kept literally.
pub fn interpolate(text: &str, lookup: impl Fn(&str) -> Option<String>) -> Interpolated {
    let mut out = Interpolated::default();
    let mut rest = text;
    while let Some(start) = rest.find(OPEN) {
        let after = &rest[start + OPEN.len()..];
        let Some(end) = after.find(CLOSE) else {
            break;
        };
        out.text.push_str(&rest[..start]);
        let key = after[..end].trim();
        match lookup(key) {
            Some(value) => out.text.push_str(&value),
            None => out.unresolved.push(key.to_string()),
        }
        rest = &after[end + CLOSE.len()..];
    }
    out.text.push_str(rest);
    out
}

/// Every placeholder name in `text`, in order of appearance.
pub fn placeholders(text: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find(OPEN) {
        let after = &rest[start + OPEN.len()..];
        let Some(end) = after.find(CLOSE) else {
            break;
        };
        names.push(after[..end].trim().to_string());
        rest = &after[end + CLOSE.len()..];
    }
    names
}
