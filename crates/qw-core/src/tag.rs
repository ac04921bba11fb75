//! Tag parsing and evaluation.
//!
//! A raw tag is a label with an optional single leading operator:
//!
//! - `@name` (required): the player must hold `name`
//! - `!name` (blocked): the player must not hold `name`
//! - `+name` (grant): executing adds one `name`
//! - `-name` (consume): executing removes one `name`
//! - `name` (preferred): raises the step's selection score
//!
//! Required and blocked tags may carry a numeric comparison suffix
//! (`@gold>2`, `!wounds=3`, `@might<4`) evaluated against the held count or,
//! for stat names, the stat value. A suffix that does not parse degrades to
//! plain presence/absence of the base name. Whitespace before the suffix is
//! not part of the name, and the authored suffix text is kept so a tag
//! renders back exactly as written.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The role a tag plays, determined by its leading operator character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagOp {
    /// `@`: must be held.
    Required,
    /// `!`: must not be held.
    Blocked,
    /// `+`: added on execution.
    Grant,
    /// `-`: removed on execution.
    Consume,
    /// No operator: scored when held.
    Preferred,
}

impl TagOp {
    /// Map a leading character to its operator, if it is one.
    pub fn from_prefix(c: char) -> Option<Self> {
        match c {
            '@' => Some(Self::Required),
            '!' => Some(Self::Blocked),
            '+' => Some(Self::Grant),
            '-' => Some(Self::Consume),
            _ => None,
        }
    }

    /// The operator character, or `None` for preferred tags.
    pub fn prefix(self) -> Option<char> {
        match self {
            Self::Required => Some('@'),
            Self::Blocked => Some('!'),
            Self::Grant => Some('+'),
            Self::Consume => Some('-'),
            Self::Preferred => None,
        }
    }

    /// True for `@` and `!`: the operators that gate eligibility.
    pub fn is_signature(self) -> bool {
        matches!(self, Self::Required | Self::Blocked)
    }

    /// True for `+` and `-`: the operators that change player state.
    pub fn is_mutation(self) -> bool {
        matches!(self, Self::Grant | Self::Consume)
    }
}

/// A numeric comparison attached to a required or blocked tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    /// `name=N`
    Eq(i64),
    /// `name<N`
    Lt(i64),
    /// `name>N`
    Gt(i64),
}

impl Comparison {
    /// Whether `value` satisfies this comparison.
    pub fn matches(self, value: i64) -> bool {
        match self {
            Self::Eq(n) => value == n,
            Self::Lt(n) => value < n,
            Self::Gt(n) => value > n,
        }
    }

    fn symbol(self) -> char {
        match self {
            Self::Eq(_) => '=',
            Self::Lt(_) => '<',
            Self::Gt(_) => '>',
        }
    }

    fn operand(self) -> i64 {
        match self {
            Self::Eq(n) | Self::Lt(n) | Self::Gt(n) => n,
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.symbol(), self.operand())
    }
}

/// A parsed tag. The base `name` is the unit of identity for mutation and
/// satisfaction checks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    /// The tag's role.
    pub op: TagOp,
    /// Base name with operator and comparison stripped.
    pub name: String,
    /// Comparison suffix; only ever set on required/blocked tags.
    pub comparison: Option<Comparison>,
    /// Suffix text as authored, when it differs from `comparison`'s rendering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
}

impl Tag {
    /// Build a tag from an operator and base name.
    pub fn new(op: TagOp, name: impl Into<String>) -> Self {
        Self {
            op,
            name: name.into(),
            comparison: None,
            suffix: None,
        }
    }

    /// Attach a comparison suffix.
    pub fn with_comparison(mut self, comparison: Comparison) -> Self {
        self.comparison = Some(comparison);
        self.suffix = None;
        self
    }

    /// Parse a raw tag string. Never fails.
    pub fn parse(raw: &str) -> Self {
        let (op, body) = match raw.chars().next().and_then(TagOp::from_prefix) {
            // every operator character is one byte
            Some(op) => (op, &raw[1..]),
            None => (TagOp::Preferred, raw),
        };

        if op.is_signature()
            && let Some((name, comparison)) = split_comparison(body)
        {
            let suffix = &body[name.len()..];
            let canonical = comparison.map(|c| c.to_string());
            return Self {
                op,
                name: name.to_string(),
                comparison,
                suffix: (canonical.as_deref() != Some(suffix)).then(|| suffix.to_string()),
            };
        }

        Self::new(op, body)
    }

    /// Whether this tag's condition holds for `state`.
    ///
    /// Grant, consume, and preferred tags are not conditions and always hold.
    pub fn is_met<S: TagState + ?Sized>(&self, state: &S) -> bool {
        match self.op {
            TagOp::Required => self.is_present(state),
            TagOp::Blocked => !self.is_present(state),
            TagOp::Grant | TagOp::Consume | TagOp::Preferred => true,
        }
    }

    /// Presence of the base name, honoring the comparison when the state
    /// allows comparing this name.
    fn is_present<S: TagState + ?Sized>(&self, state: &S) -> bool {
        if let Some(comparison) = self.comparison
            && let Some(value) = state.compared_value(&self.name)
        {
            return comparison.matches(value);
        }
        state.count(&self.name) > 0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = self.op.prefix() {
            write!(f, "{prefix}")?;
        }
        write!(f, "{}", self.name)?;
        match (&self.suffix, self.comparison) {
            (Some(suffix), _) => write!(f, "{suffix}"),
            (None, Some(comparison)) => write!(f, "{comparison}"),
            (None, None) => Ok(()),
        }
    }
}

/// Split `name<op>N` into the name and the parsed comparison.
///
/// Returns `None` when the body has no comparison character after its first
/// character. Returns `Some((name, None))` when the operand is not a number.
/// The name loses trailing whitespace.
fn split_comparison(body: &str) -> Option<(&str, Option<Comparison>)> {
    let (pos, symbol) = body
        .char_indices()
        .skip(1)
        .find(|(_, c)| matches!(c, '=' | '<' | '>'))?;
    let name = body[..pos].trim_end();
    let operand = body[pos + symbol.len_utf8()..].trim().parse::<i64>().ok();
    let comparison = operand.map(|n| match symbol {
        '=' => Comparison::Eq(n),
        '<' => Comparison::Lt(n),
        _ => Comparison::Gt(n),
    });
    Some((name, comparison))
}

/// Parse every raw tag in a list, preserving order.
pub fn parse_tags<S: AsRef<str>>(raw: &[S]) -> Vec<Tag> {
    raw.iter().map(|t| Tag::parse(t.as_ref())).collect()
}

/// True when every tag in the list is met by `state`.
pub fn gate_passes<S: TagState + ?Sized>(tags: &[Tag], state: &S) -> bool {
    tags.iter().all(|t| t.is_met(state))
}

/// Read access to the tag state a condition is evaluated against.
pub trait TagState {
    /// How many copies of `name` are held.
    fn count(&self, name: &str) -> u32;

    /// The numeric value a comparison on `name` is evaluated against, or
    /// `None` when comparisons on `name` degrade to presence/absence.
    fn compared_value(&self, name: &str) -> Option<i64> {
        Some(i64::from(self.count(name)))
    }
}

/// The multiset of tags a player holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagBag {
    counts: BTreeMap<String, u32>,
}

impl TagBag {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one copy of `name`.
    pub fn add(&mut self, name: impl Into<String>) {
        *self.counts.entry(name.into()).or_insert(0) += 1;
    }

    /// Remove one copy of `name`. Returns false if none was held.
    pub fn remove(&mut self, name: &str) -> bool {
        match self.counts.get_mut(name) {
            Some(n) if *n > 1 => {
                *n -= 1;
                true
            }
            Some(_) => {
                self.counts.remove(name);
                true
            }
            None => false,
        }
    }

    /// Whether at least one copy of `name` is held.
    pub fn contains(&self, name: &str) -> bool {
        self.counts.contains_key(name)
    }

    /// Iterate held names with their counts, in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of distinct names held.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True when nothing is held.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Drop every held tag.
    pub fn clear(&mut self) {
        self.counts.clear();
    }
}

impl TagState for TagBag {
    fn count(&self, name: &str) -> u32 {
        self.counts.get(name).copied().unwrap_or(0)
    }
}

impl<S: Into<String>> FromIterator<S> for TagBag {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut bag = Self::new();
        for name in iter {
            bag.add(name);
        }
        bag
    }
}

impl fmt::Display for TagBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(name, n)| if n == 1 { name.to_string() } else { format!("{name}×{n}") })
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parse_operators() {
        assert_eq!(Tag::parse("@key"), Tag::new(TagOp::Required, "key"));
        assert_eq!(Tag::parse("!key"), Tag::new(TagOp::Blocked, "key"));
        assert_eq!(Tag::parse("+key"), Tag::new(TagOp::Grant, "key"));
        assert_eq!(Tag::parse("-key"), Tag::new(TagOp::Consume, "key"));
        assert_eq!(Tag::parse("key"), Tag::new(TagOp::Preferred, "key"));
    }

    #[test]
    fn only_one_leading_operator_is_stripped() {
        let tag = Tag::parse("@@odd");
        assert_eq!(tag.op, TagOp::Required);
        assert_eq!(tag.name, "@odd");

        let tag = Tag::parse("half-orc");
        assert_eq!(tag.op, TagOp::Preferred);
        assert_eq!(tag.name, "half-orc");
    }

    #[test]
    fn parse_comparisons() {
        assert_eq!(
            Tag::parse("@gold>2"),
            Tag::new(TagOp::Required, "gold").with_comparison(Comparison::Gt(2))
        );
        assert_eq!(
            Tag::parse("!wounds=3"),
            Tag::new(TagOp::Blocked, "wounds").with_comparison(Comparison::Eq(3))
        );
        assert_eq!(
            Tag::parse("@might<4"),
            Tag::new(TagOp::Required, "might").with_comparison(Comparison::Lt(4))
        );
    }

    #[test]
    fn comparison_ignored_on_mutations() {
        let tag = Tag::parse("+gold=3");
        assert_eq!(tag.op, TagOp::Grant);
        assert_eq!(tag.name, "gold=3");
        assert_eq!(tag.comparison, None);
    }

    #[test]
    fn malformed_comparison_degrades_to_presence() {
        let tag = Tag::parse("@gold>lots");
        assert_eq!(tag.name, "gold");
        assert_eq!(tag.comparison, None);

        let bag: TagBag = ["gold"].into_iter().collect();
        assert!(tag.is_met(&bag));
    }

    #[test]
    fn spaced_comparison_trims_the_name() {
        let tag = Tag::parse("@gold = 3");
        assert_eq!(tag.name, "gold");
        assert_eq!(tag.comparison, Some(Comparison::Eq(3)));

        let bag: TagBag = ["gold", "gold", "gold"].into_iter().collect();
        assert!(tag.is_met(&bag));
        assert!(!Tag::parse("!gold > 2").is_met(&bag));
    }

    #[test]
    fn authored_suffix_renders_verbatim() {
        for raw in ["@gold = 3", "@gold>lots", "@gold=+3", "!wounds<", "@gold>02"] {
            assert_eq!(Tag::parse(raw).to_string(), raw);
        }
        assert_eq!(Tag::parse("@gold>2").suffix, None);
        assert_eq!(Tag::parse("@gold>lots").suffix.as_deref(), Some(">lots"));
    }

    #[test]
    fn required_and_blocked_evaluation() {
        let bag: TagBag = ["key", "gold", "gold", "gold"].into_iter().collect();
        assert!(Tag::parse("@key").is_met(&bag));
        assert!(!Tag::parse("!key").is_met(&bag));
        assert!(Tag::parse("!lantern").is_met(&bag));
        assert!(Tag::parse("@gold=3").is_met(&bag));
        assert!(Tag::parse("@gold>2").is_met(&bag));
        assert!(!Tag::parse("@gold<3").is_met(&bag));
        assert!(Tag::parse("!gold>5").is_met(&bag));
        assert!(Tag::parse("@gold<1").is_met(&TagBag::new()));
    }

    #[test]
    fn mutations_and_preferred_always_met() {
        let bag = TagBag::new();
        assert!(Tag::parse("+key").is_met(&bag));
        assert!(Tag::parse("-key").is_met(&bag));
        assert!(Tag::parse("friendly").is_met(&bag));
    }

    struct NoComparisons(TagBag);

    impl TagState for NoComparisons {
        fn count(&self, name: &str) -> u32 {
            self.0.count(name)
        }

        fn compared_value(&self, _name: &str) -> Option<i64> {
            None
        }
    }

    #[test]
    fn disabled_comparison_falls_back_to_presence() {
        let state = NoComparisons(["gold"].into_iter().collect());
        // gold=3 would fail by count, but presence is all that is checked
        assert!(Tag::parse("@gold=3").is_met(&state));
        assert!(!Tag::parse("!gold<1").is_met(&state));
    }

    #[test]
    fn bag_counts() {
        let mut bag = TagBag::new();
        bag.add("lucky");
        bag.add("lucky");
        assert_eq!(bag.count("lucky"), 2);
        assert!(bag.remove("lucky"));
        assert_eq!(bag.count("lucky"), 1);
        assert!(bag.remove("lucky"));
        assert!(!bag.contains("lucky"));
        assert!(!bag.remove("lucky"));
        assert!(bag.is_empty());
    }

    #[test]
    fn bag_display() {
        let bag: TagBag = ["b", "a", "b"].into_iter().collect();
        assert_eq!(bag.to_string(), "a, b×2");
    }

    fn tag_string() -> impl Strategy<Value = String> {
        let name = "[a-z_][a-z0-9_]{0,8}";
        prop_oneof![
            name.prop_map(|n| n.to_string()),
            (prop::sample::select(vec!['+', '-']), name).prop_map(|(op, n)| format!("{op}{n}")),
            (
                prop::sample::select(vec!['@', '!']),
                name,
                prop::option::of((
                    prop::sample::select(vec!["", " "]),
                    prop::sample::select(vec!['=', '<', '>']),
                    prop::sample::select(vec!["", " "]),
                    prop_oneof![
                        (-20i64..20).prop_map(|v| v.to_string()),
                        Just("+3".to_string()),
                        Just("lots".to_string()),
                        Just(String::new()),
                    ],
                )),
            )
                .prop_map(|(op, n, cmp)| match cmp {
                    Some((before, sym, after, v)) => format!("{op}{n}{before}{sym}{after}{v}"),
                    None => format!("{op}{n}"),
                }),
        ]
    }

    proptest! {
        #[test]
        fn base_name_has_no_leading_operator(raw in tag_string()) {
            let tag = Tag::parse(&raw);
            prop_assert!(tag.name.chars().next().and_then(TagOp::from_prefix).is_none());
            prop_assert_eq!(tag.name.trim_end(), tag.name.as_str());
        }

        #[test]
        fn tag_list_round_trips(raw in prop::collection::vec(tag_string(), 0..8)) {
            let rebuilt: Vec<String> = parse_tags(&raw).iter().map(Tag::to_string).collect();
            prop_assert_eq!(rebuilt, raw);
        }

        #[test]
        fn reapplying_operator_filters_the_same(
            raw in tag_string(),
            held in prop::collection::vec("[a-z_][a-z0-9_]{0,8}", 0..6),
        ) {
            let bag: TagBag = held.into_iter().collect();
            let parsed = Tag::parse(&raw);
            let mut rebuilt = Tag::new(parsed.op, parsed.name.clone());
            rebuilt.comparison = parsed.comparison;
            prop_assert_eq!(parsed.is_met(&bag), rebuilt.is_met(&bag));
        }
    }
}
