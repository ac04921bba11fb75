//! Grant and consume application.

use serde::Serialize;

use qw_core::{Tag, TagBag, TagOp};

/// One state change made by executing a step or option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "tag", rename_all = "snake_case")]
pub enum Mutation {
    /// A copy of the tag was added.
    Granted(String),
    /// A copy of the tag was removed.
    Consumed(String),
    /// A consume found nothing to remove.
    Missing(String),
}

/// Apply every `+`/`-` tag in order. Other tags are ignored.
///
/// The bag is updated in one assignment once every change is computed.
pub fn apply_mutations(tags: &[Tag], bag: &mut TagBag) -> Vec<Mutation> {
    let mut next = bag.clone();
    let mut applied = Vec::new();
    for tag in tags {
        match tag.op {
            TagOp::Grant => {
                next.add(tag.name.clone());
                applied.push(Mutation::Granted(tag.name.clone()));
            }
            TagOp::Consume => {
                if next.remove(&tag.name) {
                    applied.push(Mutation::Consumed(tag.name.clone()));
                } else {
                    applied.push(Mutation::Missing(tag.name.clone()));
                }
            }
            TagOp::Required | TagOp::Blocked | TagOp::Preferred => {}
        }
    }
    if !applied.is_empty() {
        tracing::debug!(?applied, "applied tag mutations");
    }
    *bag = next;
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use qw_core::TagState;
    use qw_core::tag::parse_tags;

    #[test]
    fn grants_and_consumes_in_order() {
        let mut bag: TagBag = ["coin"].into_iter().collect();
        let applied = apply_mutations(&parse_tags(&["+coin", "-coin", "-coin", "-coin"]), &mut bag);
        assert_eq!(
            applied,
            vec![
                Mutation::Granted("coin".into()),
                Mutation::Consumed("coin".into()),
                Mutation::Consumed("coin".into()),
                Mutation::Missing("coin".into()),
            ]
        );
        assert_eq!(bag.count("coin"), 0);
    }

    #[test]
    fn gates_and_preferred_untouched() {
        let mut bag = TagBag::new();
        let applied = apply_mutations(&parse_tags(&["@key", "!guard", "quiet"]), &mut bag);
        assert!(applied.is_empty());
        assert!(bag.is_empty());
    }

    #[test]
    fn duplicate_grants_stack() {
        let mut bag = TagBag::new();
        apply_mutations(&parse_tags(&["+lucky", "+lucky"]), &mut bag);
        assert_eq!(bag.count("lucky"), 2);
    }
}
