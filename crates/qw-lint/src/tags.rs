//! Tag vocabulary checks.

use std::collections::{BTreeMap, BTreeSet};

use strsim::jaro_winkler;

use qw_core::{Content, Stat, Tag, TagOp};

use crate::finding::Finding;
use crate::sites::OptionSite;

/// Minimum Jaro-Winkler similarity for two tag names to look like a typo.
const TYPO_THRESHOLD: f64 = 0.92;

/// Names shorter than this are never reported as typos.
const TYPO_MIN_LEN: usize = 4;

/// How every base tag name is used across the content.
#[derive(Debug, Default)]
pub struct TagUsage {
    /// `@` names and the first subject requiring each.
    pub required: BTreeMap<String, String>,
    /// `+` names and the first subject granting each.
    pub granted: BTreeMap<String, String>,
    /// Names read by a gate, a score, or a skill check.
    pub consulted: BTreeSet<String>,
    /// Every base name seen.
    pub names: BTreeSet<String>,
}

impl TagUsage {
    /// Collect usage from tag lists and option skill sources.
    pub fn collect(tag_sites: &[(String, Vec<String>)], option_sites: &[OptionSite]) -> Self {
        let mut usage = Self::default();
        for (subject, raw) in tag_sites {
            for tag in raw.iter().map(|r| Tag::parse(r)) {
                if tag.name.is_empty() {
                    continue;
                }
                match tag.op {
                    TagOp::Required => {
                        usage
                            .required
                            .entry(tag.name.clone())
                            .or_insert_with(|| subject.clone());
                        usage.consulted.insert(tag.name.clone());
                    }
                    TagOp::Blocked | TagOp::Preferred => {
                        usage.consulted.insert(tag.name.clone());
                    }
                    TagOp::Grant => {
                        usage
                            .granted
                            .entry(tag.name.clone())
                            .or_insert_with(|| subject.clone());
                    }
                    TagOp::Consume => {}
                }
                usage.names.insert(tag.name);
            }
        }
        for site in option_sites {
            if let Some(skill) = &site.option.skill {
                usage
                    .consulted
                    .extend(skill.names().into_iter().map(String::from));
            }
        }
        usage
    }
}

/// Required tags nothing grants, and granted tags nothing reads.
pub fn check_progress_gates(usage: &TagUsage, findings: &mut Vec<Finding>) {
    for (name, subject) in &usage.required {
        if Stat::parse(name).is_none() && !usage.granted.contains_key(name) {
            findings.push(Finding::warning(
                subject,
                format!("requires '{name}' but nothing grants it"),
            ));
        }
    }
    for (name, subject) in &usage.granted {
        if !usage.consulted.contains(name) {
            findings.push(Finding::warning(
                subject,
                format!("grants '{name}' but nothing checks it"),
            ));
        }
    }
}

/// Pairs of tag names similar enough to be a typo.
pub fn check_near_duplicates(usage: &TagUsage, findings: &mut Vec<Finding>) {
    let names: Vec<&String> = usage.names.iter().collect();
    for (i, a) in names.iter().enumerate() {
        for b in &names[i + 1..] {
            if is_typo_pair(a, b) {
                findings.push(Finding::warning(
                    "tags",
                    format!("'{a}' and '{b}' look alike; possible typo"),
                ));
            }
        }
    }
}

fn is_typo_pair(a: &str, b: &str) -> bool {
    if a.len() < TYPO_MIN_LEN || b.len() < TYPO_MIN_LEN {
        return false;
    }
    if a.eq_ignore_ascii_case(b) {
        return true;
    }
    // numbered series such as key1/key2
    let stem = |s: &str| s.trim_end_matches(|c: char| c.is_ascii_digit()).to_string();
    if stem(a) == stem(b) {
        return false;
    }
    jaro_winkler(&a.to_lowercase(), &b.to_lowercase()) >= TYPO_THRESHOLD
}

/// Comparisons that evaluate as plain presence.
pub fn check_comparisons(
    content: &Content,
    tag_sites: &[(String, Vec<String>)],
    findings: &mut Vec<Finding>,
) {
    for (subject, raw_tags) in tag_sites {
        for raw in raw_tags {
            let tag = Tag::parse(raw);
            if !tag.op.is_signature() {
                continue;
            }
            match tag.comparison {
                Some(_) if !content.config.compares(&tag.name) => {
                    findings.push(Finding::warning(
                        subject,
                        format!(
                            "'{raw}' compares '{}', which comparableTags excludes; treated as presence",
                            tag.name
                        ),
                    ));
                }
                None if has_comparison_symbol(raw) => {
                    findings.push(Finding::warning(
                        subject,
                        format!("comparison in '{raw}' does not parse; treated as presence"),
                    ));
                }
                _ => {}
            }
        }
    }
}

fn has_comparison_symbol(raw: &str) -> bool {
    raw.chars()
        .skip(2)
        .any(|c| matches!(c, '=' | '<' | '>'))
}
