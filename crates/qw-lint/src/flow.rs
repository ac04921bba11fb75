//! Reachability and transition checks over the step graph.

use std::collections::BTreeMap;

use qw_core::graph::{Edge, EdgeKind};
use qw_core::{Content, StepGraph};

use crate::finding::Finding;

/// Variants no path from the start location or a coordinate reaches.
pub fn check_orphans(graph: &StepGraph, findings: &mut Vec<Finding>) {
    for node in graph.unreachable() {
        let message = if node.signature.is_empty() {
            "step is unreachable".to_string()
        } else {
            format!("variant [{}] is unreachable", node.signature)
        };
        findings.push(Finding::warning(&node.id, message));
    }
}

/// Options whose every target variant is tag-incompatible with the source.
pub fn check_dead_transitions(graph: &StepGraph, findings: &mut Vec<Finding>) {
    let mut groups: BTreeMap<(usize, &str, &str, bool), Vec<&Edge>> = BTreeMap::new();
    for edge in &graph.edges {
        let target = graph.nodes[edge.to].id.as_str();
        let key = (edge.from, edge.label.as_str(), target, edge.kind == EdgeKind::Fail);
        groups.entry(key).or_default().push(edge);
    }

    for ((from, label, target, _), edges) in groups {
        if edges.iter().any(|e| e.is_live()) {
            continue;
        }
        let source = &graph.nodes[from];
        let reason = edges
            .iter()
            .find_map(|e| e.conflict.as_ref())
            .map(|c| format!(": {c}"))
            .unwrap_or_default();
        findings.push(Finding::warning(
            source.label(),
            format!("option '{label}' can never reach '{target}'{reason}"),
        ));
    }
}

/// Variants sharing an id and an identical signature; they always overlap.
pub fn check_duplicate_signatures(content: &Content, findings: &mut Vec<Finding>) {
    let mut counts: BTreeMap<(&str, String), usize> = BTreeMap::new();
    for step in &content.steps {
        *counts.entry((step.id.as_str(), step.signature_key())).or_default() += 1;
    }
    for ((id, signature), count) in counts.into_iter().filter(|(_, n)| *n > 1) {
        let shown = if signature.is_empty() {
            "no signature".to_string()
        } else {
            format!("signature [{signature}]")
        };
        findings.push(Finding::warning(
            id,
            format!("{count} variants share {shown}; selection always ties them on eligibility"),
        ));
    }
}
