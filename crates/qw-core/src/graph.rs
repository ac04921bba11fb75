//! The step/option transition graph.
//!
//! Nodes are step variants (one per entry of [`Content::steps`], keyed by id
//! and signature). Every option contributes a pass edge, and a fail edge
//! when it has one, to each variant sharing the target id. Options a patch
//! supplies become edges from every variant the patch targets. Edges the
//! compatibility analyzer proves impossible are kept but marked with their
//! [`Conflict`], so the lint tool can report them and the graph tool can
//! prune them.

use std::collections::{BTreeSet, VecDeque};

use serde::Serialize;

use crate::compat::{Conflict, TagProfile, find_conflict};
use crate::content::Content;
use crate::location::is_coordinate;
use crate::options::{ChoiceOption, resolve_options};

/// A step variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    /// Index into [`Content::steps`].
    pub index: usize,
    /// Step id.
    pub id: String,
    /// `@`/`!` tags, space-separated.
    pub signature: String,
    /// Whether the id is not a map coordinate.
    pub is_virtual: bool,
}

impl Node {
    /// `id` or `id [signature]`.
    pub fn label(&self) -> String {
        if self.signature.is_empty() {
            self.id.clone()
        } else {
            format!("{} [{}]", self.id, self.signature)
        }
    }
}

/// Whether an edge follows a passed or a failed check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// The option's `pass` target.
    Pass,
    /// The option's `fail` target.
    Fail,
}

/// A transition between two variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    /// Source node index.
    pub from: usize,
    /// Target node index.
    pub to: usize,
    /// Pass or fail.
    pub kind: EdgeKind,
    /// The option label.
    pub label: String,
    /// Why the transition can never fire, if it can't.
    pub conflict: Option<Conflict>,
    /// Index into [`Content::patches`] when the option comes from a patch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<usize>,
}

impl Edge {
    /// True when no conflict was proven.
    pub fn is_live(&self) -> bool {
        self.conflict.is_none()
    }
}

/// An option target naming no step at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingTarget {
    /// Source node index.
    pub from: usize,
    /// The missing step id.
    pub target: String,
    /// Pass or fail.
    pub kind: EdgeKind,
    /// The option label.
    pub label: String,
}

/// A patch and the variants it can modify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchLink {
    /// Index into [`Content::patches`].
    pub patch: usize,
    /// Patch display name.
    pub name: String,
    /// Node indices of every variant with the target id.
    pub targets: Vec<usize>,
}

/// The full transition graph of a content bundle.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StepGraph {
    /// One node per step variant.
    pub nodes: Vec<Node>,
    /// Option transitions, live and conflicting.
    pub edges: Vec<Edge>,
    /// Option targets that name no step.
    pub dangling: Vec<DanglingTarget>,
    /// Patch to target links.
    pub patches: Vec<PatchLink>,
    /// Nodes reachable without an option: the start location and every
    /// coordinate location.
    pub roots: Vec<usize>,
}

/// Accumulates edges and dangling targets while the graph is built.
struct Linker<'a> {
    nodes: &'a [Node],
    profiles: &'a [TagProfile],
    edges: Vec<Edge>,
    dangling: Vec<DanglingTarget>,
}

impl Linker<'_> {
    /// Link `option`, taken from node `from` with the given source profile,
    /// to every variant of its targets.
    fn link(
        &mut self,
        from: usize,
        source: &TagProfile,
        option: &ChoiceOption,
        patch: Option<usize>,
    ) {
        let targets = std::iter::once((EdgeKind::Pass, option.pass.as_str()))
            .chain(option.fail.as_deref().map(|f| (EdgeKind::Fail, f)));
        for (kind, target) in targets {
            let variants: Vec<usize> = self
                .nodes
                .iter()
                .filter(|n| n.id == target)
                .map(|n| n.index)
                .collect();
            if variants.is_empty() {
                self.dangling.push(DanglingTarget {
                    from,
                    target: target.to_string(),
                    kind,
                    label: option.label.clone(),
                });
            }
            for to in variants {
                self.edges.push(Edge {
                    from,
                    to,
                    kind,
                    label: option.label.clone(),
                    conflict: find_conflict(source, &self.profiles[to]),
                    patch,
                });
            }
        }
    }
}

impl StepGraph {
    /// Build the graph for a content bundle.
    pub fn build(content: &Content) -> Self {
        let nodes: Vec<Node> = content
            .steps
            .iter()
            .enumerate()
            .map(|(index, step)| Node {
                index,
                id: step.id.clone(),
                signature: step.signature_key(),
                is_virtual: step.is_virtual(),
            })
            .collect();

        // tags a gated patch may add are only conditional for the source
        let profiles: Vec<TagProfile> = content
            .steps
            .iter()
            .map(|step| {
                let patched: Vec<&str> = content
                    .patches_for(&step.id)
                    .flat_map(|p| p.tags.iter().map(String::as_str))
                    .collect();
                TagProfile::of_step(step).with_conditional(&patched)
            })
            .collect();

        let mut linker = Linker {
            nodes: &nodes,
            profiles: &profiles,
            edges: Vec::new(),
            dangling: Vec::new(),
        };
        for (from, step) in content.steps.iter().enumerate() {
            for option in content.options_for(step) {
                let source = profiles[from].clone().with_mutations(&option.tags);
                linker.link(from, &source, &option, None);
            }
        }

        // patch options exist only while the patch is active, so its tags
        // hold for these edges
        for (index, patch) in content.patches.iter().enumerate() {
            let options = resolve_options(patch.options.as_ref(), &content.option_presets);
            if options.is_empty() {
                continue;
            }
            for from in nodes.iter().filter(|n| n.id == patch.target).map(|n| n.index) {
                let active = profiles[from].clone().with_tags(&patch.tags);
                for option in &options {
                    let source = active.clone().with_mutations(&option.tags);
                    linker.link(from, &source, option, Some(index));
                }
            }
        }
        let Linker { edges, dangling, .. } = linker;

        let patches = content
            .patches
            .iter()
            .enumerate()
            .map(|(patch, p)| PatchLink {
                patch,
                name: p.display_name(),
                targets: nodes
                    .iter()
                    .filter(|n| n.id == p.target)
                    .map(|n| n.index)
                    .collect(),
            })
            .collect();

        let start = content.start_location();
        let roots = nodes
            .iter()
            .filter(|n| Some(n.id.as_str()) == start || is_coordinate(&n.id))
            .map(|n| n.index)
            .collect();

        Self {
            nodes,
            edges,
            dangling,
            patches,
            roots,
        }
    }

    /// Edges not proven impossible.
    pub fn live_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(|e| e.is_live())
    }

    /// A copy without the conflicting edges.
    pub fn pruned(&self) -> Self {
        Self {
            edges: self.live_edges().cloned().collect(),
            ..self.clone()
        }
    }

    /// Edges leaving a node.
    pub fn outgoing(&self, node: usize) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.from == node)
    }

    /// Nodes reachable from the roots along live edges.
    pub fn reachable(&self) -> BTreeSet<usize> {
        let mut seen: BTreeSet<usize> = self.roots.iter().copied().collect();
        let mut queue: VecDeque<usize> = self.roots.iter().copied().collect();
        while let Some(node) = queue.pop_front() {
            for edge in self.outgoing(node).filter(|e| e.is_live()) {
                if seen.insert(edge.to) {
                    queue.push_back(edge.to);
                }
            }
        }
        seen
    }

    /// Nodes no path reaches, in index order.
    pub fn unreachable(&self) -> Vec<&Node> {
        let reachable = self.reachable();
        self.nodes
            .iter()
            .filter(|n| !reachable.contains(&n.index))
            .collect()
    }
}
