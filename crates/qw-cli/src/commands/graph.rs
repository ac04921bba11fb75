use std::path::Path;

use clap::ValueEnum;

use qw_core::{EdgeKind, StepGraph};

/// How the graph is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GraphFormat {
    /// Indented adjacency listing.
    Text,
    /// Graphviz DOT.
    Dot,
    /// The graph as JSON.
    Json,
}

pub fn run(
    path: &Path,
    format: GraphFormat,
    prune: bool,
    output: Option<&Path>,
) -> Result<(), String> {
    let content = super::load(path)?;
    let full = StepGraph::build(&content);
    let graph = if prune { full.pruned() } else { full };

    let rendered = match format {
        GraphFormat::Text => render_text(&graph),
        GraphFormat::Dot => render_dot(&graph),
        GraphFormat::Json => serde_json::to_string_pretty(&graph)
            .map_err(|e| format!("JSON serialization error: {e}"))?,
    };

    if let Some(path) = output {
        std::fs::write(path, &rendered)
            .map_err(|e| format!("cannot write to {}: {e}", path.display()))?;
        println!("  Graph written to {}", path.display());
    } else {
        print!("{rendered}");
    }

    Ok(())
}

fn render_text(graph: &StepGraph) -> String {
    let mut out = String::new();
    for node in &graph.nodes {
        let root = if graph.roots.contains(&node.index) {
            " (root)"
        } else {
            ""
        };
        out.push_str(&format!("  [{}]{root}\n", node.label()));
        for edge in graph.outgoing(node.index) {
            let target = graph.nodes[edge.to].label();
            let kind = match edge.kind {
                EdgeKind::Pass => "",
                EdgeKind::Fail => " (fail)",
            };
            let via = edge
                .patch
                .and_then(|p| graph.patches.iter().find(|l| l.patch == p))
                .map(|l| format!("  via {}", l.name))
                .unwrap_or_default();
            match &edge.conflict {
                None => out.push_str(&format!(
                    "    --{}{kind}--> [{target}]{via}\n",
                    edge.label
                )),
                Some(conflict) => out.push_str(&format!(
                    "    x-{}{kind}-x [{target}]{via}  impossible: {conflict}\n",
                    edge.label
                )),
            }
        }
        for dangling in graph.dangling.iter().filter(|d| d.from == node.index) {
            out.push_str(&format!(
                "    --{}--> ?{} (unknown step)\n",
                dangling.label, dangling.target
            ));
        }
    }

    for link in &graph.patches {
        out.push_str(&format!(
            "  {} patches {} variant(s)\n",
            link.name,
            link.targets.len()
        ));
    }

    let unreachable: Vec<String> = graph.unreachable().iter().map(|n| n.label()).collect();
    if !unreachable.is_empty() {
        out.push_str(&format!("\n  unreachable: {}\n", unreachable.join(", ")));
    }
    out.push_str(&format!(
        "\n  {} nodes, {} edges\n",
        graph.nodes.len(),
        graph.edges.len()
    ));
    out
}

fn render_dot(graph: &StepGraph) -> String {
    let mut out = String::from("digraph quest {\n  rankdir=LR;\n");
    for node in &graph.nodes {
        let shape = if node.is_virtual { "ellipse" } else { "box" };
        out.push_str(&format!(
            "  n{} [label=\"{}\", shape={shape}];\n",
            node.index,
            escape(&node.label())
        ));
    }
    for edge in &graph.edges {
        let mut attrs = vec![format!("label=\"{}\"", escape(&edge.label))];
        if edge.kind == EdgeKind::Fail {
            attrs.push("style=dashed".to_string());
        }
        if edge.patch.is_some() {
            attrs.push("penwidth=2".to_string());
        }
        if !edge.is_live() {
            attrs.push("color=red".to_string());
        }
        out.push_str(&format!(
            "  n{} -> n{} [{}];\n",
            edge.from,
            edge.to,
            attrs.join(", ")
        ));
    }
    for link in &graph.patches {
        out.push_str(&format!(
            "  p{} [label=\"{}\", shape=note];\n",
            link.patch,
            escape(&link.name)
        ));
        for target in &link.targets {
            out.push_str(&format!(
                "  p{} -> n{target} [style=dotted, arrowhead=none];\n",
                link.patch
            ));
        }
    }
    out.push_str("}\n");
    out
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use qw_core::Content;

    fn sample() -> Content {
        Content::from_json(
            r#"{ "config": {}, "steps": [
                { "id": "A1", "tags": ["+lamp"], "options": [
                    "Go \"in\"::cave",
                    { "label": "Climb", "skill": "might", "dc": 12, "pass": "A2", "fail": "cave" }
                ] },
                { "id": "cave", "tags": ["!lamp"] },
                { "id": "A2" },
                { "id": "patch:A2", "append": "!" }
            ] }"#,
        )
        .unwrap()
    }

    #[test]
    fn dot_output() {
        let graph = StepGraph::build(&sample());
        insta::assert_snapshot!(render_dot(&graph), @r#"
        digraph quest {
          rankdir=LR;
          n0 [label="A1", shape=box];
          n1 [label="cave [!lamp]", shape=ellipse];
          n2 [label="A2", shape=box];
          n0 -> n1 [label="Go \"in\"", color=red];
          n0 -> n2 [label="Climb"];
          n0 -> n1 [label="Climb", style=dashed, color=red];
          p0 [label="patch:A2", shape=note];
          p0 -> n2 [style=dotted, arrowhead=none];
        }
        "#);
    }

    #[test]
    fn pruned_text_output() {
        let graph = StepGraph::build(&sample()).pruned();
        let text = render_text(&graph);
        assert!(text.contains("  [A1] (root)\n    --Climb--> [A2]\n"));
        assert!(!text.contains("impossible"));
        assert!(text.contains("unreachable: cave [!lamp]"));
        assert!(text.contains("3 nodes, 1 edges"));
    }

    #[test]
    fn patch_option_edges_are_labelled() {
        let content = Content::from_json(
            r#"{ "config": {}, "steps": [
                { "id": "A1", "tags": ["+map"] },
                { "id": "patch:A1", "tags": ["@map"], "options": ["Dig::treasure"] },
                { "id": "treasure" }
            ] }"#,
        )
        .unwrap();
        let graph = StepGraph::build(&content);
        let text = render_text(&graph);
        assert!(text.contains("    --Dig--> [treasure]  via patch:A1\n"));
        assert!(!text.contains("unreachable"));
        assert!(render_dot(&graph).contains("  n0 -> n1 [label=\"Dig\", penwidth=2];"));
    }

    #[test]
    fn unpruned_text_marks_impossible_edges() {
        let graph = StepGraph::build(&sample());
        let text = render_text(&graph);
        assert!(text.contains("x-Climb (fail)-x [cave [!lamp]]  impossible: source grants 'lamp'"));
    }
}
