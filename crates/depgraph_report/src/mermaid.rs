//! Mermaid diagram of the most relevant part of the graph.
//!
//! Only entry points, the files they import directly and hubs are drawn;
//! a full project graph is unreadable as a diagram.

use log::debug;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use depgraph_core::{DIAGRAM_HUB_THRESHOLD, Graph, ImportKind, Role, SOURCE_EXTENSIONS};

pub fn render_mermaid(graph: &Graph) -> String {
    let entries: BTreeSet<&str> =
        graph.nodes().filter(|n| n.role == Role::Entry).map(|n| n.id.as_str()).collect();

    let mut important: BTreeSet<&str> = entries.clone();
    for edge in graph.internal_edges() {
        if entries.contains(edge.source.as_str())
            && let Some(target) = edge.internal_target()
        {
            important.insert(target);
        }
    }
    important.extend(
        graph.nodes().filter(|n| n.imports > DIAGRAM_HUB_THRESHOLD).map(|n| n.id.as_str()),
    );
    debug!("Rendering {} of {} files in diagram", important.len(), graph.node_count());

    let mut lines = vec!["graph TD".to_string()];
    let mut ids: BTreeMap<&str, String> = BTreeMap::new();
    for (i, &file) in important.iter().enumerate() {
        let node_id = format!("N{}", i);
        let label = display_name(file).replace('"', "#quot;");
        let shape = match graph.node(file).map(|n| n.role) {
            Some(Role::Entry) => format!("[[\"{}\"]]", label),
            Some(Role::Component) => format!("((\"{}\"))", label),
            _ => format!("[\"{}\"]", label),
        };
        lines.push(format!("    {}{}", node_id, shape));
        ids.insert(file, node_id);
    }

    let mut seen = HashSet::new();
    for edge in graph.internal_edges() {
        let Some(target) = edge.internal_target() else { continue };
        if let (Some(from), Some(to)) = (ids.get(edge.source.as_str()), ids.get(target)) {
            let arrow = if edge.kind == ImportKind::Dynamic { "-.->" } else { "-->" };
            let line = format!("    {} {} {}", from, arrow, to);
            if seen.insert(line.clone()) {
                lines.push(line);
            }
        }
    }

    lines.join("\n")
}

/// `src/components/Button.tsx` -> `components/Button`
fn display_name(id: &str) -> &str {
    let name = id.strip_prefix("src/").unwrap_or(id);
    SOURCE_EXTENSIONS
        .iter()
        .find_map(|ext| name.strip_suffix(ext).and_then(|n| n.strip_suffix('.')))
        .unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use depgraph_core::{Edge, EdgeTarget, GraphBuilder, Node};

    fn link(builder: &mut GraphBuilder, from: &str, to: &str, kind: ImportKind) {
        builder.add_edges([Edge {
            source: from.to_string(),
            target: EdgeTarget::Internal(to.to_string()),
            kind,
            request: String::new(),
        }]);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("src/components/Button.tsx"), "components/Button");
        assert_eq!(display_name("main.ts"), "main");
        assert_eq!(display_name("src/a.js"), "a");
    }

    #[test]
    fn test_dynamic_edges_are_dashed() {
        let mut b = GraphBuilder::new();
        b.add_node(Node::new("src/main.tsx".into(), Role::Entry));
        b.add_node(Node::new("src/App.tsx".into(), Role::Module));
        b.add_node(Node::new("src/components/Lazy.tsx".into(), Role::Component));
        link(&mut b, "src/main.tsx", "src/App.tsx", ImportKind::Static);
        link(&mut b, "src/main.tsx", "src/components/Lazy.tsx", ImportKind::Dynamic);
        let graph = b.build().unwrap();

        let diagram = render_mermaid(&graph);
        let lines: Vec<&str> = diagram.lines().collect();
        assert_eq!(lines[0], "graph TD");
        // N0 = src/App.tsx, N1 = src/components/Lazy.tsx, N2 = src/main.tsx
        assert!(lines.contains(&"    N0[\"App\"]"));
        assert!(lines.contains(&"    N1((\"components/Lazy\"))"));
        assert!(lines.contains(&"    N2[[\"main\"]]"));
        assert!(lines.contains(&"    N2 --> N0"));
        assert!(lines.contains(&"    N2 -.-> N1"));
    }

    #[test]
    fn test_only_entries_dependents_and_hubs() {
        let mut b = GraphBuilder::new();
        b.add_node(Node::new("src/main.tsx".into(), Role::Entry));
        b.add_node(Node::new("src/App.tsx".into(), Role::Module));
        b.add_node(Node::new("src/deep/Leaf.tsx".into(), Role::Module));
        b.add_node(Node::new("src/Hub.tsx".into(), Role::Module));
        link(&mut b, "src/main.tsx", "src/App.tsx", ImportKind::Static);
        link(&mut b, "src/App.tsx", "src/deep/Leaf.tsx", ImportKind::Static);
        for i in 0..6 {
            let id = format!("src/parts/P{}.ts", i);
            b.add_node(Node::new(id.clone(), Role::Module));
            link(&mut b, "src/Hub.tsx", &id, ImportKind::Static);
        }
        let graph = b.build().unwrap();

        let diagram = render_mermaid(&graph);
        assert!(diagram.contains("\"App\""));
        assert!(diagram.contains("\"Hub\""));
        assert!(!diagram.contains("Leaf"));
        assert!(!diagram.contains("parts/P0"));
    }
}
