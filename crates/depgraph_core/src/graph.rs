use log::{debug, info};
use std::collections::BTreeMap;

use crate::{
    error::{AnalyzerError, Result, SkippedFile},
    types::{Edge, EdgeTarget, FileId, Node},
};

/// The finished dependency graph. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    pub(crate) nodes: BTreeMap<FileId, Node>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) external_count: usize,
    pub(crate) unresolved_count: usize,
    pub(crate) skipped: Vec<SkippedFile>,
}

impl Graph {
    /// Nodes ordered by identity
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Every recorded edge, external ones included
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn internal_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(|e| !e.is_external())
    }

    pub fn internal_edge_count(&self) -> usize {
        self.internal_edges().count()
    }

    /// External edges, unresolved fallbacks included
    pub fn external_edge_count(&self) -> usize {
        self.external_count
    }

    /// Relative or aliased imports that fell back to external
    pub fn unresolved_count(&self) -> usize {
        self.unresolved_count
    }

    pub fn orphans(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(|n| n.is_orphaned)
    }

    pub fn skipped(&self) -> &[SkippedFile] {
        &self.skipped
    }

    /// Check the structural invariants: every edge starts at a node, every
    /// internal edge ends at a node, and orphan flags agree with degrees.
    pub fn validate(&self) -> Result<()> {
        for edge in &self.edges {
            if !self.nodes.contains_key(&edge.source) {
                return Err(AnalyzerError::MalformedGraph(format!(
                    "edge source '{}' is not a node",
                    edge.source
                )));
            }
            if let Some(target) = edge.internal_target()
                && !self.nodes.contains_key(target)
            {
                return Err(AnalyzerError::MalformedGraph(format!(
                    "edge {} -> {} points at a missing node",
                    edge.source, target
                )));
            }
        }
        for node in self.nodes.values() {
            let expected = node.imported_by == 0 && node.role.expects_importers();
            if node.is_orphaned != expected {
                return Err(AnalyzerError::MalformedGraph(format!(
                    "orphan flag of '{}' disagrees with its degree",
                    node.id
                )));
            }
        }
        Ok(())
    }
}

/// Collects nodes and edges, then aggregates them into a [`Graph`].
#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: BTreeMap<FileId, Node>,
    edges: Vec<Edge>,
    skipped: Vec<SkippedFile>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: Node) {
        self.nodes.insert(node.id.clone(), node);
    }

    pub fn add_edges(&mut self, edges: impl IntoIterator<Item = Edge>) {
        self.edges.extend(edges);
    }

    pub fn skip(&mut self, skipped: SkippedFile) {
        self.skipped.push(skipped);
    }

    /// Aggregate degrees and orphan flags, then validate. Call only after
    /// every file's edges have been added: degrees are global sums.
    pub fn build(self) -> Result<Graph> {
        let GraphBuilder { mut nodes, edges, skipped } = self;
        aggregate(&mut nodes, &edges);

        let external_count = edges.iter().filter(|e| e.is_external()).count();
        let unresolved_count =
            edges.iter().filter(|e| matches!(e.target, EdgeTarget::Unresolved(_))).count();

        let graph = Graph { nodes, edges, external_count, unresolved_count, skipped };
        graph.validate()?;
        info!(
            "Built graph: {} files, {} internal imports, {} external",
            graph.node_count(),
            graph.internal_edge_count(),
            graph.external_count
        );
        Ok(graph)
    }
}

/// Tally internal in/out degrees and set orphan flags. Idempotent.
pub fn aggregate(nodes: &mut BTreeMap<FileId, Node>, edges: &[Edge]) {
    for node in nodes.values_mut() {
        node.imports = 0;
        node.imported_by = 0;
    }

    for edge in edges {
        let Some(target) = edge.internal_target() else { continue };
        if let Some(source) = nodes.get_mut(&edge.source) {
            source.imports += 1;
        }
        if let Some(target) = nodes.get_mut(target) {
            target.imported_by += 1;
        }
    }

    for node in nodes.values_mut() {
        node.is_orphaned = node.imported_by == 0 && node.role.expects_importers();
    }
    debug!("Aggregated degrees over {} edges", edges.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ImportKind, Role};

    fn edge(source: &str, target: EdgeTarget) -> Edge {
        Edge {
            source: source.to_string(),
            request: target_request(&target),
            target,
            kind: ImportKind::Static,
        }
    }

    fn target_request(target: &EdgeTarget) -> String {
        match target {
            EdgeTarget::Internal(id) => format!("./{}", id),
            EdgeTarget::External(name) | EdgeTarget::Unresolved(name) => name.clone(),
        }
    }

    fn internal(id: &str) -> EdgeTarget {
        EdgeTarget::Internal(id.to_string())
    }

    fn sample_builder() -> GraphBuilder {
        let mut builder = GraphBuilder::new();
        builder.add_node(Node::new("src/main.tsx".into(), Role::Entry));
        builder.add_node(Node::new("src/App.tsx".into(), Role::Module));
        builder.add_node(Node::new("src/Foo.tsx".into(), Role::Module));
        builder.add_node(Node::new("src/utils/helpers.ts".into(), Role::Utility));
        builder.add_node(Node::new("src/App.test.tsx".into(), Role::Test));
        builder.add_edges([
            edge("src/main.tsx", internal("src/App.tsx")),
            edge("src/App.tsx", internal("src/Foo.tsx")),
            edge("src/App.tsx", EdgeTarget::External("react".into())),
            edge("src/App.tsx", EdgeTarget::Unresolved("./gone".into())),
            edge("src/App.test.tsx", internal("src/App.tsx")),
        ]);
        builder
    }

    #[test]
    fn test_degrees_count_internal_only() {
        let graph = sample_builder().build().unwrap();
        let app = graph.node("src/App.tsx").unwrap();
        assert_eq!(app.imports, 1);
        assert_eq!(app.imported_by, 2);
        assert_eq!(graph.node("src/Foo.tsx").unwrap().imported_by, 1);
        assert_eq!(graph.internal_edge_count(), 3);
        assert_eq!(graph.external_edge_count(), 2);
        assert_eq!(graph.unresolved_count(), 1);
        assert_eq!(graph.edges().len(), 5);
    }

    #[test]
    fn test_orphan_flags() {
        let graph = sample_builder().build().unwrap();
        let orphans: Vec<&str> = graph.orphans().map(|n| n.id.as_str()).collect();
        // entry and test files have no importers by design
        assert_eq!(orphans, vec!["src/utils/helpers.ts"]);
        for node in graph.nodes() {
            assert_eq!(
                node.is_orphaned,
                node.imported_by == 0 && node.role != Role::Entry && node.role != Role::Test
            );
        }
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let graph = sample_builder().build().unwrap();
        let mut nodes = graph.nodes.clone();
        aggregate(&mut nodes, &graph.edges);
        aggregate(&mut nodes, &graph.edges);
        assert_eq!(nodes, graph.nodes);
    }

    #[test]
    fn test_dangling_internal_edge_is_fatal() {
        let mut builder = sample_builder();
        builder.add_edges([edge("src/App.tsx", internal("src/Ghost.tsx"))]);
        assert!(matches!(builder.build(), Err(AnalyzerError::MalformedGraph(_))));
    }

    #[test]
    fn test_unknown_source_is_fatal() {
        let mut builder = sample_builder();
        builder.add_edges([edge("src/Nobody.tsx", EdgeTarget::External("react".into()))]);
        assert!(matches!(builder.build(), Err(AnalyzerError::MalformedGraph(_))));
    }

    #[test]
    fn test_nodes_ordered_by_identity() {
        let graph = sample_builder().build().unwrap();
        let ids: Vec<&str> = graph.nodes().map(|n| n.id.as_str()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }
}
