//! The persisted graph document consumed by reports and diagrams.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{
    error::{AnalyzerError, Result, SkippedFile},
    graph::{Graph, GraphBuilder},
    types::{Edge, EdgeTarget, ImportKind, Node, Role},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub role: Role,
    pub imports: usize,
    pub imported_by: usize,
    pub is_orphaned: bool,
}

/// An internal edge. External edges only appear as a count in [`Stats`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub from_file: String,
    pub to_file: String,
    pub import_type: ImportKind,
    pub import_name: String,
    #[serde(default)]
    pub is_external: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_files: usize,
    pub total_imports: usize,
    pub orphaned_files: usize,
    pub external_dependencies: usize,
    pub entry_points: usize,
    pub file_types: BTreeMap<Role, usize>,
    #[serde(default)]
    pub unresolved_imports: usize,
    #[serde(default)]
    pub skipped_files: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphDocument {
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
    pub stats: Stats,
    pub orphaned_files: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_files: Vec<SkippedFile>,
}

impl GraphDocument {
    pub fn from_graph(graph: &Graph) -> Self {
        let nodes: Vec<NodeRecord> = graph
            .nodes()
            .map(|n| NodeRecord {
                id: n.id.clone(),
                role: n.role,
                imports: n.imports,
                imported_by: n.imported_by,
                is_orphaned: n.is_orphaned,
            })
            .collect();

        let edges: Vec<EdgeRecord> = graph
            .internal_edges()
            .map(|e| EdgeRecord {
                from_file: e.source.clone(),
                to_file: e.target_name().to_string(),
                import_type: e.kind,
                import_name: e.request.clone(),
                is_external: false,
            })
            .collect();

        let orphaned_files: Vec<String> = graph.orphans().map(|n| n.id.clone()).collect();

        let mut file_types = BTreeMap::new();
        for node in graph.nodes() {
            *file_types.entry(node.role).or_insert(0) += 1;
        }

        let stats = Stats {
            total_files: nodes.len(),
            total_imports: edges.len(),
            orphaned_files: orphaned_files.len(),
            external_dependencies: graph.external_edge_count(),
            entry_points: graph.nodes().filter(|n| n.role == Role::Entry).count(),
            file_types,
            unresolved_imports: graph.unresolved_count(),
            skipped_files: graph.skipped().len(),
        };

        Self { nodes, edges, stats, orphaned_files, skipped_files: graph.skipped().to_vec() }
    }

    /// Check the document's own invariants. A failure here is a defect in
    /// resolution or aggregation, never a user error.
    pub fn validate(&self) -> Result<()> {
        let mut ids = std::collections::HashSet::new();
        for node in &self.nodes {
            if !ids.insert(node.id.as_str()) {
                return Err(malformed(format!("duplicate node '{}'", node.id)));
            }
        }
        for edge in &self.edges {
            if edge.is_external {
                return Err(malformed(format!("external edge to '{}' in edge list", edge.to_file)));
            }
            if !ids.contains(edge.from_file.as_str()) || !ids.contains(edge.to_file.as_str()) {
                return Err(malformed(format!(
                    "edge {} -> {} references a missing node",
                    edge.from_file, edge.to_file
                )));
            }
        }
        for orphan in &self.orphaned_files {
            if !self.nodes.iter().any(|n| &n.id == orphan && n.is_orphaned) {
                return Err(malformed(format!("'{}' listed as orphan but not flagged", orphan)));
            }
        }
        if self.stats.total_files != self.nodes.len()
            || self.stats.total_imports != self.edges.len()
            || self.stats.orphaned_files != self.orphaned_files.len()
        {
            return Err(malformed("stats disagree with nodes and edges".to_string()));
        }
        Ok(())
    }
}

fn malformed(msg: String) -> AnalyzerError {
    AnalyzerError::MalformedGraph(msg)
}

impl Graph {
    /// Rebuild a finished graph from a document so consumers can run the
    /// analytics without re-resolving anything. Degrees are recomputed from
    /// the edges and must match the recorded ones.
    pub fn from_document(doc: &GraphDocument) -> Result<Graph> {
        doc.validate()?;

        let mut builder = GraphBuilder::new();
        for record in &doc.nodes {
            builder.add_node(Node::new(record.id.clone(), record.role));
        }
        builder.add_edges(doc.edges.iter().map(|e| Edge {
            source: e.from_file.clone(),
            target: EdgeTarget::Internal(e.to_file.clone()),
            kind: e.import_type,
            request: e.import_name.clone(),
        }));
        for skipped in &doc.skipped_files {
            builder.skip(skipped.clone());
        }

        let mut graph = builder.build()?;
        for record in &doc.nodes {
            let node = graph.node(&record.id);
            if node.map(|n| (n.imports, n.imported_by, n.is_orphaned))
                != Some((record.imports, record.imported_by, record.is_orphaned))
            {
                return Err(malformed(format!(
                    "recorded degrees of '{}' do not match edges",
                    record.id
                )));
            }
        }
        graph.external_count = doc.stats.external_dependencies;
        graph.unresolved_count = doc.stats.unresolved_imports;
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_graph() -> Graph {
        let mut builder = GraphBuilder::new();
        builder.add_node(Node::new("src/main.tsx".into(), Role::Entry));
        builder.add_node(Node::new("src/App.tsx".into(), Role::Module));
        builder.add_node(Node::new("src/utils/helpers.ts".into(), Role::Utility));
        builder.add_edges([
            Edge {
                source: "src/main.tsx".into(),
                target: EdgeTarget::Internal("src/App.tsx".into()),
                kind: ImportKind::Static,
                request: "./App".into(),
            },
            Edge {
                source: "src/App.tsx".into(),
                target: EdgeTarget::External("react".into()),
                kind: ImportKind::Static,
                request: "react".into(),
            },
            Edge {
                source: "src/App.tsx".into(),
                target: EdgeTarget::Unresolved("./Gone".into()),
                kind: ImportKind::Dynamic,
                request: "./Gone".into(),
            },
        ]);
        builder.skip(SkippedFile::new("src/broken.ts", "permission denied"));
        builder.build().unwrap()
    }

    #[test]
    fn test_document_excludes_external_edges() {
        let doc = GraphDocument::from_graph(&sample_graph());
        assert_eq!(doc.edges.len(), 1);
        assert_eq!(doc.edges[0].to_file, "src/App.tsx");
        assert_eq!(doc.stats.external_dependencies, 2);
        assert_eq!(doc.stats.unresolved_imports, 1);
        assert_eq!(doc.stats.entry_points, 1);
        assert_eq!(doc.stats.skipped_files, 1);
        assert_eq!(doc.orphaned_files, vec!["src/utils/helpers.ts"]);
        doc.validate().unwrap();
    }

    #[test]
    fn test_json_keys() {
        let doc = GraphDocument::from_graph(&sample_graph());
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["stats"]["totalFiles"], 3);
        assert_eq!(json["stats"]["externalDependencies"], 2);
        assert_eq!(json["stats"]["fileTypes"]["entry"], 1);
        assert_eq!(json["nodes"][0]["type"], "module");
        assert_eq!(json["nodes"][0]["imported_by"], 1);
        assert_eq!(json["edges"][0]["import_type"], "static");
        assert_eq!(json["orphanedFiles"][0], "src/utils/helpers.ts");
    }

    #[test]
    fn test_document_rebuilds_graph() {
        let graph = sample_graph();
        let doc = GraphDocument::from_graph(&graph);
        let json = serde_json::to_string(&doc).unwrap();
        let parsed: GraphDocument = serde_json::from_str(&json).unwrap();

        let rebuilt = Graph::from_document(&parsed).unwrap();
        assert_eq!(rebuilt.node_count(), graph.node_count());
        assert_eq!(rebuilt.internal_edge_count(), 1);
        assert_eq!(rebuilt.external_edge_count(), 2);
        assert_eq!(rebuilt.skipped().len(), 1);
    }

    #[test]
    fn test_dangling_edge_rejected() {
        let mut doc = GraphDocument::from_graph(&sample_graph());
        doc.edges[0].to_file = "src/Ghost.tsx".into();
        assert!(matches!(doc.validate(), Err(AnalyzerError::MalformedGraph(_))));
    }

    #[test]
    fn test_tampered_degrees_rejected() {
        let mut doc = GraphDocument::from_graph(&sample_graph());
        doc.nodes[0].imported_by = 7;
        assert!(matches!(Graph::from_document(&doc), Err(AnalyzerError::MalformedGraph(_))));
    }
}
