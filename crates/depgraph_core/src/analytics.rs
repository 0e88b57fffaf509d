//! Read-only queries over a finished [`Graph`].
//!
//! Rankings break ties by identity so that output is deterministic.

use petgraph::{algo::tarjan_scc, graph::DiGraph};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::{
    constants::{
        CIRCULAR_RISK_THRESHOLD, CRITICAL_DEPENDENCY_THRESHOLD, FEATURES_SEGMENT,
        HEAVY_IMPORTER_THRESHOLD, LOW_COVERAGE_RATIO,
    },
    graph::Graph,
    types::{Edge, FileId, ImportKind, Node, Role},
};

/// Nodes by outgoing imports, descending.
pub fn hubs(graph: &Graph) -> Vec<&Node> {
    ranked_by(graph, |n| n.imports)
}

/// Nodes by incoming imports, descending.
pub fn critical_dependencies(graph: &Graph) -> Vec<&Node> {
    ranked_by(graph, |n| n.imported_by)
}

fn ranked_by(graph: &Graph, key: impl Fn(&Node) -> usize) -> Vec<&Node> {
    let mut nodes: Vec<&Node> = graph.nodes().collect();
    nodes.sort_by(|a, b| key(b).cmp(&key(a)).then_with(|| a.id.cmp(&b.id)));
    nodes
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskCandidate {
    pub id: FileId,
    pub imports: usize,
    pub imported_by: usize,
    pub total: usize,
}

/// Files whose in- and out-degree both exceed the threshold.
///
/// Only a connectivity shape; see [`strongly_connected_components`] for
/// actual cycles.
pub fn circular_risk(graph: &Graph) -> Vec<RiskCandidate> {
    let mut candidates: Vec<RiskCandidate> = graph
        .nodes()
        .filter(|n| n.imports > CIRCULAR_RISK_THRESHOLD && n.imported_by > CIRCULAR_RISK_THRESHOLD)
        .map(|n| RiskCandidate {
            id: n.id.clone(),
            imports: n.imports,
            imported_by: n.imported_by,
            total: n.imports + n.imported_by,
        })
        .collect();
    candidates.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.id.cmp(&b.id)));
    candidates
}

/// Import cycles: strongly connected components of the internal edges with
/// more than one file, plus files that import themselves.
pub fn strongly_connected_components(graph: &Graph) -> Vec<Vec<FileId>> {
    let mut g: DiGraph<&str, ()> = DiGraph::new();
    let mut index = HashMap::new();
    for node in graph.nodes() {
        index.insert(node.id.as_str(), g.add_node(node.id.as_str()));
    }
    for edge in graph.internal_edges() {
        if let (Some(&a), Some(target)) = (index.get(edge.source.as_str()), edge.internal_target())
            && let Some(&b) = index.get(target)
        {
            g.update_edge(a, b, ());
        }
    }

    let mut cycles: Vec<Vec<FileId>> = tarjan_scc(&g)
        .into_iter()
        .filter(|scc| scc.len() > 1 || g.contains_edge(scc[0], scc[0]))
        .map(|scc| {
            let mut ids: Vec<FileId> = scc.into_iter().map(|ix| g[ix].to_string()).collect();
            ids.sort();
            ids
        })
        .collect();
    cycles.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    cycles
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureModule {
    pub name: String,
    pub file_count: usize,
    pub avg_imports: f64,
    pub avg_imported_by: f64,
}

/// Group files under `.../features/<name>/...` by `<name>`, largest first.
pub fn feature_modules(graph: &Graph) -> Vec<FeatureModule> {
    let mut groups: BTreeMap<&str, Vec<&Node>> = BTreeMap::new();
    for node in graph.nodes() {
        if let Some(name) = feature_name(&node.id) {
            groups.entry(name).or_default().push(node);
        }
    }

    let mut modules: Vec<FeatureModule> = groups
        .into_iter()
        .map(|(name, files)| {
            let count = files.len() as f64;
            FeatureModule {
                name: name.to_string(),
                file_count: files.len(),
                avg_imports: files.iter().map(|f| f.imports).sum::<usize>() as f64 / count,
                avg_imported_by: files.iter().map(|f| f.imported_by).sum::<usize>() as f64 / count,
            }
        })
        .collect();
    modules.sort_by(|a, b| b.file_count.cmp(&a.file_count).then_with(|| a.name.cmp(&b.name)));
    modules
}

/// The directory right after a `features` segment. A file sitting directly
/// in `features/` belongs to no feature.
pub fn feature_name(id: &str) -> Option<&str> {
    let segments: Vec<&str> = id.split('/').collect();
    let pos = segments.iter().position(|s| *s == FEATURES_SEGMENT)?;
    // needs a directory segment and a file after it
    if pos + 2 < segments.len() { Some(segments[pos + 1]) } else { None }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Share<T> {
    pub label: T,
    pub count: usize,
    pub percentage: f64,
}

fn shares<T: Ord + Copy>(counts: BTreeMap<T, usize>, total: usize) -> Vec<Share<T>> {
    let mut out: Vec<Share<T>> = counts
        .into_iter()
        .map(|(label, count)| Share {
            label,
            count,
            percentage: if total == 0 { 0.0 } else { count as f64 * 100.0 / total as f64 },
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    out
}

/// Node count and percentage per role.
pub fn role_distribution(graph: &Graph) -> Vec<Share<Role>> {
    let mut counts = BTreeMap::new();
    for node in graph.nodes() {
        *counts.entry(node.role).or_insert(0) += 1;
    }
    shares(counts, graph.node_count())
}

/// Edge count and percentage per import kind, external edges included.
pub fn import_kind_distribution(graph: &Graph) -> Vec<Share<ImportKind>> {
    kind_shares(graph.edges().iter())
}

/// Same as [`import_kind_distribution`], restricted to edges between project
/// files. A graph rebuilt from a document only has these.
pub fn import_kind_distribution_internal(graph: &Graph) -> Vec<Share<ImportKind>> {
    kind_shares(graph.internal_edges())
}

fn kind_shares<'g>(edges: impl Iterator<Item = &'g Edge>) -> Vec<Share<ImportKind>> {
    let mut counts = BTreeMap::new();
    let mut total = 0;
    for edge in edges {
        *counts.entry(edge.kind).or_insert(0) += 1;
        total += 1;
    }
    shares(counts, total)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coverage {
    pub tests: usize,
    pub sources: usize,
    pub ratio: f64,
    pub low: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendations {
    /// More than 20 outgoing imports, most first
    pub decomposition: Vec<FileId>,
    /// More than 15 incoming imports, most first
    pub critical_paths: Vec<FileId>,
    /// Components nobody imports
    pub dead_components: Vec<FileId>,
    pub coverage: Coverage,
}

pub fn recommendations(graph: &Graph) -> Recommendations {
    let decomposition = hubs(graph)
        .into_iter()
        .filter(|n| n.imports > HEAVY_IMPORTER_THRESHOLD)
        .map(|n| n.id.clone())
        .collect();
    let critical_paths = critical_dependencies(graph)
        .into_iter()
        .filter(|n| n.imported_by > CRITICAL_DEPENDENCY_THRESHOLD)
        .map(|n| n.id.clone())
        .collect();
    let dead_components = graph
        .nodes()
        .filter(|n| n.role == Role::Component && n.imported_by == 0)
        .map(|n| n.id.clone())
        .collect();

    let tests = graph.nodes().filter(|n| n.role == Role::Test).count();
    let sources = graph
        .nodes()
        .filter(|n| matches!(n.role, Role::Component | Role::Service | Role::Utility | Role::Hook))
        .count();
    let ratio = if sources == 0 { 0.0 } else { tests as f64 / sources as f64 };

    Recommendations {
        decomposition,
        critical_paths,
        dead_components,
        coverage: Coverage { tests, sources, ratio, low: ratio < LOW_COVERAGE_RATIO },
    }
}
