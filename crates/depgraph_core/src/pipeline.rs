use dashmap::DashMap;
use log::{debug, info, warn};
use rayon::prelude::*;

use crate::{
    classifier::classify,
    collector::collect_files,
    config::Config,
    error::{Result, SkippedFile},
    graph::{Graph, GraphBuilder},
    parser::imports_for,
    resolver::{Resolution, ResolveCache, Resolver},
    types::{Edge, EdgeTarget, FileId, Node},
};

/// Discover, classify, extract, resolve and aggregate.
///
/// File texts and resolutions are cached for this call only. A file that
/// cannot be read is skipped and reported on the graph; configuration
/// errors and graph inconsistencies abort the run.
pub fn run_analysis(mut cfg: Config) -> Result<Graph> {
    info!("Starting dependency graph analysis");
    cfg.initialize()?;

    let discovery = collect_files(&cfg)?;
    info!("Found {} source files", discovery.files.len());

    let mut builder = GraphBuilder::new();
    for file in &discovery.files {
        builder.add_node(Node::new(file.id.clone(), classify(&file.id)));
    }
    for skipped in discovery.skipped {
        builder.skip(skipped);
    }

    let resolver = Resolver::new(&cfg)?;
    let sources: DashMap<FileId, String> = DashMap::new();
    let resolve_cache = ResolveCache::new();

    info!("Extracting imports from {} files", discovery.files.len());
    let per_file: Vec<std::result::Result<Vec<Edge>, SkippedFile>> = discovery
        .files
        .par_iter()
        .map(|file| {
            let specs = match imports_for(file, &sources) {
                Ok(specs) => specs,
                Err(e) => {
                    warn!("Skipping {}: {}", file.id, e);
                    return Err(SkippedFile::new(file.id.clone(), e));
                }
            };

            let edges = specs
                .into_iter()
                .map(|spec| {
                    let target =
                        match resolver.resolve_cached(&file.path, &spec.request, &resolve_cache) {
                            Resolution::Internal(id) => EdgeTarget::Internal(id),
                            Resolution::External => EdgeTarget::External(spec.request.clone()),
                            Resolution::Unresolved => EdgeTarget::Unresolved(spec.request.clone()),
                        };
                    Edge { source: file.id.clone(), target, kind: spec.kind, request: spec.request }
                })
                .collect();
            Ok(edges)
        })
        .collect();

    for result in per_file {
        match result {
            Ok(edges) => builder.add_edges(edges),
            Err(skipped) => builder.skip(skipped),
        }
    }
    debug!(
        "Cache statistics: sources={}, resolutions={}",
        sources.len(),
        resolve_cache.len()
    );

    let graph = builder.build()?;
    info!(
        "Analysis complete: {} files, {} internal imports, {} unresolved, {} skipped",
        graph.node_count(),
        graph.internal_edge_count(),
        graph.unresolved_count(),
        graph.skipped().len()
    );
    Ok(graph)
}
