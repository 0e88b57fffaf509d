use anyhow::{Context, Result};
use log::{debug, info};
use std::{
    fs,
    path::{Path, PathBuf},
};

use depgraph_core::GraphDocument;

pub const DOCUMENT_FILE: &str = "dep-graph.json";
pub const DIAGRAM_FILE: &str = "dep-graph.mmd";

/// Paths written by [`write_outputs`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Written {
    pub document: PathBuf,
    pub diagram: Option<PathBuf>,
}

/// Write the graph document and, when given, the Mermaid diagram into `dir`.
///
/// Both are serialized in full before anything touches the disk.
pub fn write_outputs(
    dir: &Path,
    document: &GraphDocument,
    diagram: Option<&str>,
) -> Result<Written> {
    let json =
        serde_json::to_string_pretty(document).context("Failed to serialize graph document")?;

    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let document_path = dir.join(DOCUMENT_FILE);
    fs::write(&document_path, json)
        .with_context(|| format!("Failed to write {}", document_path.display()))?;
    info!("Wrote {}", document_path.display());

    let diagram_path = match diagram {
        Some(diagram) => {
            let path = dir.join(DIAGRAM_FILE);
            fs::write(&path, diagram)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {}", path.display());
            Some(path)
        }
        None => None,
    };

    Ok(Written { document: document_path, diagram: diagram_path })
}

/// Read a previously written document and check its invariants.
pub fn load_document(path: &Path) -> Result<GraphDocument> {
    debug!("Loading graph document from {}", path.display());
    let raw =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let document: GraphDocument = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a graph document", path.display()))?;
    document.validate().with_context(|| format!("{} is inconsistent", path.display()))?;
    Ok(document)
}
