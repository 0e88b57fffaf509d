//! Outputs of the depgraph tool.
//!
//! Consumers of a finished graph: the persisted JSON document, the Mermaid
//! diagram and the human-readable report. Nothing here resolves imports.
//!
//! ```no_run
//! use depgraph_core::{Config, GraphDocument, run_analysis};
//! use depgraph_report::{render_mermaid, write_outputs};
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let graph = run_analysis(Config::new("/path/to/project"))?;
//! let document = GraphDocument::from_graph(&graph);
//! document.validate()?;
//! write_outputs(Path::new("."), &document, Some(&render_mermaid(&graph)))?;
//! # Ok(())
//! # }
//! ```

mod mermaid;
mod output;
mod reporter;

// Re-export public API
pub use mermaid::render_mermaid;
pub use output::{DIAGRAM_FILE, DOCUMENT_FILE, Written, load_document, write_outputs};
pub use reporter::{print_report, print_summary};
