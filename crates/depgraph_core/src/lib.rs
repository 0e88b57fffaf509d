//! Core of the depgraph tool.
//!
//! This crate statically derives the module dependency graph of a
//! JavaScript/TypeScript source tree, including:
//! - Discovering and classifying source files
//! - Extracting imports with independent text patterns
//! - Resolving import paths (relative, `@/` alias, extension and index probing)
//! - Aggregating degrees and orphan flags into a [`Graph`]
//! - Analytics over the finished graph and the persisted [`GraphDocument`]
//!
//! ```no_run
//! use depgraph_core::{Config, GraphDocument, analytics, run_analysis};
//!
//! # fn main() -> depgraph_core::Result<()> {
//! let graph = run_analysis(Config::new("/path/to/project"))?;
//! for hub in analytics::hubs(&graph).iter().take(5) {
//!     println!("{} imports {} files", hub.id, hub.imports);
//! }
//! let document = GraphDocument::from_graph(&graph);
//! document.validate()?;
//! # Ok(())
//! # }
//! ```

pub mod analytics;
mod classifier;
mod collector;
mod config;
mod constants;
mod document;
mod error;
mod graph;
mod parser;
mod pipeline;
mod resolver;
mod types;

// Re-export public API
pub use classifier::classify;
pub use collector::{Discovery, SourceFile, collect_files, is_in_scope};
pub use config::{Config, find_git_root};
pub use constants::{DIAGRAM_HUB_THRESHOLD, INDEX_FILES, SOURCE_EXTENSIONS};
pub use document::{EdgeRecord, GraphDocument, NodeRecord, Stats};
pub use error::{AnalyzerError, Result, SkippedFile};
pub use graph::{Graph, GraphBuilder};
pub use parser::{Pattern, extract_imports, imports_for};
pub use pipeline::run_analysis;
pub use resolver::{Resolution, ResolveCache, Resolver};
pub use types::{Edge, EdgeTarget, FileId, ImportKind, Node, Role, Specifier, file_id};
