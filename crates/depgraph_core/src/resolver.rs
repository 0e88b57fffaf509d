use dashmap::DashMap;
use log::{debug, trace};
use path_clean::clean;
use std::path::{Path, PathBuf};

use crate::{
    collector::{has_source_extension, is_in_scope, is_regular_file},
    config::Config,
    constants::{INDEX_FILES, SOURCE_EXTENSIONS},
    error::Result,
    types::{FileId, file_id},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Resolved to an analyzed file
    Internal(FileId),
    /// Package-style request, never looked up on disk
    External,
    /// Relative or aliased request that matched no file; counted as external
    Unresolved,
}

/// Maps raw import requests to project files.
///
/// Resolution depends only on the request, the declaring file and what
/// exists on disk, so results may be memoized per run and computed from any
/// thread in any order.
#[derive(Debug, Clone)]
pub struct Resolver {
    root: PathBuf,
    src_root: PathBuf,
    alias: String,
}

pub type ResolveCache = DashMap<(PathBuf, String), Resolution>;

impl Resolver {
    pub fn new(cfg: &Config) -> Result<Self> {
        Ok(Self {
            root: cfg.root()?.to_path_buf(),
            src_root: cfg.src_root()?,
            alias: cfg.alias.clone(),
        })
    }

    pub fn resolve(&self, from_file: &Path, request: &str) -> Resolution {
        trace!("Resolving: '{}' from {}", request, from_file.display());

        let candidate = if is_relative(request) {
            let base = from_file.parent().unwrap_or(&self.root);
            clean(base.join(request))
        } else if let Some(rest) = self.strip_alias(request) {
            trace!("Resolving '{}' against source root", request);
            clean(self.src_root.join(rest.trim_start_matches('/')))
        } else {
            trace!("Treating '{}' as external package", request);
            return Resolution::External;
        };

        if !candidate.starts_with(&self.root) {
            debug!("Import '{}' escapes the project root", request);
            return Resolution::Unresolved;
        }

        match self.probe(&candidate).and_then(|p| file_id(&self.root, &p)) {
            Some(id) => {
                trace!("Resolved '{}' to {}", request, id);
                Resolution::Internal(id)
            }
            None => {
                debug!("Failed to resolve '{}' from {}", request, from_file.display());
                Resolution::Unresolved
            }
        }
    }

    /// Memoized [`Resolver::resolve`]. Keyed by the declaring directory since
    /// that is all resolution looks at.
    pub fn resolve_cached(
        &self,
        from_file: &Path,
        request: &str,
        cache: &ResolveCache,
    ) -> Resolution {
        let dir = from_file.parent().unwrap_or(&self.root).to_path_buf();
        let key = (dir, request.to_string());
        if let Some(v) = cache.get(&key) {
            trace!("Cache hit for resolve: '{}' from {}", request, from_file.display());
            return v.clone();
        }
        let resolved = self.resolve(from_file, request);
        cache.insert(key, resolved.clone());
        resolved
    }

    fn strip_alias<'r>(&self, request: &'r str) -> Option<&'r str> {
        if self.alias.is_empty() { None } else { request.strip_prefix(self.alias.as_str()) }
    }

    fn probe(&self, candidate: &Path) -> Option<PathBuf> {
        if has_source_extension(candidate) {
            // Explicit extension: './Button.tsx'
            if self.is_analyzed_file(candidate) {
                return Some(candidate.to_path_buf());
            }
            // ESM-style './Button.js' written against './Button.ts'
            for ext in SOURCE_EXTENSIONS {
                let p = candidate.with_extension(ext);
                if self.is_analyzed_file(&p) {
                    trace!("Substituted extension: {}", p.display());
                    return Some(p);
                }
            }
        }

        // Try adding extensions, in priority order
        for ext in SOURCE_EXTENSIONS {
            let mut with_ext = candidate.as_os_str().to_owned();
            with_ext.push(".");
            with_ext.push(ext);
            let p = PathBuf::from(with_ext);
            if self.is_analyzed_file(&p) {
                return Some(p);
            }
        }

        // Try index files
        if candidate.is_dir() {
            for index_file in INDEX_FILES {
                let p = candidate.join(index_file);
                if self.is_analyzed_file(&p) {
                    return Some(p);
                }
            }
        }

        None
    }

    fn is_analyzed_file(&self, p: &Path) -> bool {
        is_in_scope(&self.root, &self.src_root, p) && is_regular_file(&self.root, p)
    }
}

pub fn is_relative(request: &str) -> bool {
    request == "." || request == ".." || request.starts_with("./") || request.starts_with("../")
}
