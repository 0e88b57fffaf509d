use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path};

/// Project-root-relative path with `/` separators, unique per physical file.
pub type FileId = String;

/// Build the identity of `path` relative to `root`, or `None` when the path
/// lies outside the root.
pub fn file_id(root: &Path, path: &Path) -> Option<FileId> {
    let rel = path.strip_prefix(root).ok()?;
    let mut parts = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(p) => parts.push(p.to_string_lossy()),
            Component::CurDir => {}
            _ => return None,
        }
    }
    if parts.is_empty() { None } else { Some(parts.join("/")) }
}

/// Semantic role of a file, decided by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Entry,
    Test,
    Config,
    Type,
    Component,
    Service,
    Utility,
    Page,
    Hook,
    Context,
    Feature,
    Module,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Entry => "entry",
            Role::Test => "test",
            Role::Config => "config",
            Role::Type => "type",
            Role::Component => "component",
            Role::Service => "service",
            Role::Utility => "utility",
            Role::Page => "page",
            Role::Hook => "hook",
            Role::Context => "context",
            Role::Feature => "feature",
            Role::Module => "module",
        }
    }

    /// Entry points and tests have no importers by design.
    pub fn expects_importers(self) -> bool {
        !matches!(self, Role::Entry | Role::Test)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ImportKind {
    #[serde(rename = "static")]
    Static,
    #[serde(rename = "dynamic")]
    Dynamic,
    #[serde(rename = "re-export")]
    ReExport,
}

impl ImportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ImportKind::Static => "static",
            ImportKind::Dynamic => "dynamic",
            ImportKind::ReExport => "re-export",
        }
    }
}

impl fmt::Display for ImportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw import found in source text, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specifier {
    pub request: String,
    pub kind: ImportKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: FileId,
    pub role: Role,
    pub imports: usize,
    pub imported_by: usize,
    pub is_orphaned: bool,
}

impl Node {
    pub fn new(id: FileId, role: Role) -> Self {
        Self { id, role, imports: 0, imported_by: 0, is_orphaned: false }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeTarget {
    /// A file inside the analyzed project
    Internal(FileId),
    /// A package-style reference (`react`, `lodash/fp`)
    External(String),
    /// A relative or aliased path that did not map to any file
    Unresolved(String),
}

/// One import occurrence. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub source: FileId,
    pub target: EdgeTarget,
    pub kind: ImportKind,
    pub request: String,
}

impl Edge {
    pub fn is_external(&self) -> bool {
        !matches!(self.target, EdgeTarget::Internal(_))
    }

    pub fn internal_target(&self) -> Option<&str> {
        match &self.target {
            EdgeTarget::Internal(id) => Some(id),
            _ => None,
        }
    }

    /// Target identity for internal edges, the raw module name otherwise.
    pub fn target_name(&self) -> &str {
        match &self.target {
            EdgeTarget::Internal(id) => id,
            EdgeTarget::External(name) | EdgeTarget::Unresolved(name) => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_file_id_uses_forward_slashes() {
        let root = PathBuf::from("/project");
        let path = root.join("src").join("components").join("Button.tsx");
        assert_eq!(file_id(&root, &path).as_deref(), Some("src/components/Button.tsx"));
    }

    #[test]
    fn test_file_id_outside_root() {
        let root = PathBuf::from("/project");
        assert_eq!(file_id(&root, Path::new("/elsewhere/a.ts")), None);
        assert_eq!(file_id(&root, &root), None);
    }

    #[test]
    fn test_only_entry_and_test_skip_orphan_check() {
        assert!(!Role::Entry.expects_importers());
        assert!(!Role::Test.expects_importers());
        assert!(Role::Component.expects_importers());
        assert!(Role::Module.expects_importers());
    }

    #[test]
    fn test_import_kind_serializes_like_document() {
        assert_eq!(serde_json::to_string(&ImportKind::ReExport).unwrap(), "\"re-export\"");
        assert_eq!(serde_json::to_string(&Role::Utility).unwrap(), "\"utility\"");
    }
}
