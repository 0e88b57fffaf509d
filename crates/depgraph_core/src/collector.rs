use ignore::WalkBuilder;
use log::{debug, trace, warn};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use crate::{
    config::Config,
    constants::SOURCE_EXTENSIONS,
    error::{Result, SkippedFile},
    types::{FileId, file_id},
};

/// A discovered source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub id: FileId,
    pub path: PathBuf,
}

#[derive(Debug, Default)]
pub struct Discovery {
    /// Deduplicated, ordered by identity
    pub files: Vec<SourceFile>,
    pub skipped: Vec<SkippedFile>,
}

pub fn has_source_extension(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()).is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

/// Whether `path` belongs to the analyzed file set: a source extension and
/// either anywhere under the source directory or directly in the root.
///
/// Discovery and resolution share this predicate and [`is_regular_file`], so
/// a resolved import can never point at a file that has no node.
pub fn is_in_scope(root: &Path, src_root: &Path, path: &Path) -> bool {
    has_source_extension(path) && (path.starts_with(src_root) || path.parent() == Some(root))
}

/// Whether `path` or any directory between it and `root` is a symbolic link.
///
/// Discovery never follows links, so a file reached through one has no node.
pub fn passes_through_link(root: &Path, path: &Path) -> bool {
    path.ancestors()
        .take_while(|a| *a != root && a.starts_with(root))
        .any(|a| fs::symlink_metadata(a).is_ok_and(|m| m.file_type().is_symlink()))
}

/// A regular file, reached without following any link below `root`.
pub fn is_regular_file(root: &Path, path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|m| m.is_file()) && !passes_through_link(root, path)
}

pub fn collect_files(cfg: &Config) -> Result<Discovery> {
    debug!("Collecting source files");
    let root = cfg.root()?;
    let src_root = cfg.src_root()?;

    let mut found: BTreeMap<FileId, PathBuf> = BTreeMap::new();
    let mut skipped = Vec::new();

    // Source tree recursively, then root-level files such as a top-level main.ts
    for (dir, max_depth) in [(src_root.as_path(), None), (root, Some(1))] {
        if passes_through_link(root, dir) {
            warn!("Skipping {}: symbolic links are not followed", dir.display());
            skipped.push(SkippedFile::new(dir.display().to_string(), "symbolic link"));
            continue;
        }
        if let Err(e) = fs::read_dir(dir) {
            warn!("Skipping unreadable directory {}: {}", dir.display(), e);
            skipped.push(SkippedFile::new(dir.display().to_string(), e));
            continue;
        }

        debug!("Walking directory tree from: {}", dir.display());
        let walker = WalkBuilder::new(dir)
            .standard_filters(false)
            .follow_links(false)
            .max_depth(max_depth)
            .build();

        for res in walker {
            let dent = match res {
                Ok(dent) => dent,
                Err(e) => {
                    warn!("Skipping unreadable entry under {}: {}", dir.display(), e);
                    skipped.push(SkippedFile::new(dir.display().to_string(), e));
                    continue;
                }
            };
            if !dent.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let p = dent.path();
            if !is_in_scope(root, &src_root, p) {
                continue;
            }
            if let Some(id) = file_id(root, p) {
                trace!("Found source file: {}", id);
                found.entry(id).or_insert_with(|| p.to_path_buf());
            }
        }
    }

    let files: Vec<SourceFile> =
        found.into_iter().map(|(id, path)| SourceFile { id, path }).collect();
    debug!("Collected {} source files ({} skipped)", files.len(), skipped.len());
    Ok(Discovery { files, skipped })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, path: &str, content: &str) -> PathBuf {
        let file_path = dir.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    fn initialized(root: &Path) -> Config {
        let mut cfg = Config::new(root);
        cfg.initialize().unwrap();
        cfg
    }

    fn ids(discovery: &Discovery) -> Vec<&str> {
        discovery.files.iter().map(|f| f.id.as_str()).collect()
    }

    #[test]
    fn test_collects_sorted_source_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "src/utils/b.ts", "");
        create_test_file(root, "src/App.tsx", "");
        create_test_file(root, "src/a.js", "");
        create_test_file(root, "src/styles.css", "");

        let discovery = collect_files(&initialized(root)).unwrap();
        assert_eq!(ids(&discovery), vec!["src/App.tsx", "src/a.js", "src/utils/b.ts"]);
        assert!(discovery.skipped.is_empty());
    }

    #[test]
    fn test_includes_root_level_files_only_at_top() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "main.ts", "");
        create_test_file(root, "scripts/build.ts", "");
        create_test_file(root, "src/index.ts", "");

        let discovery = collect_files(&initialized(root)).unwrap();
        assert_eq!(ids(&discovery), vec!["main.ts", "src/index.ts"]);
    }

    #[test]
    fn test_no_duplicates_when_src_is_root() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "a.ts", "");
        create_test_file(root, "nested/b.ts", "");

        let mut cfg = Config::new(root);
        cfg.src_dir = PathBuf::from(".");
        cfg.initialize().unwrap();

        let discovery = collect_files(&cfg).unwrap();
        assert_eq!(ids(&discovery), vec!["a.ts", "nested/b.ts"]);
    }

    #[test]
    fn test_unreadable_source_dir_does_not_abort() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "main.ts", "");
        create_test_file(root, "src/App.tsx", "");
        let cfg = initialized(root);
        fs::remove_dir_all(root.join("src")).unwrap();

        let discovery = collect_files(&cfg).unwrap();
        assert_eq!(ids(&discovery), vec!["main.ts"]);
        assert_eq!(discovery.skipped.len(), 1);
        assert!(discovery.skipped[0].path.ends_with("src"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_not_collected() {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "src/real.ts", "");
        let outside = create_test_file(root, "shared/util.ts", "");
        create_test_file(root, "packages/shared/index.ts", "");
        symlink(&outside, root.join("src/util.ts")).unwrap();
        symlink(root.join("packages/shared"), root.join("src/shared")).unwrap();

        let cfg = initialized(root);
        let discovery = collect_files(&cfg).unwrap();
        assert_eq!(ids(&discovery), vec!["src/real.ts"]);

        let root = cfg.root().unwrap();
        assert!(is_regular_file(root, &root.join("src/real.ts")));
        assert!(!is_regular_file(root, &root.join("src/util.ts")));
        assert!(!is_regular_file(root, &root.join("src/shared/index.ts")));
        assert!(passes_through_link(root, &root.join("src/shared/index.ts")));
        assert!(!passes_through_link(root, &root.join("src/real.ts")));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_source_dir_is_skipped() {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "app/App.tsx", "");
        symlink(root.join("app"), root.join("src")).unwrap();

        let discovery = collect_files(&initialized(root)).unwrap();
        assert!(discovery.files.is_empty());
        assert_eq!(discovery.skipped.len(), 1);
        assert_eq!(discovery.skipped[0].reason, "symbolic link");
    }

    #[test]
    fn test_scope_predicate() {
        let root = Path::new("/p");
        let src = Path::new("/p/src");
        assert!(is_in_scope(root, src, Path::new("/p/src/deep/x.tsx")));
        assert!(is_in_scope(root, src, Path::new("/p/vite.config.ts")));
        assert!(!is_in_scope(root, src, Path::new("/p/scripts/x.ts")));
        assert!(!is_in_scope(root, src, Path::new("/p/src/x.css")));
    }
}
