//! Constants for file extensions, resolution order and classification markers.
//!
//! Every list here is ordered: resolution and classification both take the
//! first match, so reordering an entry changes results.

/// Source file extensions that are discovered and analyzed (also the
/// extension probing order used by the resolver)
pub const SOURCE_EXTENSIONS: &[&str] = &[
    "ts",  // TypeScript
    "tsx", // TypeScript with JSX
    "js",  // JavaScript
    "jsx", // JavaScript with JSX
];

/// Index file names to try when resolving directory imports
pub const INDEX_FILES: &[&str] = &["index.ts", "index.tsx", "index.js", "index.jsx"];

/// Default source directory, relative to the project root
pub const DEFAULT_SRC_DIR: &str = "src";

/// Default alias marker, resolved against the source directory
pub const DEFAULT_ALIAS: &str = "@/";

/// File names that mark an application entry point
pub const ENTRY_FILE_NAMES: &[&str] = &["main.ts", "main.tsx", "main.js", "main.jsx"];

/// Path substrings that mark a test file
pub const TEST_MARKERS: &[&str] = &[".test.", ".spec."];

/// Directory names that mark a test file
pub const TEST_DIRS: &[&str] = &["__tests__", "tests"];

/// File name substrings that mark a config/setup file
pub const CONFIG_MARKERS: &[&str] = &["config.", "setup."];

/// File name suffixes that mark a type declaration file
pub const TYPE_SUFFIXES: &[&str] = &[".d.ts", "types.ts", "types.tsx"];

/// Path segment under which feature modules live
pub const FEATURES_SEGMENT: &str = "features";

/// Both degrees above this value flag a circular dependency risk
pub const CIRCULAR_RISK_THRESHOLD: usize = 5;

/// Outgoing imports above this value make a file a decomposition candidate
pub const HEAVY_IMPORTER_THRESHOLD: usize = 20;

/// Incoming imports above this value make a file a critical-path candidate
pub const CRITICAL_DEPENDENCY_THRESHOLD: usize = 15;

/// Test-to-source ratio below which coverage is reported as low
pub const LOW_COVERAGE_RATIO: f64 = 0.3;

/// Outgoing imports above this value pull a file into the diagram
pub const DIAGRAM_HUB_THRESHOLD: usize = 5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_files_follow_extension_order() {
        assert_eq!(INDEX_FILES.len(), SOURCE_EXTENSIONS.len());
        for (index_file, ext) in INDEX_FILES.iter().zip(SOURCE_EXTENSIONS) {
            assert_eq!(*index_file, format!("index.{}", ext));
        }
    }

    #[test]
    fn test_typescript_probed_before_javascript() {
        let ts = SOURCE_EXTENSIONS.iter().position(|e| *e == "ts").unwrap();
        let js = SOURCE_EXTENSIONS.iter().position(|e| *e == "js").unwrap();
        assert!(ts < js);
    }
}
