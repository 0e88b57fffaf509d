//! Text-pattern import extraction.
//!
//! Each import syntax is an isolated rule with its own regex and provisional
//! kind. Rules run independently over the whole text; nothing here builds a
//! syntax tree, so odd formatting simply yields no record.

use dashmap::DashMap;
use log::{debug, trace};
use regex::Regex;
use std::{fs, ops::Range, sync::LazyLock};

use crate::{
    collector::SourceFile,
    error::{AnalyzerError, Result},
    types::{FileId, ImportKind, Specifier},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pattern {
    /// `import x from './x'`, `import './side-effect'`
    StaticImport,
    /// `import('./x')`
    DynamicImport,
    /// `React.lazy(() => import('./x'))`
    LazyImport,
    /// `require('./x')`
    Require,
    /// `export { x } from './x'`, `export * from './x'`
    ReExport,
}

pub struct Rule {
    pub pattern: Pattern,
    pub kind: ImportKind,
    regex: Regex,
}

/// A single rule match: byte span of the construct plus the quoted path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch {
    pub span: Range<usize>,
    pub request: String,
}

impl Rule {
    fn new(pattern: Pattern, kind: ImportKind, re: &str) -> Self {
        let regex = Regex::new(re).unwrap_or_else(|e| panic!("invalid {:?} regex: {}", pattern, e));
        Self { pattern, kind, regex }
    }

    pub fn find_all(&self, src: &str) -> Vec<RuleMatch> {
        self.regex
            .captures_iter(src)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let request = caps.get(1)?;
                Some(RuleMatch { span: whole.range(), request: request.as_str().to_string() })
            })
            .collect()
    }
}

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new(
            Pattern::StaticImport,
            ImportKind::Static,
            r#"\bimport\s+(?:[\w$*{}\s,]+?\s+from\s+)?['"]([^'"\n]+)['"]"#,
        ),
        Rule::new(
            Pattern::DynamicImport,
            ImportKind::Dynamic,
            r#"\bimport\s*\(\s*['"]([^'"\n]+)['"]\s*\)"#,
        ),
        Rule::new(
            Pattern::LazyImport,
            ImportKind::Dynamic,
            r#"\b(?:React\.)?lazy\s*\(\s*(?:async\s*)?\(\s*\)\s*=>\s*import\s*\(\s*['"]([^'"\n]+)['"]\s*\)"#,
        ),
        Rule::new(
            Pattern::Require,
            ImportKind::Static,
            r#"\brequire\s*\(\s*['"]([^'"\n]+)['"]\s*\)"#,
        ),
        Rule::new(
            Pattern::ReExport,
            ImportKind::ReExport,
            r#"\bexport\s+(?:type\s+)?(?:\{[^}]*\}|\*(?:\s+as\s+[\w$]+)?)\s+from\s+['"]([^'"\n]+)['"]"#,
        ),
    ]
});

pub fn rules() -> &'static [Rule] {
    &RULES
}

/// Rules are stored in [`Pattern`] declaration order.
pub fn rule(pattern: Pattern) -> &'static Rule {
    &RULES[pattern as usize]
}

/// Extract raw imports from source text, in source order.
pub fn extract_imports(src: &str) -> Vec<Specifier> {
    // The import() inside a lazy wrapper is the same construct, not a second one
    let lazy_spans: Vec<Range<usize>> =
        rule(Pattern::LazyImport).find_all(src).into_iter().map(|m| m.span).collect();

    let mut found: Vec<(usize, Specifier)> = Vec::new();
    for rule in rules() {
        for m in rule.find_all(src) {
            if rule.pattern == Pattern::DynamicImport
                && lazy_spans.iter().any(|s| s.start <= m.span.start && m.span.end <= s.end)
            {
                continue;
            }
            trace!("{:?} matched '{}'", rule.pattern, m.request);
            found.push((m.span.start, Specifier { request: m.request, kind: rule.kind }));
        }
    }

    found.sort_by_key(|(start, _)| *start);
    found.into_iter().map(|(_, spec)| spec).collect()
}

/// Read a file, keep its text in the per-run cache and extract its imports.
pub fn imports_for(file: &SourceFile, sources: &DashMap<FileId, String>) -> Result<Vec<Specifier>> {
    if let Some(src) = sources.get(&file.id) {
        trace!("Cache hit for source: {}", file.id);
        return Ok(extract_imports(&src));
    }
    trace!("Reading file for imports: {}", file.path.display());
    let src = fs::read_to_string(&file.path)
        .map_err(|source| AnalyzerError::FileAccess { path: file.path.clone(), source })?;

    let specs = extract_imports(&src);
    debug!("Found {} import specifiers in {}", specs.len(), file.id);
    sources.insert(file.id.clone(), src);
    Ok(specs)
}
