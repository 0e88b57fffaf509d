use anyhow::{Context, Result};
use colored::Colorize;
use log::{debug, trace};
use std::{
    collections::BTreeMap,
    io::{self, Write},
};

use depgraph_core::{Graph, GraphDocument, Role, analytics};

const TOP_N: usize = 10;
const ORPHAN_PREVIEW: usize = 10;
const FILES_PER_DIRECTORY: usize = 3;
const RISK_PREVIEW: usize = 5;

fn section<W: Write>(writer: &mut W, title: &str) -> io::Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{}", title.bold())?;
    writeln!(writer, "{}", "─".repeat(60).dimmed())
}

fn tree_prefix(idx: usize, len: usize) -> &'static str {
    if idx + 1 == len { "└──" } else { "├──" }
}

/// Short summary printed right after an analysis run.
pub fn print_summary<W: Write>(writer: &mut W, document: &GraphDocument) -> io::Result<()> {
    let stats = &document.stats;
    debug!("Printing summary for {} files", stats.total_files);

    writeln!(writer, "{} Dependency graph built", "✓".green().bold())?;
    writeln!(writer, "  Files: {}", stats.total_files.to_string().cyan())?;
    writeln!(writer, "  Internal imports: {}", stats.total_imports.to_string().cyan())?;
    writeln!(writer, "  External imports: {}", stats.external_dependencies.to_string().cyan())?;
    if stats.unresolved_imports > 0 {
        writeln!(
            writer,
            "  Unresolved imports: {} (counted as external)",
            stats.unresolved_imports.to_string().yellow()
        )?;
    }
    writeln!(writer, "  Entry points: {}", stats.entry_points.to_string().cyan())?;

    if document.orphaned_files.is_empty() {
        writeln!(writer, "  Orphaned files: {}", "0".green())?;
    } else {
        writeln!(
            writer,
            "  Orphaned files: {}",
            document.orphaned_files.len().to_string().yellow().bold()
        )?;
        let shown = &document.orphaned_files[..document.orphaned_files.len().min(ORPHAN_PREVIEW)];
        for (idx, orphan) in shown.iter().enumerate() {
            writeln!(writer, "    {}  {}", tree_prefix(idx, shown.len()).dimmed(), orphan.blue())?;
        }
        let rest = document.orphaned_files.len() - shown.len();
        if rest > 0 {
            writeln!(writer, "    {}", format!("... and {} more", rest).dimmed())?;
        }
    }

    print_skipped(writer, document)?;
    writer.flush()?;
    Ok(())
}

fn print_skipped<W: Write>(writer: &mut W, document: &GraphDocument) -> io::Result<()> {
    if document.skipped_files.is_empty() {
        return Ok(());
    }
    writeln!(
        writer,
        "{} Skipped {} unreadable file(s):",
        "⚠".yellow().bold(),
        document.skipped_files.len().to_string().yellow()
    )?;
    for skipped in &document.skipped_files {
        writeln!(
            writer,
            "    {} {}",
            skipped.path.blue(),
            format!("({})", skipped.reason).dimmed()
        )?;
    }
    Ok(())
}

/// Full human-readable report over a persisted graph document.
pub fn print_report<W: Write>(writer: &mut W, document: &GraphDocument) -> Result<()> {
    let graph = Graph::from_document(document).context("Graph document is inconsistent")?;
    debug!("Printing report for {} files", graph.node_count());

    writeln!(writer, "{}", "Dependency Graph Report".bold())?;
    writeln!(writer, "{}", "═".repeat(60).dimmed())?;
    writeln!(writer, "  Files: {}", document.stats.total_files.to_string().cyan())?;
    writeln!(writer, "  Internal imports: {}", document.stats.total_imports.to_string().cyan())?;
    writeln!(
        writer,
        "  External imports: {}",
        document.stats.external_dependencies.to_string().cyan()
    )?;

    print_entry_points(writer, &graph)?;
    print_rankings(writer, &graph)?;
    print_orphans(writer, document)?;
    print_distributions(writer, &graph)?;
    print_cycles(writer, &graph)?;
    print_features(writer, &graph)?;
    print_recommendations(writer, &graph)?;
    print_skipped(writer, document)?;

    writer.flush()?;
    Ok(())
}

fn print_entry_points<W: Write>(writer: &mut W, graph: &Graph) -> io::Result<()> {
    section(writer, "Entry points")?;
    let entries: Vec<_> = graph.nodes().filter(|n| n.role == Role::Entry).collect();
    if entries.is_empty() {
        writeln!(writer, "  {}", "none found".dimmed())?;
    }
    for node in entries {
        writeln!(writer, "  {} ({} imports)", node.id.blue(), node.imports)?;
    }
    Ok(())
}

fn print_rankings<W: Write>(writer: &mut W, graph: &Graph) -> io::Result<()> {
    section(writer, "Import hubs (most outgoing imports)")?;
    for (idx, node) in analytics::hubs(graph).iter().take(TOP_N).enumerate() {
        writeln!(
            writer,
            "  {:>2}. {} {} imports {}",
            idx + 1,
            node.id.blue(),
            node.imports.to_string().yellow(),
            format!("[{}]", node.role).dimmed()
        )?;
    }

    section(writer, "Critical dependencies (most imported)")?;
    for (idx, node) in analytics::critical_dependencies(graph).iter().take(TOP_N).enumerate() {
        writeln!(
            writer,
            "  {:>2}. {} imported by {} {}",
            idx + 1,
            node.id.blue(),
            node.imported_by.to_string().yellow(),
            format!("[{}]", node.role).dimmed()
        )?;
    }
    Ok(())
}

/// The directory part of an identity; root-level files group under `.`
fn directory_of(id: &str) -> &str {
    id.rsplit_once('/').map(|(dir, _)| dir).unwrap_or(".")
}

fn print_orphans<W: Write>(writer: &mut W, document: &GraphDocument) -> io::Result<()> {
    section(writer, "Orphaned files")?;
    if document.orphaned_files.is_empty() {
        writeln!(writer, "  {} No orphaned files", "✓".green().bold())?;
        return Ok(());
    }

    let mut by_dir: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for orphan in &document.orphaned_files {
        by_dir.entry(directory_of(orphan)).or_default().push(orphan);
    }
    trace!("Orphans span {} directories", by_dir.len());

    for (dir, files) in by_dir {
        writeln!(writer, "  {} ({})", dir.bright_white().bold(), files.len())?;
        let shown = &files[..files.len().min(FILES_PER_DIRECTORY)];
        for (idx, &file) in shown.iter().enumerate() {
            let name = file.rsplit('/').next().unwrap_or(file);
            let prefix =
                if files.len() > shown.len() { "├──" } else { tree_prefix(idx, shown.len()) };
            writeln!(writer, "  {}  {}", prefix.dimmed(), name)?;
        }
        if files.len() > shown.len() {
            writeln!(
                writer,
                "  {}  {}",
                "└──".dimmed(),
                format!("... and {} more", files.len() - shown.len()).dimmed()
            )?;
        }
    }
    Ok(())
}

fn print_distributions<W: Write>(writer: &mut W, graph: &Graph) -> io::Result<()> {
    section(writer, "File types")?;
    for share in analytics::role_distribution(graph) {
        writeln!(
            writer,
            "  {:<10} {:>5} ({:.1}%)",
            share.label.as_str(),
            share.count,
            share.percentage
        )?;
    }

    section(writer, "Import types (internal)")?;
    let kinds = analytics::import_kind_distribution_internal(graph);
    if kinds.is_empty() {
        writeln!(writer, "  {}", "no internal imports".dimmed())?;
    }
    for share in kinds {
        writeln!(
            writer,
            "  {:<10} {:>5} ({:.1}%)",
            share.label.as_str(),
            share.count,
            share.percentage
        )?;
    }
    Ok(())
}

fn print_cycles<W: Write>(writer: &mut W, graph: &Graph) -> io::Result<()> {
    section(writer, "Circular dependency risk")?;
    let risks = analytics::circular_risk(graph);
    if risks.is_empty() {
        writeln!(writer, "  {} No high-connectivity files", "✓".green().bold())?;
    }
    for risk in risks.iter().take(RISK_PREVIEW) {
        writeln!(
            writer,
            "  {} {} in / {} out",
            risk.id.blue(),
            risk.imported_by.to_string().red(),
            risk.imports.to_string().red()
        )?;
    }

    let cycles = analytics::strongly_connected_components(graph);
    if cycles.is_empty() {
        writeln!(writer, "  {} No import cycles", "✓".green().bold())?;
        return Ok(());
    }
    writeln!(
        writer,
        "  {} {} import cycle(s):",
        "⚠".yellow().bold(),
        cycles.len().to_string().yellow()
    )?;
    for cycle in &cycles {
        writeln!(writer, "    {}", cycle.join(" ↔ ").red())?;
    }
    Ok(())
}

fn print_features<W: Write>(writer: &mut W, graph: &Graph) -> io::Result<()> {
    let features = analytics::feature_modules(graph);
    if features.is_empty() {
        return Ok(());
    }
    section(writer, "Feature modules")?;
    for feature in features {
        writeln!(
            writer,
            "  {} {} files, avg {:.1} imports, avg {:.1} importers",
            feature.name.blue(),
            feature.file_count,
            feature.avg_imports,
            feature.avg_imported_by
        )?;
    }
    Ok(())
}

fn print_recommendations<W: Write>(writer: &mut W, graph: &Graph) -> io::Result<()> {
    let recs = analytics::recommendations(graph);
    section(writer, "Recommendations")?;

    for id in &recs.decomposition {
        writeln!(writer, "  {} Consider splitting {}", "•".yellow(), id.blue())?;
    }
    for id in &recs.critical_paths {
        writeln!(writer, "  {} Critical path, keep stable: {}", "•".yellow(), id.blue())?;
    }
    for id in &recs.dead_components {
        writeln!(writer, "  {} Unused component: {}", "•".yellow(), id.blue())?;
    }

    let coverage = &recs.coverage;
    let ratio = format!("{:.2}", coverage.ratio);
    writeln!(
        writer,
        "  Test coverage ratio: {} ({} tests / {} sources)",
        if coverage.low { ratio.red() } else { ratio.green() },
        coverage.tests,
        coverage.sources
    )?;
    if coverage.low {
        writeln!(writer, "  {} Low test coverage", "⚠".yellow().bold())?;
    }
    Ok(())
}
