use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use depgraph_core::{Config, GraphDocument};
use log::{debug, info};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "depgraph")]
#[command(
    about = "Static module dependency graphs for JavaScript/TypeScript projects",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Build the dependency graph and write dep-graph.json / dep-graph.mmd
    Analyze {
        #[command(flatten)]
        config: Config,

        /// Directory the graph document and diagram are written to
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Skip the Mermaid diagram
        #[arg(long)]
        no_diagram: bool,
    },
    /// Print a report from a previously written graph document
    Report {
        #[arg(long, default_value = depgraph_report::DOCUMENT_FILE)]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    // stdio is blocked by LineWriter, use a BufWriter to reduce syscalls.
    // See https://github.com/rust-lang/rust/issues/60673
    let mut stdout = BufWriter::new(std::io::stdout());

    let cli = Cli::parse();
    debug!("Parsed CLI arguments: {:?}", cli.command);

    let start = Instant::now();

    match cli.command {
        Commands::Analyze { config, out_dir, no_diagram } => {
            let num_threads = rayon::current_num_threads();
            info!("Analyzing dependencies (using {} threads)", num_threads);
            debug!(
                "Config: root={:?}, src_dir={:?}, alias={:?}",
                config.root, config.src_dir, config.alias
            );

            let graph = depgraph_core::run_analysis(config)?;

            // Invariant violations stop here, before anything is written.
            let document = GraphDocument::from_graph(&graph);
            document.validate()?;
            let diagram = (!no_diagram).then(|| depgraph_report::render_mermaid(&graph));

            let written = depgraph_report::write_outputs(&out_dir, &document, diagram.as_deref())?;
            depgraph_report::print_summary(&mut stdout, &document)?;

            writeln!(stdout, "\n{} Wrote {}", "✓".green().bold(), written.document.display())?;
            if let Some(path) = &written.diagram {
                writeln!(stdout, "{} Wrote {}", "✓".green().bold(), path.display())?;
            }

            let elapsed_ms = start.elapsed().as_millis();
            writeln!(
                stdout,
                "\n{} Finished in {}ms on {} files (using {} threads).",
                "●".bright_blue(),
                elapsed_ms.to_string().cyan(),
                graph.node_count().to_string().cyan(),
                num_threads.to_string().cyan()
            )?;
            stdout.flush()?;
            Ok(())
        }
        Commands::Report { input } => {
            info!("Reading graph document from {}", input.display());
            let document = depgraph_report::load_document(&input)?;
            depgraph_report::print_report(&mut stdout, &document)?;

            let elapsed_ms = start.elapsed().as_millis();
            writeln!(
                stdout,
                "\n{} Finished in {}ms.",
                "●".bright_blue(),
                elapsed_ms.to_string().cyan()
            )?;
            stdout.flush()?;
            Ok(())
        }
    }
}
