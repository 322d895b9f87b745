//! Ribbit CLI
//!
//! Scans a Swift source tree for DI modules and prints the module hierarchy
//! level by level, or answers which modules use and build a dependency.

mod output;

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use ribbit_analysis::{QueryEngine, RibbitSession, ScanOutcome, ScanPipeline};
use ribbit_core::config::{CliOverrides, RibbitConfig};
use ribbit_core::errors::RibbitErrorCode;

#[derive(Parser)]
#[command(name = "ribbit")]
#[command(about = "Ribbit - DI module graph extractor")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ScanArgs {
    /// Root directory of the source tree
    root: PathBuf,
    /// Worker threads per phase (0 = one per core)
    #[arg(long)]
    threads: Option<usize>,
    /// Skip files with syntax errors instead of extracting what parses
    #[arg(long)]
    strict: bool,
    /// Emit JSON on stdout
    #[arg(long)]
    json: bool,
    /// Do not render progress on stderr
    #[arg(long, short = 'q')]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a tree and print its module levels
    Scan {
        #[command(flatten)]
        args: ScanArgs,
    },
    /// List the modules that require a dependency
    Usages {
        #[command(flatten)]
        args: ScanArgs,
        /// Dependency type, e.g. `FooServicing`
        #[arg(value_name = "TYPE")]
        type_name: String,
        /// Also print the layout of the users and the modules above them
        #[arg(long)]
        layout: bool,
    },
    /// Show the module that builds a dependency
    BuiltBy {
        #[command(flatten)]
        args: ScanArgs,
        /// Dependency type, e.g. `FooServicing`
        #[arg(value_name = "TYPE")]
        type_name: String,
    },
}

fn main() {
    ribbit_core::tracing::init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!(error = %e, "command failed");
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Scan { args } => {
            let outcome = scan(&args)?;
            if args.json {
                output::print_json(&output::ScanReport::new(&outcome))
            } else {
                output::print_layout(&outcome);
                Ok(())
            }
        }
        Commands::Usages {
            args,
            type_name,
            layout,
        } => {
            let outcome = scan(&args)?;
            let engine = QueryEngine::new(&outcome.hierarchy);
            let dep = engine
                .find_required(&type_name)
                .cloned()
                .unwrap_or_else(|| QueryEngine::probe(&type_name));
            let analysis = engine.analyze(&dep);
            if args.json {
                return output::print_json(&output::QueryReport::new(&outcome, &type_name, &analysis));
            }
            output::print_usages(&outcome, &type_name, &analysis.used_in);
            if layout {
                output::print_subgraph(&outcome, &engine.subgraph_filter(&analysis));
            }
            Ok(())
        }
        Commands::BuiltBy { args, type_name } => {
            let outcome = scan(&args)?;
            let engine = QueryEngine::new(&outcome.hierarchy);
            let analysis = engine.analyze(&QueryEngine::probe(&type_name));
            if args.json {
                return output::print_json(&output::QueryReport::new(&outcome, &type_name, &analysis));
            }
            output::print_built_by(&outcome, &type_name, analysis.built_in.as_ref());
            Ok(())
        }
    }
}

/// Load config for `args.root`, run one scan and report non-fatal errors.
fn scan(args: &ScanArgs) -> Result<Arc<ScanOutcome>> {
    let config = load_config(&args.root, args)?;
    let session = RibbitSession::new(ScanPipeline::new(config));

    let renderer = (!args.quiet && std::io::stderr().is_terminal()).then(|| {
        let events = session.pipeline().events().subscribe_progress();
        std::thread::spawn(move || output::render_progress(events))
    });

    let result = session.scan(&args.root);
    // Dropping the session closes the progress channel.
    drop(session);
    if let Some(handle) = renderer {
        let _ = handle.join();
    }

    let result = result.with_context(|| format!("scan of {} failed", args.root.display()))?;
    for err in &result.errors {
        eprintln!("warning: {}", err.tagged_string());
    }
    Ok(result.data)
}

fn load_config(root: &Path, args: &ScanArgs) -> Result<RibbitConfig> {
    let overrides = CliOverrides {
        scan_threads: args.threads,
        strict_syntax: args.strict.then_some(true),
        ..CliOverrides::default()
    };
    RibbitConfig::load(root, Some(&overrides))
        .with_context(|| format!("invalid configuration for {}", root.display()))
}
