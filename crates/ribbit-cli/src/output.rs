//! Text and JSON rendering for the CLI.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use ribbit_analysis::extraction::PluginPointFacts;
use ribbit_analysis::{BuildSite, GraphAnalysis, LevelLayout, ModuleId, ScanOutcome, ScanStats};
use ribbit_core::events::types::ScanProgressEvent;
use ribbit_core::tracing::metrics;
use ribbit_core::types::collections::FxHashSet;
use serde::Serialize;

#[derive(Serialize)]
pub struct ScanReport<'a> {
    root: &'a Path,
    root_module: Option<&'a str>,
    levels: Vec<Vec<&'a str>>,
    plugin_points: &'a [PluginPointFacts],
    stats: &'a ScanStats,
}

impl<'a> ScanReport<'a> {
    pub fn new(outcome: &'a ScanOutcome) -> Self {
        Self {
            root: &outcome.root,
            root_module: outcome.layout.root.and_then(|id| module_name(outcome, id)),
            levels: outcome.layout.names(&outcome.hierarchy),
            plugin_points: &outcome.plugin_points,
            stats: &outcome.stats,
        }
    }
}

#[derive(Serialize)]
pub struct QueryReport<'a> {
    dependency: &'a str,
    used_in: Vec<&'a str>,
    built_in: Option<BuiltIn<'a>>,
}

#[derive(Serialize)]
struct BuiltIn<'a> {
    module: &'a str,
    call: &'a str,
}

impl<'a> QueryReport<'a> {
    pub fn new(outcome: &'a ScanOutcome, dependency: &'a str, analysis: &'a GraphAnalysis) -> Self {
        Self {
            dependency,
            used_in: names(outcome, &analysis.used_in),
            built_in: analysis.built_in.as_ref().and_then(|site| {
                Some(BuiltIn {
                    module: module_name(outcome, site.module)?,
                    call: &site.call_name,
                })
            }),
        }
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

pub fn print_layout(outcome: &ScanOutcome) {
    print_levels(outcome, &outcome.layout);
    let stats = &outcome.stats;
    eprintln!(
        "modules={} {}={} {}={} {}={} files_processed={} files_failed={} duration_ms={}",
        stats.modules,
        metrics::EDGES_LINKED,
        stats.edges_linked,
        metrics::REFERENCES_UNRESOLVED,
        stats.references_unresolved + stats.references_ambiguous,
        metrics::LAYOUT_DEPTH,
        outcome.layout.depth(),
        stats.files_processed,
        stats.files_failed,
        stats.duration_ms,
    );
    if !outcome.plugin_points.is_empty() {
        eprintln!("{} plugin point(s) collected", outcome.plugin_points.len());
    }
}

pub fn print_usages(outcome: &ScanOutcome, dependency: &str, used_in: &[ModuleId]) {
    if used_in.is_empty() {
        println!("{dependency} is not required by any module");
        return;
    }
    for id in used_in {
        if let Some(module) = outcome.hierarchy.module(*id) {
            println!("{}\t{}", module.name(), module.source_file.display());
        }
    }
}

pub fn print_subgraph(outcome: &ScanOutcome, filter: &FxHashSet<ModuleId>) {
    let layout = LevelLayout::compute_filtered(&outcome.hierarchy, Some(filter));
    println!();
    print_levels(outcome, &layout);
}

pub fn print_built_by(outcome: &ScanOutcome, dependency: &str, site: Option<&BuildSite>) {
    match site.and_then(|s| Some((module_name(outcome, s.module)?, s))) {
        Some((module, site)) => println!("{module} builds {dependency} as {}", site.call_name),
        None => println!("{dependency} is not built by any module"),
    }
}

/// Overwrites one stderr line per progress event until the channel closes.
pub fn render_progress(events: impl IntoIterator<Item = ScanProgressEvent>) {
    let stderr = std::io::stderr();
    let mut drew = false;
    for event in events {
        let mut err = stderr.lock();
        let _ = write!(
            err,
            "\r{:>3.0}% [{}/{}]",
            event.fraction() * 100.0,
            event.processed,
            event.total
        );
        let _ = err.flush();
        drew = true;
    }
    if drew {
        eprintln!();
    }
}

fn print_levels(outcome: &ScanOutcome, layout: &LevelLayout) {
    for (depth, level) in layout.names(&outcome.hierarchy).iter().enumerate() {
        println!("L{depth}: {}", level.join(", "));
    }
}

fn module_name(outcome: &ScanOutcome, id: ModuleId) -> Option<&str> {
    outcome.hierarchy.module(id).map(|m| m.name())
}

fn names<'a>(outcome: &'a ScanOutcome, ids: &[ModuleId]) -> Vec<&'a str> {
    ids.iter().filter_map(|id| module_name(outcome, *id)).collect()
}
