//! ScanPipeline: discovery, three ordered extraction phases, linking and
//! layout.
//!
//! Within a phase files are extracted in parallel on a rayon pool. Workers
//! only read their own file; each result is sent over a channel to a single
//! reducer thread, which reports progress and slots the result by discovery
//! index. Once every worker of the phase has finished, results are applied to
//! the module set in discovery order, so two scans of the same tree produce
//! the same graph.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use ribbit_core::config::RibbitConfig;
use ribbit_core::errors::{ParseError, PipelineError, PipelineResult, RibbitErrorCode, ScanError};
use ribbit_core::events::types::{
    ErrorEvent, FileSkippedEvent, PhaseStartedEvent, ScanCompleteEvent, ScanErrorEvent, ScanPhase,
    ScanStartedEvent,
};
use ribbit_core::events::EventDispatcher;
use ribbit_core::traits::{Cancellable, CancellationToken};

use super::progress::ProgressTracker;
use super::types::{ScanOutcome, ScanStats};
use crate::extraction::{Classifier, ClassifierSettings, FileFacts, PluginPointFacts};
use crate::hierarchy::{Hierarchy, LevelLayout};
use crate::modules::{
    merge_non_core, prepare_non_core, Module, ModuleRecordBuilder, ModuleSet, NonCoreContribution,
};
use crate::scanner::{self, DiscoveredFile, Discovery, SkipReason};
use crate::syntax::{DeclTree, SwiftTreeProvider, SyntaxTreeProvider};

/// Per-file outcome slots of one phase, by discovery index. `None` means the
/// file was never extracted because the scan was cancelled.
type PhaseSlots<T> = Vec<Option<Result<T, PipelineError>>>;

/// Runs complete scans. Holds no state between runs apart from the event
/// subscribers and the cancellation flag.
pub struct ScanPipeline {
    config: RibbitConfig,
    provider: Arc<dyn SyntaxTreeProvider>,
    classifier: Classifier,
    records: ModuleRecordBuilder,
    events: Arc<EventDispatcher>,
    cancel: CancellationToken,
}

impl ScanPipeline {
    /// A pipeline parsing Swift sources.
    pub fn new(config: RibbitConfig) -> Self {
        Self::with_provider(config, Arc::new(SwiftTreeProvider::new()))
    }

    pub fn with_provider(config: RibbitConfig, provider: Arc<dyn SyntaxTreeProvider>) -> Self {
        let settings = ClassifierSettings::from(&config.extraction);
        let records = ModuleRecordBuilder::from(&settings);
        Self {
            config,
            provider,
            classifier: Classifier::new(settings),
            records,
            events: Arc::new(EventDispatcher::new()),
            cancel: CancellationToken::new(),
        }
    }

    /// Share an existing dispatcher instead of the pipeline's own.
    pub fn with_events(mut self, events: Arc<EventDispatcher>) -> Self {
        self.events = events;
        self
    }

    pub fn config(&self) -> &RibbitConfig {
        &self.config
    }

    pub fn events(&self) -> &Arc<EventDispatcher> {
        &self.events
    }

    /// Token that stops the running scan at its next phase barrier. A
    /// cancelled token stays cancelled until reset.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Scan `root` and build its hierarchy.
    ///
    /// Only an invalid root, a worker pool failure or cancellation fail the
    /// scan. Per-file failures are collected in the result's `errors`.
    pub fn run(&self, root: &Path) -> Result<PipelineResult<ScanOutcome>, ScanError> {
        let start = Instant::now();
        let discovery = scanner::discover(root, &self.config.scan).inspect_err(|e| self.report_fatal(e))?;
        let pool = self.build_pool().inspect_err(|e| self.report_fatal(e))?;

        let total = discovery.total();
        tracing::info!(root = %root.display(), files = total, "scan started");
        self.events.emit_scan_started(&ScanStartedEvent {
            root: root.to_path_buf(),
            file_count: total,
        });

        let mut progress = ProgressTracker::new(&self.events, total);
        if total == 0 {
            progress.finish_empty();
        }

        let mut stats = ScanStats {
            files_discovered: total,
            files_skipped: discovery.skipped.len(),
            discovery_ms: discovery.stats.discovery_ms,
            ..ScanStats::default()
        };
        let mut errors: Vec<PipelineError> = Vec::new();
        self.report_discovery_skips(&discovery, &mut errors);

        // Phase 1: module records.
        let mut set = ModuleSet::new();
        let files = &discovery.builders;
        let slots = self.run_phase(&pool, ScanPhase::Modules, files, &mut progress, |file| {
            self.extract_modules(file)
        })?;
        self.settle(ScanPhase::Modules, files, slots, &mut stats, &mut errors, |_, modules| {
            for module in modules {
                set.insert(module);
            }
            Ok(())
        });

        // Phase 2: non-core companions.
        let files = &discovery.non_core_components;
        let slots = self.run_phase(&pool, ScanPhase::NonCoreComponents, files, &mut progress, |file| {
            self.extract_non_core(file)
        })?;
        let mut merged = 0;
        self.settle(ScanPhase::NonCoreComponents, files, slots, &mut stats, &mut errors, |_, contributions| {
            let outcome = merge_non_core(&mut set, &contributions)?;
            merged += outcome.modules_touched;
            Ok(())
        });
        stats.non_core_merged = merged;

        // Phase 3: plugin points.
        let mut plugin_points: Vec<PluginPointFacts> = Vec::new();
        let files = &discovery.plugin_points;
        let slots = self.run_phase(&pool, ScanPhase::PluginPoints, files, &mut progress, |file| {
            self.extract_plugin_points(file)
        })?;
        self.settle(ScanPhase::PluginPoints, files, slots, &mut stats, &mut errors, |_, points| {
            plugin_points.extend(points);
            Ok(())
        });

        let hierarchy = Hierarchy::link(set, self.config.extraction.effective_warn_on_ambiguous());
        let report = hierarchy.report();
        let layout = LevelLayout::compute(&hierarchy);

        stats.modules = hierarchy.len();
        stats.edges_linked = report.edges_linked;
        stats.references_unresolved = report.unresolved;
        stats.references_ambiguous = report.ambiguous;
        stats.plugin_points = plugin_points.len();
        stats.duration_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            modules = stats.modules,
            edges_linked = stats.edges_linked,
            references_unresolved = stats.references_unresolved + stats.references_ambiguous,
            layout_depth = layout.depth(),
            files_processed = progress.processed(),
            files_failed = stats.files_failed,
            duration_ms = stats.duration_ms,
            "scan complete"
        );
        self.events.emit_scan_complete(&ScanCompleteEvent {
            modules: stats.modules,
            levels: layout.depth(),
            files_processed: stats.files_processed,
            files_failed: stats.files_failed,
            duration_ms: stats.duration_ms,
        });

        let mut result = PipelineResult::new(ScanOutcome {
            root: root.to_path_buf(),
            hierarchy,
            layout,
            plugin_points,
            stats,
        });
        result.errors = errors;
        Ok(result)
    }

    fn build_pool(&self) -> Result<rayon::ThreadPool, ScanError> {
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.scan.effective_threads())
            .thread_name(|i| format!("ribbit-worker-{i}"))
            .build()
            .map_err(|e| ScanError::WorkerPool {
                message: e.to_string(),
            })
    }

    /// Fan out `work` over `files` and wait for all of it.
    fn run_phase<T, W>(
        &self,
        pool: &rayon::ThreadPool,
        phase: ScanPhase,
        files: &[DiscoveredFile],
        progress: &mut ProgressTracker<'_>,
        work: W,
    ) -> Result<PhaseSlots<T>, ScanError>
    where
        T: Send,
        W: Fn(&DiscoveredFile) -> Result<T, PipelineError> + Sync,
    {
        self.check_cancelled()?;
        let start = Instant::now();
        tracing::info!(%phase, files = files.len(), "phase started");
        self.events.emit_phase_started(&PhaseStartedEvent {
            phase,
            file_count: files.len(),
        });

        let (tx, rx) = crossbeam_channel::unbounded::<(usize, Result<T, PipelineError>)>();
        let cancel = &self.cancel;
        let work = &work;

        let slots = std::thread::scope(|scope| {
            let reducer = scope.spawn(move || {
                let mut slots: PhaseSlots<T> =
                    std::iter::repeat_with(|| None).take(files.len()).collect();
                for (index, result) in rx {
                    progress.advance(&files[index].path);
                    slots[index] = Some(result);
                }
                slots
            });

            pool.install(|| {
                files
                    .par_iter()
                    .enumerate()
                    .for_each_with(tx, |tx, (index, file)| {
                        if cancel.is_cancelled() {
                            return;
                        }
                        // The reducer outlives every sender.
                        let _ = tx.send((index, work(file)));
                    });
            });

            reducer.join()
        })
        .map_err(|_| ScanError::WorkerPool {
            message: format!("{phase} reducer thread panicked"),
        })?;

        tracing::debug!(%phase, phase_duration = start.elapsed().as_millis() as u64, "phase finished");
        self.check_cancelled()?;
        Ok(slots)
    }

    /// Apply a phase's results in discovery order, recording every failure.
    fn settle<T, A>(
        &self,
        phase: ScanPhase,
        files: &[DiscoveredFile],
        slots: PhaseSlots<T>,
        stats: &mut ScanStats,
        errors: &mut Vec<PipelineError>,
        mut apply: A,
    ) where
        A: FnMut(&DiscoveredFile, T) -> Result<(), PipelineError>,
    {
        for (file, slot) in files.iter().zip(slots) {
            let Some(result) = slot else {
                continue;
            };
            match result.and_then(|value| apply(file, value)) {
                Ok(()) => stats.files_processed += 1,
                Err(err) => {
                    stats.files_failed += 1;
                    self.report_file_failure(phase, &file.path, err, errors);
                }
            }
        }
    }

    fn parse(&self, file: &DiscoveredFile) -> Result<DeclTree, PipelineError> {
        let start = Instant::now();
        let tree = self.provider.parse_file(&file.path)?;
        if tree.error_count > 0 {
            if self.config.extraction.effective_strict_syntax() {
                return Err(ParseError::Syntax {
                    path: file.path.clone(),
                    error_count: tree.error_count,
                }
                .into());
            }
            tracing::debug!(
                path = %file.path.display(),
                error_count = tree.error_count,
                "syntax errors tolerated"
            );
        }
        tracing::trace!(
            path = %file.path.display(),
            parse_time_us = start.elapsed().as_micros() as u64,
            nodes = tree.len(),
            "parsed"
        );
        Ok(tree)
    }

    fn classify(&self, file: &DiscoveredFile) -> Result<(DeclTree, FileFacts), PipelineError> {
        let tree = self.parse(file)?;
        let facts = self.classifier.classify(&tree);
        Ok((tree, facts))
    }

    fn extract_modules(&self, file: &DiscoveredFile) -> Result<Vec<Module>, PipelineError> {
        let (tree, facts) = self.classify(file)?;
        let modules = self.records.build(&tree, &facts);
        if modules.is_empty() {
            tracing::debug!(path = %file.path.display(), "no builder registered in builder file");
        }
        Ok(modules)
    }

    fn extract_non_core(&self, file: &DiscoveredFile) -> Result<Vec<NonCoreContribution>, PipelineError> {
        let (tree, facts) = self.classify(file)?;
        Ok(prepare_non_core(&tree, &facts, &self.records)?)
    }

    fn extract_plugin_points(&self, file: &DiscoveredFile) -> Result<Vec<PluginPointFacts>, PipelineError> {
        let (_, facts) = self.classify(file)?;
        Ok(facts.plugin_points)
    }

    fn report_discovery_skips(&self, discovery: &Discovery, errors: &mut Vec<PipelineError>) {
        for skipped in &discovery.skipped {
            let phase = skipped.role.phase();
            match &skipped.reason {
                SkipReason::MalformedName => {
                    let err = ParseError::MalformedFileName {
                        path: skipped.path.clone(),
                        convention: format!("*{}", skipped.role.suffix()),
                    };
                    self.report_file_failure(phase, &skipped.path, err.into(), errors);
                }
                reason @ SkipReason::TooLarge { .. } => {
                    tracing::warn!(path = %skipped.path.display(), %phase, %reason, "file skipped");
                    self.events.emit_file_skipped(&FileSkippedEvent {
                        path: skipped.path.clone(),
                        phase,
                        reason: reason.to_string(),
                    });
                }
            }
        }
    }

    fn report_file_failure(
        &self,
        phase: ScanPhase,
        path: &Path,
        err: PipelineError,
        errors: &mut Vec<PipelineError>,
    ) {
        tracing::warn!(path = %path.display(), %phase, error = %err, "file skipped");
        self.events.emit_file_skipped(&FileSkippedEvent {
            path: path.to_path_buf(),
            phase,
            reason: err.to_string(),
        });
        self.events.emit_error(&ErrorEvent {
            message: err.tagged_string(),
            error_code: err.error_code().to_string(),
        });
        errors.push(err);
    }

    fn check_cancelled(&self) -> Result<(), ScanError> {
        if !self.cancel.is_cancelled() {
            return Ok(());
        }
        let err = ScanError::Cancelled;
        self.report_fatal(&err);
        Err(err)
    }

    fn report_fatal(&self, err: &ScanError) {
        tracing::warn!(error = %err, "scan failed");
        self.events.emit_scan_error(&ScanErrorEvent {
            message: err.tagged_string(),
            error_code: err.error_code().to_string(),
        });
    }
}
