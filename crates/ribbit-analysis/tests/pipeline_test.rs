//! End-to-end scans over the Swift fixture app and small temp trees.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use ribbit_analysis::{QueryEngine, RibbitSession, ScanPipeline};
use ribbit_core::config::RibbitConfig;
use ribbit_core::errors::{RibbitErrorCode, ScanError};
use ribbit_core::events::handler::RibbitEventHandler;
use ribbit_core::events::types::{PhaseStartedEvent, ScanCompleteEvent, ScanPhase};
use ribbit_core::traits::Cancellable;

fn fixture_app() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../test-fixtures/swift/app")
}

fn pipeline() -> ScanPipeline {
    ScanPipeline::new(RibbitConfig::default())
}

fn write(root: &Path, rel: &str, body: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, body).unwrap();
}

#[derive(Default)]
struct Recorder {
    phases: Mutex<Vec<ScanPhase>>,
    completed: Mutex<Vec<ScanCompleteEvent>>,
}

impl RibbitEventHandler for Recorder {
    fn on_phase_started(&self, event: &PhaseStartedEvent) {
        self.phases.lock().unwrap().push(event.phase);
    }

    fn on_scan_complete(&self, event: &ScanCompleteEvent) {
        self.completed.lock().unwrap().push(event.clone());
    }
}

#[test]
fn fixture_app_lays_out_by_depth() {
    let result = pipeline().run(&fixture_app()).unwrap();
    assert!(result.is_clean(), "unexpected errors: {:?}", result.errors);

    let outcome = result.data;
    let h = &outcome.hierarchy;
    assert_eq!(outcome.stats.files_discovered, 6);
    assert_eq!(outcome.stats.files_processed, 6);
    assert_eq!(outcome.stats.modules, 4);
    assert_eq!(outcome.stats.edges_linked, 3);
    // ReceiptBuilder is referenced from the non-core component but never declared.
    assert_eq!(outcome.stats.references_unresolved, 1);

    assert_eq!(
        outcome.layout.names(h),
        vec![
            vec!["RootBuilder"],
            vec!["RideBuilder", "ProfileBuilder"],
            vec!["MapBuilder"],
        ]
    );
    let root = h.find_by_name("RootBuilder").unwrap();
    assert_eq!(outcome.layout.root, Some(root));
    let map = h.find_by_name("MapBuilder").unwrap();
    let ride = h.find_by_name("RideBuilder").unwrap();
    assert_eq!(h.parent(map), Some(ride));
}

#[test]
fn hidden_build_directory_is_not_scanned() {
    let outcome = pipeline().run(&fixture_app()).unwrap().data;
    assert!(outcome.hierarchy.find_by_name("GeneratedBuilder").is_none());
    assert!(outcome
        .hierarchy
        .modules()
        .all(|(_, m)| !m.source_file.components().any(|c| c.as_os_str() == ".build")));
}

#[test]
fn usages_and_builder_of_a_shared_service() {
    let outcome = pipeline().run(&fixture_app()).unwrap().data;
    let h = &outcome.hierarchy;
    let engine = QueryEngine::new(h);

    let dep = engine.find_required("FooServicing").unwrap();
    let users: Vec<&str> = engine
        .usages(dep)
        .into_iter()
        .map(|id| h.module(id).unwrap().name())
        .collect();
    assert_eq!(users, vec!["ProfileBuilder", "RideBuilder"]);

    let site = engine.built_by(dep).unwrap();
    assert_eq!(h.module(site.module).unwrap().name(), "RootBuilder");
    assert_eq!(site.call_name, "FooService");

    let stream = engine.analyze(&QueryEngine::probe("RideStreaming"));
    let map = h.find_by_name("MapBuilder").unwrap();
    let ride = h.find_by_name("RideBuilder").unwrap();
    assert_eq!(stream.used_in, vec![map]);
    assert_eq!(stream.built_in.map(|s| s.module), Some(ride));
}

#[test]
fn non_core_component_merges_into_its_module() {
    let outcome = pipeline().run(&fixture_app()).unwrap().data;
    assert_eq!(outcome.stats.non_core_merged, 1);

    let h = &outcome.hierarchy;
    let ride = h.module(h.find_by_name("RideBuilder").unwrap()).unwrap();
    assert_eq!(ride.non_core_component_name.as_deref(), Some("RideNonCoreComponent"));
    assert_eq!(ride.non_core_components, vec!["RideNonCoreComponent".to_string()]);

    let surge = ride
        .required_dependencies
        .iter()
        .find(|d| d.display_text == "SurgeStreaming")
        .expect("non-core requirement merged");
    assert_eq!(surge.scope, ribbit_analysis::Scope::NonCore);

    let pricing = ride
        .built_dependencies
        .iter()
        .find(|d| d.display_text == "PricingProvider")
        .expect("non-core build merged");
    assert_eq!(pricing.inferred_abstraction.as_deref(), Some("PricingProviding"));
    assert!(ride.child_references.iter().any(|c| c.name == "ReceiptBuilder"));

    let engine = QueryEngine::new(h);
    let analysis = engine.analyze(&QueryEngine::probe("SurgeStreaming"));
    assert_eq!(analysis.used_in, vec![h.find_by_name("RideBuilder").unwrap()]);
    assert!(analysis.built_in.is_none());
}

#[test]
fn plugin_points_are_collected() {
    let outcome = pipeline().run(&fixture_app()).unwrap().data;
    assert_eq!(outcome.plugin_points.len(), 1);
    let point = &outcome.plugin_points[0];
    assert_eq!(point.name, "MapPluginPoint");
    assert_eq!(point.dependency.as_deref(), Some("MapDependency"));
    assert_eq!(point.factory_type.as_deref(), Some("[MapPluginFactory]"));
    assert!(point.constants.iter().any(|c| c.name == "identifier"));
}

#[test]
fn progress_reaches_every_file_once() {
    let pipeline = pipeline();
    let rx = pipeline.events().subscribe_progress();
    pipeline.run(&fixture_app()).unwrap();

    let events: Vec<_> = rx.try_iter().collect();
    assert_eq!(events.len(), 6);
    let processed: Vec<usize> = events.iter().map(|e| e.processed).collect();
    assert_eq!(processed, vec![1, 2, 3, 4, 5, 6]);
    assert!(events.iter().all(|e| e.total == 6));
    assert_eq!(events.last().unwrap().fraction(), 1.0);
}

#[test]
fn phases_run_in_order() {
    let pipeline = pipeline();
    let recorder = Arc::new(Recorder::default());
    pipeline.events().subscribe(recorder.clone());
    pipeline.run(&fixture_app()).unwrap();

    assert_eq!(
        *recorder.phases.lock().unwrap(),
        vec![
            ScanPhase::Modules,
            ScanPhase::NonCoreComponents,
            ScanPhase::PluginPoints,
        ]
    );
    let completed = recorder.completed.lock().unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].modules, 4);
    assert_eq!(completed[0].levels, 3);
}

#[test]
fn empty_root_completes_immediately() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline();
    let rx = pipeline.events().subscribe_progress();

    let outcome = pipeline.run(dir.path()).unwrap().data;
    assert!(outcome.hierarchy.is_empty());
    assert!(outcome.layout.is_empty());
    assert_eq!(outcome.layout.root, None);

    let last = rx.try_iter().last().expect("empty scan still reports progress");
    assert_eq!(last.total, 0);
    assert_eq!(last.fraction(), 1.0);
}

#[test]
fn missing_root_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let err = pipeline().run(&dir.path().join("nope")).unwrap_err();
    assert!(matches!(err, ScanError::InvalidRoot { .. }));
    assert_eq!(err.error_code(), "INVALID_ROOT");
}

#[test]
fn file_root_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "RootBuilder.swift", "");
    let err = pipeline().run(&dir.path().join("RootBuilder.swift")).unwrap_err();
    assert!(matches!(err, ScanError::InvalidRoot { .. }));
}

#[test]
fn cancelled_token_stops_until_reset() {
    let pipeline = pipeline();
    let token = pipeline.cancellation();
    token.cancel();
    let err = pipeline.run(&fixture_app()).unwrap_err();
    assert!(matches!(err, ScanError::Cancelled));

    token.reset();
    let outcome = pipeline.run(&fixture_app()).unwrap().data;
    assert_eq!(outcome.stats.modules, 4);
}

#[test]
fn repeated_scans_agree() {
    let pipeline = pipeline();
    let first = pipeline.run(&fixture_app()).unwrap().data;
    let second = pipeline.run(&fixture_app()).unwrap().data;
    assert_eq!(
        first.layout.names(&first.hierarchy),
        second.layout.names(&second.hierarchy)
    );
    let names = |o: &ribbit_analysis::ScanOutcome| -> Vec<String> {
        o.hierarchy.modules().map(|(_, m)| m.name().to_string()).collect()
    };
    assert_eq!(names(&first), names(&second));
}

#[test]
fn single_thread_matches_parallel() {
    let mut config = RibbitConfig::default();
    config.scan.threads = Some(1);
    let serial = ScanPipeline::new(config).run(&fixture_app()).unwrap().data;
    let parallel = pipeline().run(&fixture_app()).unwrap().data;
    assert_eq!(
        serial.layout.names(&serial.hierarchy),
        parallel.layout.names(&parallel.hierarchy)
    );
}

#[test]
fn malformed_file_name_is_reported_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "RootBuilder.swift",
        "final class RootBuilder: Builder<RootDependency> {\n    func build() -> RootRouting {\n        return RootRouter()\n    }\n}\n",
    );
    write(dir.path(), "Bad-Name-Builder.swift", "");

    let result = pipeline().run(dir.path()).unwrap();
    assert_eq!(result.data.stats.modules, 1);
    assert_eq!(result.error_count(), 1);
    assert_eq!(result.errors_with_code("MALFORMED_FILE_NAME").count(), 1);
    assert_eq!(result.data.stats.files_skipped, 1);
    assert_eq!(result.data.stats.files_failed, 0);
}

#[test]
fn strict_syntax_skips_broken_files() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "GoodBuilder.swift",
        "final class GoodBuilder: Builder<GoodDependency> {\n    func build() -> GoodRouting {\n        return GoodRouter()\n    }\n}\n",
    );
    write(
        dir.path(),
        "BrokenBuilder.swift",
        "final class BrokenBuilder: Builder<BrokenDependency> {\n    func build( {\n        return BrokenRouter(\n",
    );

    let mut config = RibbitConfig::default();
    config.extraction.strict_syntax = Some(true);
    let result = ScanPipeline::new(config).run(dir.path()).unwrap();
    assert_eq!(result.data.hierarchy.len(), 1);
    assert!(result.data.hierarchy.find_by_name("GoodBuilder").is_some());
    assert_eq!(result.error_count(), 1);
    assert_eq!(result.errors[0].error_code(), "PARSE_ERROR");
}

#[test]
fn unmatched_non_core_component_is_a_file_error() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "OrphanNonCoreComponent.swift",
        "protocol OrphanNonCoreDependency: Dependency {\n    var clock: Clock { get }\n}\n\nfinal class OrphanNonCoreComponent: NonCoreComponent<OrphanNonCoreDependency> {\n    var ticker: Ticking {\n        return shared { Ticker() }\n    }\n}\n",
    );

    let result = pipeline().run(dir.path()).unwrap();
    assert!(result.data.hierarchy.is_empty());
    assert_eq!(result.error_count(), 1);
    assert_eq!(result.errors[0].error_code(), "EXTRACTION_ERROR");
}

#[test]
fn session_publishes_completed_scans() {
    let session = RibbitSession::new(pipeline());
    let dep = QueryEngine::probe("FooServicing");

    let scanned = session.scan(&fixture_app()).unwrap();
    assert!(scanned.is_clean());
    assert_eq!(session.usages(&dep).len(), 2);
    assert!(session.built_by(&dep).is_some());

    let layout = session.layout_for(&dep);
    let latest = session.latest().unwrap();
    assert_eq!(
        layout.names(&latest.hierarchy),
        vec![vec!["RootBuilder"], vec!["RideBuilder", "ProfileBuilder"]]
    );

    // A failed scan keeps the previous outcome.
    assert!(session.scan(Path::new("/definitely/not/a/root")).is_err());
    assert_eq!(session.usages(&dep).len(), 2);
}

#[test]
fn stats_serialize_for_reporting() {
    let outcome = pipeline().run(&fixture_app()).unwrap().data;
    let json = serde_json::to_value(&outcome.stats).unwrap();
    assert_eq!(json["modules"], 4);
    assert_eq!(json["files_discovered"], 6);

    let layout = serde_json::to_value(&outcome.layout).unwrap();
    assert_eq!(layout["levels"].as_array().unwrap().len(), 3);
}
