//! RibbitSession: the pipeline plus the most recently completed scan.

use std::path::Path;
use std::sync::{Arc, RwLock};

use ribbit_core::errors::{PipelineResult, ScanError};

use super::orchestrator::ScanPipeline;
use super::types::ScanOutcome;
use crate::hierarchy::LevelLayout;
use crate::modules::{Dependency, ModuleId};
use crate::query::{BuildSite, GraphAnalysis, QueryEngine};

/// Front door for a presentation layer.
///
/// A scan replaces the published outcome only when it completes; a failed or
/// cancelled scan leaves the previous one in place. Queries always run
/// against one consistent outcome.
pub struct RibbitSession {
    pipeline: ScanPipeline,
    latest: RwLock<Option<Arc<ScanOutcome>>>,
}

impl RibbitSession {
    pub fn new(pipeline: ScanPipeline) -> Self {
        Self {
            pipeline,
            latest: RwLock::new(None),
        }
    }

    pub fn pipeline(&self) -> &ScanPipeline {
        &self.pipeline
    }

    /// Scan `root` and publish the outcome.
    pub fn scan(&self, root: &Path) -> Result<PipelineResult<Arc<ScanOutcome>>, ScanError> {
        let result = self.pipeline.run(root)?.map(Arc::new);
        let mut slot = self.latest.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(Arc::clone(&result.data));
        Ok(result)
    }

    /// The last completed scan, if any.
    pub fn latest(&self) -> Option<Arc<ScanOutcome>> {
        match self.latest.read() {
            Ok(slot) => slot.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn usages(&self, dep: &Dependency) -> Vec<ModuleId> {
        self.latest()
            .map(|o| QueryEngine::new(&o.hierarchy).usages(dep))
            .unwrap_or_default()
    }

    pub fn built_by(&self, dep: &Dependency) -> Option<BuildSite> {
        self.latest()
            .and_then(|o| QueryEngine::new(&o.hierarchy).built_by(dep))
    }

    pub fn analyze(&self, dep: &Dependency) -> GraphAnalysis {
        self.latest()
            .map(|o| QueryEngine::new(&o.hierarchy).analyze(dep))
            .unwrap_or_default()
    }

    /// Layout of the subgraph relevant to `dep`: its users, its builder and
    /// every module linking down to them.
    pub fn layout_for(&self, dep: &Dependency) -> LevelLayout {
        let Some(outcome) = self.latest() else {
            return LevelLayout::default();
        };
        let engine = QueryEngine::new(&outcome.hierarchy);
        let filter = engine.subgraph_filter(&engine.analyze(dep));
        LevelLayout::compute_filtered(&outcome.hierarchy, Some(&filter))
    }
}
