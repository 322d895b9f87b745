//! Extraction configuration.

use serde::{Deserialize, Serialize};

/// Default bound on lexical-parent walks.
pub const DEFAULT_TRAVERSAL_LIMIT: usize = 10;

/// Namespaces stripped from base types before role matching.
pub const DEFAULT_NAMESPACE_PREFIXES: &[&str] = &["NeedleFoundation", "Presidio"];

/// Configuration for declaration classification and linking.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Maximum lexical-parent hops when searching upward. Default: 10.
    pub traversal_limit: Option<usize>,
    /// Module namespaces qualifying base types, e.g. `NeedleFoundation.Component`.
    #[serde(default)]
    pub namespace_prefixes: Vec<String>,
    /// Treat files with syntax errors as parse failures. Default: false.
    pub strict_syntax: Option<bool>,
    /// Log unresolvable child references at warn instead of debug. Default: false.
    pub warn_on_ambiguous: Option<bool>,
}

impl ExtractionConfig {
    pub fn effective_traversal_limit(&self) -> usize {
        self.traversal_limit.unwrap_or(DEFAULT_TRAVERSAL_LIMIT)
    }

    pub fn effective_namespace_prefixes(&self) -> Vec<String> {
        if self.namespace_prefixes.is_empty() {
            DEFAULT_NAMESPACE_PREFIXES
                .iter()
                .map(|s| s.to_string())
                .collect()
        } else {
            self.namespace_prefixes.clone()
        }
    }

    pub fn effective_strict_syntax(&self) -> bool {
        self.strict_syntax.unwrap_or(false)
    }

    pub fn effective_warn_on_ambiguous(&self) -> bool {
        self.warn_on_ambiguous.unwrap_or(false)
    }
}
