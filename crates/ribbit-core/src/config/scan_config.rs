//! Scan configuration.

use serde::{Deserialize, Serialize};

/// Configuration for file discovery and the per-phase worker pool.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScanConfig {
    /// Worker threads per phase. 0 or unset = rayon default.
    pub threads: Option<usize>,
    /// Source file extensions to consider. Default: `["swift"]`.
    #[serde(default)]
    pub extensions: Vec<String>,
    /// Follow symbolic links while walking. Default: false.
    pub follow_symlinks: Option<bool>,
    /// Honour `.gitignore` files under the root. Default: false.
    pub respect_gitignore: Option<bool>,
    /// Extra glob patterns to exclude.
    #[serde(default)]
    pub extra_ignore: Vec<String>,
    /// Files larger than this are never parsed. Default: 4 MiB.
    pub max_file_size: Option<u64>,
}

impl ScanConfig {
    /// Returns the effective worker count, 0 meaning "let rayon decide".
    pub fn effective_threads(&self) -> usize {
        self.threads.unwrap_or(0)
    }

    /// Returns the effective extension list, defaulting to `swift`.
    pub fn effective_extensions(&self) -> Vec<String> {
        if self.extensions.is_empty() {
            vec!["swift".to_string()]
        } else {
            self.extensions.clone()
        }
    }

    pub fn effective_follow_symlinks(&self) -> bool {
        self.follow_symlinks.unwrap_or(false)
    }

    pub fn effective_respect_gitignore(&self) -> bool {
        self.respect_gitignore.unwrap_or(false)
    }

    /// Returns the effective max file size, defaulting to 4 MiB.
    pub fn effective_max_file_size(&self) -> u64 {
        self.max_file_size.unwrap_or(4 * 1024 * 1024)
    }
}
