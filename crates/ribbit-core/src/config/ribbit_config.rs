//! Top-level Ribbit configuration with layered resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{ExtractionConfig, ScanConfig};
use crate::errors::ConfigError;

/// Name of the project-level config file looked up in the scan root.
pub const PROJECT_CONFIG_FILE: &str = "ribbit.toml";

/// Upper bound accepted for `scan.threads`.
const MAX_THREADS: usize = 512;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `apply_cli_overrides`)
/// 2. Environment variables (`RIBBIT_*`)
/// 3. Project config (`ribbit.toml` in the scan root)
/// 4. User config (`~/.ribbit/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RibbitConfig {
    pub scan: ScanConfig,
    pub extraction: ExtractionConfig,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub scan_threads: Option<usize>,
    pub scan_extensions: Vec<String>,
    pub traversal_limit: Option<usize>,
    pub strict_syntax: Option<bool>,
}

impl RibbitConfig {
    /// Load configuration for a scan rooted at `root`.
    pub fn load(root: &Path, cli_overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Lowest priority: user config. A broken user file is reported, a
        // missing one is not.
        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                match Self::merge_toml_file(&mut config, &user_config_path) {
                    Ok(()) => {}
                    Err(e @ ConfigError::Malformed { .. }) => return Err(e),
                    Err(e) => {
                        tracing::warn!(error = %e, "ignoring unreadable user config");
                    }
                }
            }
        }

        let project_config_path = root.join(PROJECT_CONFIG_FILE);
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        Self::apply_env_overrides(&mut config);

        if let Some(cli) = cli_overrides {
            Self::apply_cli_overrides(&mut config, cli);
        }

        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::Malformed {
            path: PathBuf::from("<inline>"),
            message: e.to_string(),
        })?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate the configuration values.
    pub fn validate(config: &RibbitConfig) -> Result<(), ConfigError> {
        if let Some(value @ 0) = config.extraction.traversal_limit {
            return Err(ConfigError::TraversalLimit { value });
        }
        if config.scan.max_file_size == Some(0) {
            return Err(ConfigError::ZeroFileSizeLimit);
        }
        if let Some(value) = config.scan.threads.filter(|&t| t > MAX_THREADS) {
            return Err(ConfigError::ThreadCount {
                value,
                max: MAX_THREADS,
            });
        }
        if let Some(ext) = config
            .scan
            .extensions
            .iter()
            .find(|ext| ext.trim().is_empty() || ext.starts_with('.'))
        {
            return Err(ConfigError::Extension {
                extension: ext.clone(),
            });
        }
        Ok(())
    }

    /// Returns the user config path: `~/.ribbit/config.toml`.
    fn user_config_path() -> Option<PathBuf> {
        home_dir().map(|h| h.join(".ribbit").join("config.toml"))
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored.
    fn merge_toml_file(config: &mut RibbitConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

        let file_config: RibbitConfig =
            toml::from_str(&content).map_err(|e| ConfigError::Malformed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; `other` wins wherever it has a value.
    fn merge(base: &mut RibbitConfig, other: &RibbitConfig) {
        // Scan
        if other.scan.threads.is_some() {
            base.scan.threads = other.scan.threads;
        }
        if !other.scan.extensions.is_empty() {
            base.scan.extensions = other.scan.extensions.clone();
        }
        if other.scan.follow_symlinks.is_some() {
            base.scan.follow_symlinks = other.scan.follow_symlinks;
        }
        if other.scan.respect_gitignore.is_some() {
            base.scan.respect_gitignore = other.scan.respect_gitignore;
        }
        if !other.scan.extra_ignore.is_empty() {
            base.scan.extra_ignore = other.scan.extra_ignore.clone();
        }
        if other.scan.max_file_size.is_some() {
            base.scan.max_file_size = other.scan.max_file_size;
        }

        // Extraction
        if other.extraction.traversal_limit.is_some() {
            base.extraction.traversal_limit = other.extraction.traversal_limit;
        }
        if !other.extraction.namespace_prefixes.is_empty() {
            base.extraction.namespace_prefixes = other.extraction.namespace_prefixes.clone();
        }
        if other.extraction.strict_syntax.is_some() {
            base.extraction.strict_syntax = other.extraction.strict_syntax;
        }
        if other.extraction.warn_on_ambiguous.is_some() {
            base.extraction.warn_on_ambiguous = other.extraction.warn_on_ambiguous;
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `RIBBIT_SCAN_THREADS`, `RIBBIT_EXTRACTION_TRAVERSAL_LIMIT`, etc.
    fn apply_env_overrides(config: &mut RibbitConfig) {
        if let Ok(val) = std::env::var("RIBBIT_SCAN_THREADS") {
            if let Ok(v) = val.parse::<usize>() {
                config.scan.threads = Some(v);
            }
        }
        if let Ok(val) = std::env::var("RIBBIT_SCAN_EXTENSIONS") {
            let exts: Vec<String> = val
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !exts.is_empty() {
                config.scan.extensions = exts;
            }
        }
        if let Ok(val) = std::env::var("RIBBIT_SCAN_MAX_FILE_SIZE") {
            if let Ok(v) = val.parse::<u64>() {
                config.scan.max_file_size = Some(v);
            }
        }
        if let Ok(val) = std::env::var("RIBBIT_EXTRACTION_TRAVERSAL_LIMIT") {
            if let Ok(v) = val.parse::<usize>() {
                config.extraction.traversal_limit = Some(v);
            }
        }
        if let Ok(val) = std::env::var("RIBBIT_EXTRACTION_STRICT_SYNTAX") {
            if let Ok(v) = val.parse::<bool>() {
                config.extraction.strict_syntax = Some(v);
            }
        }
    }

    /// Apply CLI overrides (highest priority).
    fn apply_cli_overrides(config: &mut RibbitConfig, cli: &CliOverrides) {
        if let Some(v) = cli.scan_threads {
            config.scan.threads = Some(v);
        }
        if !cli.scan_extensions.is_empty() {
            config.scan.extensions = cli.scan_extensions.clone();
        }
        if let Some(v) = cli.traversal_limit {
            config.extraction.traversal_limit = Some(v);
        }
        if let Some(v) = cli.strict_syntax {
            config.extraction.strict_syntax = Some(v);
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize {
            message: e.to_string(),
        })
    }
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
