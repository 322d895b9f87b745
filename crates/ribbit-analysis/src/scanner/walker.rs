//! Sorted, hidden-file-skipping walk using the `ignore` crate.

use std::path::Path;
use std::time::Instant;

use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;
use ribbit_core::config::ScanConfig;
use ribbit_core::errors::ScanError;

use super::types::{DiscoveredFile, Discovery, FileRole, SkipReason, SkippedFile};

/// Walk `root` and sort every qualifying file into its phase.
///
/// The root is validated first; an invalid or unreadable root is the only
/// error. Unreadable entries below it are logged and skipped.
pub fn discover(root: &Path, config: &ScanConfig) -> Result<Discovery, ScanError> {
    validate_root(root)?;
    let start = Instant::now();

    let extensions = config.effective_extensions();
    let respect_ignores = config.effective_respect_gitignore();
    let max_file_size = config.effective_max_file_size();

    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(true)
        .follow_links(config.effective_follow_symlinks())
        .git_ignore(respect_ignores)
        .git_global(respect_ignores)
        .git_exclude(respect_ignores)
        .ignore(respect_ignores)
        .parents(respect_ignores)
        .sort_by_file_name(|a, b| a.cmp(b));

    if !config.extra_ignore.is_empty() {
        let mut overrides = OverrideBuilder::new(root);
        for pattern in &config.extra_ignore {
            overrides
                .add(&format!("!{pattern}"))
                .map_err(|e| ScanError::InvalidIgnorePattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })?;
        }
        let overrides = overrides
            .build()
            .map_err(|e| ScanError::InvalidIgnorePattern {
                pattern: config.extra_ignore.join(", "),
                message: e.to_string(),
            })?;
        builder.overrides(overrides);
    }

    let mut discovery = Discovery::default();
    for result in builder.build() {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable directory entry");
                discovery.stats.walk_errors += 1;
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        discovery.stats.files_seen += 1;

        let path = entry.path();
        let has_extension = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| extensions.iter().any(|x| x == e));
        if !has_extension {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let Some(role) = FileRole::from_stem(stem) else {
            continue;
        };

        let prefix = &stem[..stem.len() - role.suffix().len()];
        if !is_identifier(prefix) {
            tracing::debug!(path = %path.display(), role = ?role, "malformed file name");
            discovery.skipped.push(SkippedFile {
                path: path.to_path_buf(),
                role,
                reason: SkipReason::MalformedName,
            });
            continue;
        }

        let file_size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        if file_size > max_file_size {
            tracing::debug!(path = %path.display(), size = file_size, "file over size limit");
            discovery.skipped.push(SkippedFile {
                path: path.to_path_buf(),
                role,
                reason: SkipReason::TooLarge {
                    size: file_size,
                    limit: max_file_size,
                },
            });
            continue;
        }

        discovery.push(DiscoveredFile {
            path: path.to_path_buf(),
            role,
            prefix: prefix.to_string(),
            file_size,
        });
    }

    discovery.stats.discovery_ms = start.elapsed().as_millis() as u64;
    tracing::info!(
        files_discovered = discovery.total(),
        builders = discovery.builders.len(),
        non_core_components = discovery.non_core_components.len(),
        plugin_points = discovery.plugin_points.len(),
        discovery_duration = discovery.stats.discovery_ms,
        "discovery complete"
    );
    Ok(discovery)
}

fn validate_root(root: &Path) -> Result<(), ScanError> {
    let metadata = std::fs::metadata(root).map_err(|_| ScanError::InvalidRoot {
        path: root.to_path_buf(),
    })?;
    if !metadata.is_dir() {
        return Err(ScanError::InvalidRoot {
            path: root.to_path_buf(),
        });
    }
    std::fs::read_dir(root).map_err(|source| ScanError::UnreadableRoot {
        path: root.to_path_buf(),
        source,
    })?;
    Ok(())
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => chars.all(|c| c.is_alphanumeric() || c == '_'),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, rel: &str, body: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, body).unwrap();
    }

    #[test]
    fn files_are_sorted_into_phases() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b/RootBuilder.swift", "");
        write(dir.path(), "a/ChildBuilder.swift", "");
        write(dir.path(), "a/ChildNonCoreComponent.swift", "");
        write(dir.path(), "MapPluginPoint.swift", "");
        write(dir.path(), "Helpers.swift", "");
        write(dir.path(), "ReadmeBuilder.md", "");

        let discovery = discover(dir.path(), &ScanConfig::default()).unwrap();
        let builders: Vec<&str> = discovery.builders.iter().map(|f| f.prefix.as_str()).collect();
        assert_eq!(builders, vec!["Child", "Root"]);
        assert_eq!(discovery.non_core_components.len(), 1);
        assert_eq!(discovery.plugin_points.len(), 1);
        assert_eq!(discovery.total(), 4);
    }

    #[test]
    fn hidden_entries_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), ".build/CachedBuilder.swift", "");
        write(dir.path(), ".HiddenBuilder.swift", "");
        write(dir.path(), "VisibleBuilder.swift", "");

        let discovery = discover(dir.path(), &ScanConfig::default()).unwrap();
        assert_eq!(discovery.builders.len(), 1);
        assert_eq!(discovery.builders[0].prefix, "Visible");
    }

    #[test]
    fn bare_suffix_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "Builder.swift", "");
        write(dir.path(), "My-Builder.swift", "");

        let discovery = discover(dir.path(), &ScanConfig::default()).unwrap();
        assert_eq!(discovery.total(), 0);
        assert_eq!(discovery.skipped.len(), 2);
        assert!(discovery
            .skipped
            .iter()
            .all(|s| s.reason == SkipReason::MalformedName));
    }

    #[test]
    fn oversized_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "BigBuilder.swift", &"x".repeat(64));
        let config = ScanConfig {
            max_file_size: Some(16),
            ..Default::default()
        };
        let discovery = discover(dir.path(), &config).unwrap();
        assert_eq!(discovery.total(), 0);
        assert!(matches!(
            discovery.skipped[0].reason,
            SkipReason::TooLarge { size: 64, limit: 16 }
        ));
    }

    #[test]
    fn extra_ignore_globs_exclude_paths() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "Pods/VendorBuilder.swift", "");
        write(dir.path(), "App/AppBuilder.swift", "");
        let config = ScanConfig {
            extra_ignore: vec!["Pods/**".to_string()],
            ..Default::default()
        };
        let discovery = discover(dir.path(), &config).unwrap();
        let names: Vec<&str> = discovery.builders.iter().map(|f| f.prefix.as_str()).collect();
        assert_eq!(names, vec!["App"]);
    }

    #[test]
    fn missing_root_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            discover(&missing, &ScanConfig::default()),
            Err(ScanError::InvalidRoot { .. })
        ));

        let file = dir.path().join("file.swift");
        std::fs::write(&file, "").unwrap();
        assert!(matches!(
            discover(&file, &ScanConfig::default()),
            Err(ScanError::InvalidRoot { .. })
        ));
    }
}
