//! Filesystem scanner for the CLI.
//!
//! Walks a source tree and turns matching files into [`SourceFile`]s
//! ready for indexing. The file's root-relative path doubles as its
//! stable identifier.

use anyhow::{bail, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;
use walkdir::WalkDir;

use simdex_core::models::SourceFile;

use crate::config::ScannerConfig;
use crate::structure::ProjectFile;

/// A file discovered under the scan root.
#[derive(Debug, Clone)]
pub struct ScannedFile {
    pub file: SourceFile,
    pub path: String,
}

impl ScannedFile {
    pub fn project_file(&self) -> ProjectFile {
        ProjectFile {
            name: self
                .path
                .rsplit('/')
                .next()
                .unwrap_or(&self.path)
                .to_string(),
            path: self.path.clone(),
        }
    }
}

/// Scan a source tree for files matching the configured globs.
pub fn scan_source_tree(root: &Path, config: &ScannerConfig) -> Result<Vec<ScannedFile>> {
    if !root.exists() {
        bail!("Scan root does not exist: {}", root.display());
    }

    let include_set = build_globset(&config.include_globs)?;

    let mut default_excludes = vec![
        "**/.git/**".to_string(),
        "**/target/**".to_string(),
        "**/node_modules/**".to_string(),
    ];
    default_excludes.extend(config.exclude_globs.clone());
    let exclude_set = build_globset(&default_excludes)?;

    let mut files = Vec::new();

    let walker = WalkDir::new(root).follow_links(config.follow_symlinks);
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative.to_string_lossy().replace('\\', "/");

        if exclude_set.is_match(&rel_str) {
            continue;
        }
        if !include_set.is_match(&rel_str) {
            continue;
        }

        let content = std::fs::read_to_string(path).unwrap_or_default();
        files.push(ScannedFile {
            file: SourceFile {
                id: rel_str.clone(),
                content,
            },
            path: rel_str,
        });
    }

    // Sort for deterministic ordering
    files.sort_by(|a, b| a.path.cmp(&b.path));

    Ok(files)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}
