//! Deterministic file discovery under a repository root.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

/// Compile exclusion patterns into a single matcher.
///
/// Uses globset, which supports `**` for recursive directory matching.
pub fn build_excludes(patterns: &[String]) -> Result<GlobSet, globset::Error> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    builder.build()
}

/// Collect files under `root` whose extension is one of `extensions` (without dot).
///
/// Entries are visited in file-name order within each directory so repeated runs
/// over an unchanged tree yield the same sequence. Hidden directories are walked
/// like any other; anything matching `excludes` (relative to `root`) is skipped.
pub fn collect_files(root: &Path, extensions: &[&str], excludes: &GlobSet) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 {
                return true;
            }
            let rel = e.path().strip_prefix(root).unwrap_or(e.path());
            !excludes.is_match(rel)
        });

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                log::warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let ext = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        if extensions.contains(&ext) {
            files.push(entry.into_path());
        }
    }

    files
}
