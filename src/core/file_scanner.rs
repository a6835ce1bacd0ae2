use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use glob::{Pattern, glob};
use walkdir::{DirEntry, WalkDir};

use crate::config::TEST_FILE_PATTERNS;

/// Directories never worth descending into.
const ALWAYS_SKIPPED_DIRS: &[&str] = &["node_modules", ".next", ".git", "dist", "build", "out"];

/// Check if a pattern contains glob wildcards (* or ?).
/// Patterns without wildcards are treated as literal directory paths.
fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Result of scanning files.
pub struct ScanResult {
    /// Source files inside the include set, sorted.
    pub files: Vec<PathBuf>,
    /// Source files under the root that are outside the include set.
    pub external_files: Vec<PathBuf>,
    pub skipped_count: usize,
}

struct IgnoreRules {
    literal_paths: Vec<PathBuf>,
    patterns: Vec<Pattern>,
}

impl IgnoreRules {
    fn new(base_dir: &Path, ignore_patterns: &[String], ignore_test_files: bool) -> Self {
        let mut literal_paths = Vec::new();
        let mut patterns = Vec::new();

        for p in ignore_patterns {
            if is_glob_pattern(p) {
                match Pattern::new(p) {
                    Ok(pattern) => patterns.push(pattern),
                    Err(e) => tracing::warn!("Invalid ignore pattern '{}': {}", p, e),
                }
            } else {
                literal_paths.push(base_dir.join(p));
            }
        }

        if ignore_test_files {
            patterns.extend(TEST_FILE_PATTERNS.iter().filter_map(|p| Pattern::new(p).ok()));
        }

        Self {
            literal_paths,
            patterns,
        }
    }

    fn is_ignored(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        self.literal_paths.iter().any(|ignore| path.starts_with(ignore))
            || self.patterns.iter().any(|p| p.matches(&path_str))
    }
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| ALWAYS_SKIPPED_DIRS.contains(&name))
}

fn include_dirs(base_dir: &Path, includes: &[String]) -> Vec<PathBuf> {
    if includes.is_empty() {
        return vec![base_dir.to_path_buf()];
    }

    let mut paths = Vec::new();
    for inc in includes {
        if is_glob_pattern(inc) {
            let full_pattern = base_dir.join(inc);
            match glob(&full_pattern.to_string_lossy()) {
                Ok(entries) => paths.extend(entries.flatten().filter(|entry| entry.is_dir())),
                Err(e) => tracing::warn!("Invalid glob pattern '{}': {}", inc, e),
            }
        } else {
            let path = base_dir.join(inc);
            if path.exists() {
                paths.push(path);
            } else {
                tracing::debug!("Include path does not exist: {}", path.display());
            }
        }
    }
    paths
}

pub fn scan_files(
    base_dir: &Path,
    includes: &[String],
    ignore_patterns: &[String],
    ignore_test_files: bool,
) -> ScanResult {
    let rules = IgnoreRules::new(base_dir, ignore_patterns, ignore_test_files);
    let mut files = BTreeSet::new();
    let mut skipped_count = 0;

    for dir in include_dirs(base_dir, includes) {
        let walker = WalkDir::new(&dir).into_iter().filter_entry(|e| !is_skipped_dir(e));
        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    skipped_count += 1;
                    tracing::warn!("Cannot access path: {}", e);
                    continue;
                }
            };
            let path = entry.path();
            if rules.is_ignored(path) {
                continue;
            }
            if path.is_file() && is_scannable_file(path) {
                files.insert(path.to_path_buf());
            }
        }
    }

    let external_files = WalkDir::new(base_dir)
        .into_iter()
        .filter_entry(|e| !is_skipped_dir(e))
        .flatten()
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file() && is_scannable_file(path) && !files.contains(path))
        .collect::<BTreeSet<_>>();

    ScanResult {
        files: files.into_iter().collect(),
        external_files: external_files.into_iter().collect(),
        skipped_count,
    }
}

fn is_scannable_file(path: &Path) -> bool {
    if path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(".d.ts"))
    {
        return false;
    }
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("tsx" | "ts" | "jsx" | "js" | "mjs" | "cjs")
    )
}
