//! Import specifier -> project file resolution.
//!
//! Resolution only consults the set of files known to the pipeline, never the
//! file system, so results are stable for a given scan.

use std::{
    collections::HashMap,
    ffi::OsString,
    path::{Component, Path, PathBuf},
};

use super::{FileId, aliases::PathAliases};

pub const RESOLVE_EXTENSIONS: &[&str] = &["tsx", "ts", "jsx", "js", "mjs", "cjs"];

/// Conventional root aliases tried when no tsconfig mapping matches.
const ROOT_PREFIXES: &[&str] = &["@/", "~/"];

/// Lexical normalization: drops `.` and folds `..`.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut s: OsString = base.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

pub struct ImportResolver<'a> {
    root: &'a Path,
    aliases: &'a PathAliases,
    known: &'a HashMap<PathBuf, FileId>,
}

impl<'a> ImportResolver<'a> {
    pub fn new(root: &'a Path, aliases: &'a PathAliases, known: &'a HashMap<PathBuf, FileId>) -> Self {
        Self {
            root,
            aliases,
            known,
        }
    }

    /// Resolves `source` imported from `importer`; `None` for packages and
    /// files outside the known set.
    pub fn resolve(&self, importer: &Path, source: &str) -> Option<FileId> {
        if source.starts_with("./") || source.starts_with("../") || source == "." || source == ".." {
            let dir = importer.parent()?;
            return self.expand(&dir.join(source));
        }

        let aliased = self.aliases.candidates(source);
        if !aliased.is_empty() {
            return aliased.iter().find_map(|base| self.expand(base));
        }

        if let Some(base_url) = self.aliases.base_url()
            && let Some(id) = self.expand(&base_url.join(source))
        {
            return Some(id);
        }

        for prefix in ROOT_PREFIXES {
            if let Some(rest) = source.strip_prefix(prefix) {
                return self
                    .expand(&self.root.join(rest))
                    .or_else(|| self.expand(&self.root.join("src").join(rest)));
            }
        }

        if let Some(rest) = source.strip_prefix('/') {
            return self.expand(&self.root.join(rest));
        }
        None
    }

    fn lookup(&self, path: &Path) -> Option<FileId> {
        self.known.get(path).copied()
    }

    fn expand(&self, base: &Path) -> Option<FileId> {
        let base = normalize_path(base);
        if let Some(id) = self.lookup(&base) {
            return Some(id);
        }
        for ext in RESOLVE_EXTENSIONS {
            if let Some(id) = self.lookup(&with_suffix(&base, &format!(".{}", ext))) {
                return Some(id);
            }
        }
        // ESM-style specifiers name the emitted file: `./util.js` -> `util.ts`.
        let swapped: &[&str] = match base.extension().and_then(|e| e.to_str()) {
            Some("js") => &["ts", "tsx"],
            Some("jsx") => &["tsx"],
            Some("mjs") => &["mts"],
            Some("cjs") => &["cts"],
            _ => &[],
        };
        for ext in swapped {
            if let Some(id) = self.lookup(&base.with_extension(ext)) {
                return Some(id);
            }
        }
        RESOLVE_EXTENSIONS
            .iter()
            .find_map(|ext| self.lookup(&base.join(format!("index.{}", ext))))
    }
}
