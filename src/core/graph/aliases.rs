//! `compilerOptions.paths` / `baseUrl` from a tsconfig, with `extends`.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use crate::core::parsers::jsonc::parse_jsonc;

const MAX_EXTENDS_DEPTH: usize = 5;

#[derive(Debug, Clone)]
struct AliasEntry {
    prefix: String,
    suffix: String,
    wildcard: bool,
    targets: Vec<String>,
    base: PathBuf,
}

impl AliasEntry {
    /// The part of `source` matched by `*`, `""` for exact entries.
    fn capture<'s>(&self, source: &'s str) -> Option<&'s str> {
        if !self.wildcard {
            return (source == self.prefix).then_some("");
        }
        if source.len() < self.prefix.len() + self.suffix.len() {
            return None;
        }
        source
            .strip_prefix(self.prefix.as_str())?
            .strip_suffix(self.suffix.as_str())
    }
}

/// Path aliases of a project; empty when no tsconfig is present.
#[derive(Debug, Clone, Default)]
pub struct PathAliases {
    entries: Vec<AliasEntry>,
    base_url: Option<PathBuf>,
}

#[derive(Default)]
struct Resolved {
    base_url: Option<PathBuf>,
    /// `paths` object and the directory of the config defining it.
    paths: Option<(Map<String, Value>, PathBuf)>,
}

fn load_chain(path: &Path, depth: usize) -> Result<Resolved> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let json = parse_jsonc(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
    let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

    let mut resolved = match json.get("extends").and_then(Value::as_str) {
        Some(parent) if depth < MAX_EXTENDS_DEPTH && parent.starts_with('.') => {
            let parent_path = if parent.ends_with(".json") {
                dir.join(parent)
            } else {
                dir.join(format!("{}.json", parent))
            };
            match load_chain(&parent_path, depth + 1) {
                Ok(resolved) => resolved,
                Err(err) => {
                    tracing::warn!("Ignoring extended tsconfig: {:#}", err);
                    Resolved::default()
                }
            }
        }
        _ => Resolved::default(),
    };

    if let Some(options) = json.get("compilerOptions") {
        if let Some(base_url) = options.get("baseUrl").and_then(Value::as_str) {
            resolved.base_url = Some(dir.join(base_url));
        }
        if let Some(Value::Object(paths)) = options.get("paths") {
            resolved.paths = Some((paths.clone(), dir.clone()));
        }
    }
    Ok(resolved)
}

impl PathAliases {
    pub fn from_tsconfig(path: &Path) -> Result<Self> {
        let resolved = load_chain(path, 0)?;
        let mut entries = Vec::new();

        if let Some((paths, defining_dir)) = resolved.paths {
            let base = resolved.base_url.clone().unwrap_or(defining_dir);
            for (pattern, targets) in paths {
                let targets: Vec<String> = match targets {
                    Value::Array(items) => items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect(),
                    Value::String(target) => vec![target],
                    _ => continue,
                };
                let (prefix, suffix, wildcard) = match pattern.split_once('*') {
                    Some((prefix, suffix)) => (prefix.to_string(), suffix.to_string(), true),
                    None => (pattern.clone(), String::new(), false),
                };
                entries.push(AliasEntry {
                    prefix,
                    suffix,
                    wildcard,
                    targets,
                    base: base.clone(),
                });
            }
        }

        // Exact patterns first, then wildcards by longest prefix.
        entries.sort_by(|a, b| {
            a.wildcard
                .cmp(&b.wildcard)
                .then_with(|| b.prefix.len().cmp(&a.prefix.len()))
        });

        Ok(Self {
            entries,
            base_url: resolved.base_url,
        })
    }

    /// Loads `<root>/<tsconfig>`; a missing or malformed file yields no aliases.
    pub fn load(root: &Path, tsconfig: &str) -> Self {
        let path = root.join(tsconfig);
        if !path.exists() {
            return Self::default();
        }
        match Self::from_tsconfig(&path) {
            Ok(aliases) => aliases,
            Err(err) => {
                tracing::warn!("Ignoring tsconfig paths: {:#}", err);
                Self::default()
            }
        }
    }

    pub fn base_url(&self) -> Option<&Path> {
        self.base_url.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.base_url.is_none()
    }

    /// Candidate base paths for an aliased specifier, best match first.
    pub fn candidates(&self, source: &str) -> Vec<PathBuf> {
        let Some(entry) = self.entries.iter().find(|e| e.capture(source).is_some()) else {
            return Vec::new();
        };
        let captured = entry.capture(source).unwrap_or_default();
        entry
            .targets
            .iter()
            .map(|target| entry.base.join(target.replacen('*', captured, 1)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_exact_beats_wildcard_and_longest_prefix_wins() {
        let dir = TempDir::new().unwrap();
        let path = write(
            dir.path(),
            "tsconfig.json",
            r#"{
                // comments are allowed
                "compilerOptions": {
                    "baseUrl": ".",
                    "paths": {
                        "@/*": ["src/*"],
                        "@/ui/*": ["src/components/ui/*"],
                        "config": ["src/config/index.ts"],
                    }
                }
            }"#,
        );
        let aliases = PathAliases::from_tsconfig(&path).unwrap();
        assert_eq!(aliases.candidates("@/lib/util"), vec![dir.path().join("./src/lib/util")]);
        assert_eq!(
            aliases.candidates("@/ui/button"),
            vec![dir.path().join("./src/components/ui/button")]
        );
        assert_eq!(aliases.candidates("config"), vec![dir.path().join("./src/config/index.ts")]);
        assert!(aliases.candidates("react").is_empty());
    }

    #[test]
    fn test_extends_supplies_paths() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "tsconfig.base.json",
            r#"{ "compilerOptions": { "paths": { "~lib/*": ["./lib/*"] } } }"#,
        );
        let path = write(dir.path(), "tsconfig.json", r#"{ "extends": "./tsconfig.base" }"#);
        let aliases = PathAliases::from_tsconfig(&path).unwrap();
        assert_eq!(aliases.candidates("~lib/date"), vec![dir.path().join("./lib/date")]);
        assert!(aliases.base_url().is_none());
    }

    #[test]
    fn test_missing_or_broken_tsconfig_yields_empty() {
        let dir = TempDir::new().unwrap();
        assert!(PathAliases::load(dir.path(), "tsconfig.json").is_empty());
        write(dir.path(), "tsconfig.json", "{ not json");
        assert!(PathAliases::load(dir.path(), "tsconfig.json").is_empty());
    }
}
