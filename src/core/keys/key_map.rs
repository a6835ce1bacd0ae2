use std::{
    collections::{BTreeSet, HashMap},
    fs,
    path::Path,
};

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};

use super::namespace::{infer_namespace, qualify_key};
use crate::core::extract::ExtractedString;

/// Source text -> generated dotted key.
///
/// Keys are unique, and no key is both a leaf and a strict dot-prefix of
/// another key. Both hold for every map built through [`TextToKeyMap::from_entries`].
#[derive(Debug, Clone, Default)]
pub struct TextToKeyMap {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
    keys: BTreeSet<String>,
}

fn has_children(keys: &BTreeSet<String>, key: &str) -> bool {
    let prefix = format!("{}.", key);
    keys.range(prefix.clone()..)
        .next()
        .is_some_and(|next| next.starts_with(&prefix))
}

fn next_free(base: &str, keys: &BTreeSet<String>) -> String {
    (2..)
        .map(|n| format!("{}{}", base, n))
        .find(|candidate| !keys.contains(candidate) && !has_children(keys, candidate))
        .unwrap_or_else(|| base.to_string())
}

impl TextToKeyMap {
    /// Builds a map, resolving key collisions in input order: a later text
    /// whose key is taken gets a numeric suffix, and a key that is also a
    /// prefix of another key is renamed the same way.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut map = Self::default();
        for (text, key) in entries {
            let key = key.trim().to_string();
            if key.is_empty() || map.index.contains_key(&text) {
                continue;
            }
            let key = if map.keys.contains(&key) {
                next_free(&key, &map.keys)
            } else {
                key
            };
            map.keys.insert(key.clone());
            map.index.insert(text.clone(), map.entries.len());
            map.entries.push((text, key));
        }
        map.resolve_prefix_conflicts();
        map
    }

    fn resolve_prefix_conflicts(&mut self) {
        for i in 0..self.entries.len() {
            let key = self.entries[i].1.clone();
            if !has_children(&self.keys, &key) {
                continue;
            }
            let renamed = next_free(&key, &self.keys);
            self.keys.remove(&key);
            self.keys.insert(renamed.clone());
            self.entries[i].1 = renamed;
        }
    }

    pub fn key_for(&self, text: &str) -> Option<&str> {
        self.index
            .get(text)
            .map(|&i| self.entries[i].1.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(t, k)| (t.as_str(), k.as_str()))
    }

    /// Qualifies dot-less keys with a namespace inferred from the first
    /// candidate occurrence of their text.
    pub fn qualified<'c>(&self, candidates: impl IntoIterator<Item = &'c ExtractedString>) -> Self {
        let mut first_seen: HashMap<&str, &ExtractedString> = HashMap::new();
        for candidate in candidates {
            first_seen.entry(candidate.text.as_str()).or_insert(candidate);
        }
        let entries = self.entries.iter().map(|(text, key)| {
            if key.contains('.') {
                return (text.clone(), key.clone());
            }
            let namespace = match first_seen.get(text.as_str()) {
                Some(c) => infer_namespace(
                    c.component_name.as_deref(),
                    c.route_path.as_deref(),
                    &c.file,
                ),
                None => infer_namespace(None, None, ""),
            };
            (text.clone(), qualify_key(key, &namespace))
        });
        Self::from_entries(entries.collect::<Vec<_>>())
    }

    /// Map built from raw key-generation output.
    pub fn from_generated<I>(entries: I, candidates: &[ExtractedString]) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self::from_entries(entries).qualified(candidates)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(content).context("Invalid key map JSON")?;
        let Value::Object(object) = value else {
            bail!("Key map must be a JSON object of text -> key");
        };
        let mut entries = Vec::with_capacity(object.len());
        for (text, key) in object {
            match key {
                Value::String(key) => entries.push((text, key)),
                other => bail!("Key for {:?} must be a string, got {}", text, other),
            }
        }
        Ok(Self::from_entries(entries))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read key map: {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("Failed to parse key map: {}", path.display()))
    }

    pub fn to_json(&self) -> Result<String> {
        let object: Map<String, Value> = self
            .entries
            .iter()
            .map(|(t, k)| (t.clone(), Value::String(k.clone())))
            .collect();
        serde_json::to_string_pretty(&Value::Object(object)).context("Failed to serialize key map")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()? + "\n")
            .with_context(|| format!("Failed to write key map: {}", path.display()))
    }
}
