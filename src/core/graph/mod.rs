//! Phase 2: whole-project import graph and client closure.
//!
//! Files live in an arena indexed by [`FileId`]; edges are id lists. The
//! graph is built once, after every file has been parsed, and is read-only
//! afterwards.

pub mod aliases;
pub mod client;
pub mod imports;
pub mod resolver;

use std::{
    collections::{HashMap, VecDeque},
    path::{Path, PathBuf},
};

use aliases::PathAliases;
use imports::FileImports;
use resolver::{ImportResolver, normalize_path};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub u32);

impl FileId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Per-file result of classification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileClassification {
    pub is_parseable: bool,
    pub is_client_root: bool,
    pub is_client_reachable: bool,
    pub import_targets: Vec<FileId>,
}

#[derive(Debug, Default)]
pub struct ImportGraph {
    paths: Vec<PathBuf>,
    ids: HashMap<PathBuf, FileId>,
    edges: Vec<Vec<FileId>>,
}

impl ImportGraph {
    /// Builds the graph; `imports[i]` is `None` for files that failed to parse.
    pub fn build(
        paths: &[PathBuf],
        imports: &[Option<&FileImports>],
        root: &Path,
        aliases: &PathAliases,
    ) -> Self {
        let paths: Vec<PathBuf> = paths.iter().map(|p| normalize_path(p)).collect();
        let ids: HashMap<PathBuf, FileId> = paths
            .iter()
            .enumerate()
            .map(|(i, p)| (p.clone(), FileId(i as u32)))
            .collect();

        let resolver = ImportResolver::new(root, aliases, &ids);
        let edges = paths
            .iter()
            .enumerate()
            .map(|(i, path)| {
                let mut targets: Vec<FileId> = Vec::new();
                if let Some(Some(file_imports)) = imports.get(i) {
                    for source in file_imports.runtime_sources() {
                        if let Some(target) = resolver.resolve(path, source)
                            && target.index() != i
                            && !targets.contains(&target)
                        {
                            targets.push(target);
                        }
                    }
                }
                targets
            })
            .collect();

        Self { paths, ids, edges }
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn id_of(&self, path: &Path) -> Option<FileId> {
        self.ids.get(&normalize_path(path)).copied()
    }

    pub fn path(&self, id: FileId) -> &Path {
        &self.paths[id.index()]
    }

    pub fn known_files(&self) -> &HashMap<PathBuf, FileId> {
        &self.ids
    }

    pub fn edges(&self, id: FileId) -> &[FileId] {
        &self.edges[id.index()]
    }

    /// Files reachable from any root, roots included.
    pub fn client_closure(&self, roots: &[FileId]) -> Vec<bool> {
        let mut visited = vec![false; self.len()];
        let mut queue: VecDeque<FileId> = VecDeque::new();
        for &root in roots {
            if !visited[root.index()] {
                visited[root.index()] = true;
                queue.push_back(root);
            }
        }
        while let Some(id) = queue.pop_front() {
            for &next in self.edges(id) {
                if !visited[next.index()] {
                    visited[next.index()] = true;
                    queue.push_back(next);
                }
            }
        }
        visited
    }

    /// Combines parse status and direct client roots with the closure.
    pub fn classify(&self, parseable: &[bool], client_roots: &[bool]) -> Vec<FileClassification> {
        let roots: Vec<FileId> = client_roots
            .iter()
            .enumerate()
            .filter(|(_, is_root)| **is_root)
            .map(|(i, _)| FileId(i as u32))
            .collect();
        let reachable = self.client_closure(&roots);
        (0..self.len())
            .map(|i| FileClassification {
                is_parseable: parseable.get(i).copied().unwrap_or(false),
                is_client_root: client_roots.get(i).copied().unwrap_or(false),
                is_client_reachable: reachable[i],
                import_targets: self.edges[i].clone(),
            })
            .collect()
    }
}
