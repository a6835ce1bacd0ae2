//! Module-factory safety analysis.
//!
//! An exported module-level constant holding translatable strings can be
//! turned into `(t) => (<init>)` only when every use of it, in every file,
//! can be rewritten to `NAME(t)` inside a component. Anything the reference
//! index cannot see or rewrite makes the binding unsafe.

pub mod analyzer;
pub mod references;

use std::{
    collections::{BTreeSet, HashMap},
    fmt, fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use swc_common::{SourceMap, Span};

pub use analyzer::analyze_factories;

use crate::core::{
    extract::{FileScan, types::ScopeId},
    graph::{
        FileId,
        imports::{FileImports, collect_imports},
    },
    parsers::jsx::{ParsedJSX, parse_jsx_source},
};

/// Why a binding stays a plain constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsafeReason {
    ModuleScope,
    NonComponent,
    Mutated,
    NamespaceImport,
    ExportAll,
    ReExported,
    DynamicImport,
    ExternalImporter,
    UnparseableMention,
    AmbiguousImport,
    Reserved,
    TypeQuery,
    JsxTag,
    Shadowed,
    OpaqueAccessor,
    RewriteFailed,
}

impl fmt::Display for UnsafeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::ModuleScope => "referenced at module scope",
            Self::NonComponent => "referenced outside a component",
            Self::Mutated => "mutated",
            Self::NamespaceImport => "module imported as a namespace",
            Self::ExportAll => "module re-exported with export *",
            Self::ReExported => "binding re-exported",
            Self::DynamicImport => "module loaded dynamically",
            Self::ExternalImporter => "imported from outside the include set",
            Self::UnparseableMention => "mentioned in a file that does not parse",
            Self::AmbiguousImport => "imported through an unresolved path",
            Self::Reserved => "reserved framework export",
            Self::TypeQuery => "used in a type query",
            Self::JsxTag => "used as a JSX tag",
            Self::Shadowed => "name re-declared in a referencing file",
            Self::OpaqueAccessor => "referencing component has an accessor with a dynamic namespace",
            Self::RewriteFailed => "a file using it could not be rewritten",
        };
        f.write_str(text)
    }
}

/// A converted constant, keyed by where it is defined.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FactoryBinding {
    pub file: FileId,
    pub name: String,
}

/// A reference to rewrite into `NAME(accessor)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactoryReference {
    pub binding: FactoryBinding,
    /// Name of the binding in the referencing file.
    pub local: String,
    pub span: Span,
    pub shorthand: bool,
    pub scope: ScopeId,
}

/// What the rewrite pass does for factories in one file.
#[derive(Debug, Clone, Default)]
pub struct FileFactories {
    /// Constants defined in this file that become factories.
    pub definitions: Vec<String>,
    pub references: Vec<FactoryReference>,
}

impl FileFactories {
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty() && self.references.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct RejectedFactory {
    pub file: FileId,
    pub name: String,
    pub reason: UnsafeReason,
}

#[derive(Debug, Default)]
pub struct FactoryPlan {
    files: HashMap<FileId, FileFactories>,
    pub rejected: Vec<RejectedFactory>,
}

impl FactoryPlan {
    pub fn for_file(&self, id: FileId) -> Option<&FileFactories> {
        self.files.get(&id).filter(|f| !f.is_empty())
    }

    pub fn converted_count(&self) -> usize {
        self.files.values().map(|f| f.definitions.len()).sum()
    }

    /// Bindings defined or referenced in `id`.
    pub fn bindings_in(&self, id: FileId) -> BTreeSet<FactoryBinding> {
        let Some(file) = self.files.get(&id) else {
            return BTreeSet::new();
        };
        file.definitions
            .iter()
            .map(|name| FactoryBinding {
                file: id,
                name: name.clone(),
            })
            .chain(file.references.iter().map(|r| r.binding.clone()))
            .collect()
    }

    /// Keeps `binding` a plain constant after all. Returns every file whose
    /// factory edits changed.
    pub fn retract(&mut self, binding: &FactoryBinding, reason: UnsafeReason) -> BTreeSet<FileId> {
        let mut touched = BTreeSet::new();
        for (&id, file) in self.files.iter_mut() {
            let before = file.definitions.len() + file.references.len();
            if id == binding.file {
                file.definitions.retain(|name| *name != binding.name);
            }
            file.references.retain(|r| r.binding != *binding);
            if file.definitions.len() + file.references.len() != before {
                touched.insert(id);
            }
        }
        if !touched.is_empty() {
            self.rejected.push(RejectedFactory {
                file: binding.file,
                name: binding.name.clone(),
                reason,
            });
        }
        touched
    }
}

/// A parsed in-scope file as seen by the analyzer.
pub struct FileAnalysis<'a> {
    pub parsed: &'a ParsedJSX,
    pub scan: &'a FileScan,
    pub imports: &'a FileImports,
}

/// One in-scope file; `analysis` is `None` when it failed to parse.
pub struct FactoryFile<'a> {
    pub source: &'a str,
    pub analysis: Option<FileAnalysis<'a>>,
}

/// A source file outside the include set, scanned only for its imports.
#[derive(Debug)]
pub struct ExternalFile {
    pub path: PathBuf,
    pub source: String,
    /// `None` when the file does not parse.
    pub imports: Option<FileImports>,
}

impl ExternalFile {
    pub fn from_source(path: PathBuf, source: String) -> Self {
        let parsed = parse_jsx_source(
            source.clone(),
            &path.to_string_lossy(),
            Arc::new(SourceMap::default()),
        );
        let imports = parsed.ok().map(|parsed| collect_imports(&parsed));
        Self {
            path,
            source,
            imports,
        }
    }

    pub fn load(path: &Path) -> Option<Self> {
        match fs::read_to_string(path) {
            Ok(source) => Some(Self::from_source(path.to_path_buf(), source)),
            Err(err) => {
                tracing::warn!("Cannot read external file {}: {}", path.display(), err);
                None
            }
        }
    }
}
