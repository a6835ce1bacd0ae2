//! Codegen orchestration.
//!
//! 1. **Load** (parallel): read, parse, scan and extract every file, and
//!    record whether it is a client root on its own.
//! 2. **Graph** (single-threaded, after every file is loaded): import graph,
//!    client closure, module-factory plan.
//! 3. **Rewrite** (parallel): transform each parseable file and re-parse the
//!    output. Nothing is written here; see [`write_outputs`].
//!
//! File-scoped failures never abort the run. They end up as skipped
//! outcomes and [`Issue`]s.

use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use anyhow::{Context, Result};
use rayon::{ThreadPool, ThreadPoolBuilder, prelude::*};
use serde::Serialize;
use swc_common::SourceMap;

use crate::{
    core::{
        error::FileError,
        extract::{ExtractedString, FileScan, extract_strings, scan_file},
        factory::{
            ExternalFile, FactoryBinding, FactoryFile, FactoryPlan, FileAnalysis,
            RejectedFactory, UnsafeReason, analyze_factories,
        },
        graph::{
            FileClassification, FileId, ImportGraph,
            aliases::PathAliases,
            client::{ClientSignals, client_signals},
            imports::{FileImports, collect_imports},
        },
        keys::TextToKeyMap,
        parsers::jsx::{ParsedJSX, parse_jsx_source, validate_reparse},
        transform::{RewriteMode, TransformInput, TransformOptions, transform_file},
    },
    issues::{Issue, UnsafeFactoryIssue},
};

/// Everything a run needs besides the file list and the key map.
pub struct CodegenOptions<'a> {
    pub root: &'a Path,
    pub mode: RewriteMode,
    pub i18n_import: &'a str,
    pub component_path: &'a str,
    pub translatable_props: &'a [String],
    pub module_factory: bool,
    pub aliases: &'a PathAliases,
    /// Sources outside the include set, checked for factory references.
    pub external_files: &'a [PathBuf],
    pub concurrency: usize,
}

#[derive(Debug)]
pub enum FileStatus {
    Unchanged,
    Modified { code: String },
    Skipped(FileError),
    /// Never started because the run was cancelled.
    Cancelled,
}

#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    /// Path relative to the root, as shown to the user.
    pub display: String,
    pub status: FileStatus,
    pub is_client: bool,
    pub strings_wrapped: usize,
    pub client_namespaces: BTreeSet<String>,
}

impl FileOutcome {
    fn failed(path: &Path, display: String, error: FileError) -> Self {
        Self {
            path: path.to_path_buf(),
            display,
            status: FileStatus::Skipped(error),
            is_client: false,
            strings_wrapped: 0,
            client_namespaces: BTreeSet::new(),
        }
    }

    fn cancelled(path: &Path, display: String) -> Self {
        Self {
            path: path.to_path_buf(),
            display,
            status: FileStatus::Cancelled,
            is_client: false,
            strings_wrapped: 0,
            client_namespaces: BTreeSet::new(),
        }
    }

    pub fn is_modified(&self) -> bool {
        matches!(self.status, FileStatus::Modified { .. })
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodegenSummary {
    pub files_processed: usize,
    pub files_modified: usize,
    pub files_skipped: usize,
    pub strings_wrapped: usize,
    pub client_namespaces: BTreeSet<String>,
}

impl CodegenSummary {
    fn from_outcomes(outcomes: &[FileOutcome]) -> Self {
        let mut summary = Self::default();
        for outcome in outcomes {
            match &outcome.status {
                FileStatus::Cancelled => continue,
                FileStatus::Skipped(_) => summary.files_skipped += 1,
                FileStatus::Modified { .. } => {
                    summary.files_modified += 1;
                    summary.strings_wrapped += outcome.strings_wrapped;
                }
                FileStatus::Unchanged => {}
            }
            summary.files_processed += 1;
            summary
                .client_namespaces
                .extend(outcome.client_namespaces.iter().cloned());
        }
        summary
    }
}

#[derive(Debug)]
pub struct CodegenReport {
    pub summary: CodegenSummary,
    /// One outcome per input file, in input order.
    pub files: Vec<FileOutcome>,
    pub classifications: Vec<FileClassification>,
    pub rejected_factories: Vec<RejectedFactory>,
    pub issues: Vec<Issue>,
}

/// Candidate strings of the whole include set.
#[derive(Debug, Default)]
pub struct ExtractReport {
    pub strings: Vec<ExtractedString>,
    pub files_processed: usize,
    pub issues: Vec<Issue>,
}

/// Classification of the include set, for inspection.
#[derive(Debug)]
pub struct GraphReport {
    pub files: Vec<String>,
    pub classifications: Vec<FileClassification>,
    pub issues: Vec<Issue>,
}

struct LoadedFile {
    display: String,
    parsed: ParsedJSX,
    scan: FileScan,
    imports: FileImports,
    client: ClientSignals,
    candidates: Vec<ExtractedString>,
}

enum Loaded {
    Parsed(Box<LoadedFile>),
    /// `source` is kept when the file was readable, for mention checks.
    Failed {
        source: Option<String>,
        error: FileError,
    },
    Cancelled,
}

impl Loaded {
    fn as_parsed(&self) -> Option<&LoadedFile> {
        match self {
            Loaded::Parsed(file) => Some(file),
            _ => None,
        }
    }
}

pub fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

fn load_file(path: &Path, root: &Path, translatable_props: &[String]) -> Loaded {
    let shown = display_path(path, root);
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(source) => {
            tracing::warn!("Cannot read {}: {}", shown, source);
            return Loaded::Failed {
                source: None,
                error: FileError::Read {
                    path: path.to_path_buf(),
                    source,
                },
            };
        }
    };
    let parsed = match parse_jsx_source(source.clone(), &shown, Arc::new(SourceMap::default())) {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::warn!("Skipping {}: {}", shown, err);
            return Loaded::Failed {
                source: Some(source),
                error: FileError::ParseFailure {
                    path: shown,
                    message: err.to_string(),
                },
            };
        }
    };
    let scan = scan_file(&parsed, translatable_props);
    let imports = collect_imports(&parsed);
    let client = client_signals(&parsed, &imports);
    let candidates = extract_strings(&parsed, &scan, &shown);
    Loaded::Parsed(Box::new(LoadedFile {
        display: shown,
        parsed,
        scan,
        imports,
        client,
        candidates,
    }))
}

/// Status, strings wrapped and client namespaces of one rewritten file.
type Rewritten = (FileStatus, usize, BTreeSet<String>);

type ProgressFn<'a> = dyn Fn(usize, usize) + Send + Sync + 'a;

/// Drives the three phases over a file set.
pub struct Codegen<'a> {
    options: CodegenOptions<'a>,
    progress: Option<Box<ProgressFn<'a>>>,
    cancel: Option<&'a AtomicBool>,
}

impl<'a> Codegen<'a> {
    pub fn new(options: CodegenOptions<'a>) -> Self {
        Self {
            options,
            progress: None,
            cancel: None,
        }
    }

    /// Called with `(completed, total)` each time a file is finished.
    pub fn on_progress(mut self, progress: impl Fn(usize, usize) + Send + Sync + 'a) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    /// Files not yet started when the flag is set are left alone.
    pub fn cancel_flag(mut self, flag: &'a AtomicBool) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn tick(&self, completed: &AtomicUsize, total: usize) {
        let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some(progress) = &self.progress {
            progress(done, total);
        }
    }

    fn pool(&self) -> Result<ThreadPool> {
        ThreadPoolBuilder::new()
            .num_threads(self.options.concurrency.max(1))
            .build()
            .context("Failed to start the worker pool")
    }

    fn load(&self, pool: &ThreadPool, files: &[PathBuf]) -> Vec<Loaded> {
        pool.install(|| {
            files
                .par_iter()
                .map(|path| {
                    if self.is_cancelled() {
                        return Loaded::Cancelled;
                    }
                    load_file(path, self.options.root, self.options.translatable_props)
                })
                .collect()
        })
    }

    fn classify(&self, files: &[PathBuf], loaded: &[Loaded]) -> (ImportGraph, Vec<FileClassification>) {
        let imports: Vec<Option<&FileImports>> = loaded
            .iter()
            .map(|l| l.as_parsed().map(|f| &f.imports))
            .collect();
        let graph = ImportGraph::build(files, &imports, self.options.root, self.options.aliases);
        let parseable: Vec<bool> = loaded.iter().map(|l| l.as_parsed().is_some()).collect();
        let roots: Vec<bool> = loaded
            .iter()
            .map(|l| l.as_parsed().is_some_and(|f| f.client.is_client_root()))
            .collect();
        let classifications = graph.classify(&parseable, &roots);
        (graph, classifications)
    }

    fn plan_factories(
        &self,
        pool: &ThreadPool,
        loaded: &[Loaded],
        graph: &ImportGraph,
        key_map: &TextToKeyMap,
    ) -> FactoryPlan {
        if !self.options.module_factory {
            return FactoryPlan::default();
        }
        let externals: Vec<ExternalFile> = pool.install(|| {
            self.options
                .external_files
                .par_iter()
                .filter_map(|path| ExternalFile::load(path))
                .collect()
        });
        let files: Vec<FactoryFile<'_>> = loaded
            .iter()
            .map(|l| match l {
                Loaded::Parsed(file) => FactoryFile {
                    source: &file.parsed.source,
                    analysis: Some(FileAnalysis {
                        parsed: &file.parsed,
                        scan: &file.scan,
                        imports: &file.imports,
                    }),
                },
                Loaded::Failed { source, .. } => FactoryFile {
                    source: source.as_deref().unwrap_or_default(),
                    analysis: None,
                },
                Loaded::Cancelled => FactoryFile {
                    source: "",
                    analysis: None,
                },
            })
            .collect();
        pool.install(|| {
            analyze_factories(
                &files,
                &externals,
                graph,
                key_map,
                self.options.root,
                self.options.aliases,
            )
        })
    }

    fn rewrite(
        &self,
        id: FileId,
        file: &LoadedFile,
        classification: &FileClassification,
        plan: &FactoryPlan,
        key_map: &TextToKeyMap,
    ) -> Rewritten {
        let is_client = classification.is_client_root || classification.is_client_reachable;
        let options = TransformOptions {
            key_map,
            mode: self.options.mode,
            i18n_import: self.options.i18n_import,
            component_path: self.options.component_path,
            translatable_props: self.options.translatable_props,
        };
        let input = TransformInput {
            path: &file.display,
            parsed: &file.parsed,
            scan: &file.scan,
            imports: &file.imports,
            is_client,
            factories: plan.for_file(id),
        };
        let result = match transform_file(&input, &options) {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!("{}", err);
                return (FileStatus::Skipped(err), 0, BTreeSet::new());
            }
        };
        if !result.modified {
            return (FileStatus::Unchanged, 0, result.client_namespaces);
        }
        if let Err(err) =
            validate_reparse(&result.code, &file.display, file.parsed.recovered_errors)
        {
            tracing::warn!("Discarding output for {}: {}", file.display, err);
            let error = FileError::InvalidOutputAfterTransform {
                path: file.display.clone(),
                message: err.to_string(),
            };
            return (FileStatus::Skipped(error), 0, BTreeSet::new());
        }
        tracing::debug!(
            "{}: {} string(s) wrapped",
            file.display,
            result.strings_wrapped
        );
        (
            FileStatus::Modified { code: result.code },
            result.strings_wrapped,
            result.client_namespaces,
        )
    }

    /// A factory is all or nothing across files: when a file defining or
    /// referencing one was not rewritten, the binding is retracted and every
    /// file it touched is rewritten again without it.
    fn roll_back_factories(
        &self,
        pool: &ThreadPool,
        loaded: &[Loaded],
        classifications: &[FileClassification],
        plan: &mut FactoryPlan,
        rewritten: &mut [Option<Rewritten>],
        key_map: &TextToKeyMap,
    ) {
        loop {
            let stuck: BTreeSet<FactoryBinding> = rewritten
                .iter()
                .enumerate()
                .filter(|(_, r)| {
                    matches!(r, Some((FileStatus::Skipped(_) | FileStatus::Cancelled, ..)))
                })
                .flat_map(|(i, _)| plan.bindings_in(FileId(i as u32)))
                .collect();
            if stuck.is_empty() {
                return;
            }

            let mut affected: BTreeSet<FileId> = BTreeSet::new();
            for binding in &stuck {
                tracing::debug!(
                    "Keeping {} as a constant: {}",
                    binding.name,
                    UnsafeReason::RewriteFailed
                );
                affected.extend(plan.retract(binding, UnsafeReason::RewriteFailed));
            }

            let current = &*rewritten;
            let plan = &*plan;
            let redone: Vec<(usize, Rewritten)> = pool.install(|| {
                affected
                    .par_iter()
                    .filter_map(|id| {
                        let i = id.0 as usize;
                        if matches!(current[i], Some((FileStatus::Cancelled, ..))) {
                            return None;
                        }
                        let file = loaded[i].as_parsed()?;
                        Some((i, self.rewrite(*id, file, &classifications[i], plan, key_map)))
                    })
                    .collect()
            });
            for (i, result) in redone {
                rewritten[i] = Some(result);
            }
        }
    }

    /// Phase 1 only: candidate strings for key generation.
    pub fn extract(&self, files: &[PathBuf]) -> Result<ExtractReport> {
        let pool = self.pool()?;
        let mut report = ExtractReport::default();
        for loaded in self.load(&pool, files) {
            match loaded {
                Loaded::Parsed(file) => {
                    report.files_processed += 1;
                    report.strings.extend(file.candidates);
                }
                Loaded::Failed { error, .. } => {
                    report.files_processed += 1;
                    report.issues.push(Issue::from(&error));
                }
                Loaded::Cancelled => {}
            }
        }
        Ok(report)
    }

    /// Phases 1 and 2: which files run on the client.
    pub fn graph(&self, files: &[PathBuf]) -> Result<GraphReport> {
        let pool = self.pool()?;
        let loaded = self.load(&pool, files);
        let (_, classifications) = self.classify(files, &loaded);
        let issues = loaded
            .iter()
            .filter_map(|l| match l {
                Loaded::Failed { error, .. } => Some(Issue::from(error)),
                _ => None,
            })
            .collect();
        Ok(GraphReport {
            files: files
                .iter()
                .map(|p| display_path(p, self.options.root))
                .collect(),
            classifications,
            issues,
        })
    }

    /// The full pipeline. Outputs stay in memory.
    ///
    /// Dot-less keys are qualified with a namespace inferred from where their
    /// text first occurs.
    pub fn run(&self, files: &[PathBuf], key_map: &TextToKeyMap) -> Result<CodegenReport> {
        let pool = self.pool()?;
        let total = files.len();
        let completed = AtomicUsize::new(0);

        let loaded = self.load(&pool, files);
        for _ in loaded.iter().filter(|l| matches!(l, Loaded::Failed { .. })) {
            self.tick(&completed, total);
        }
        let key_map = &key_map.qualified(
            loaded
                .iter()
                .filter_map(Loaded::as_parsed)
                .flat_map(|f| &f.candidates),
        );

        let (graph, classifications) = self.classify(files, &loaded);
        let mut plan = self.plan_factories(&pool, &loaded, &graph, key_map);

        let mut rewritten: Vec<Option<Rewritten>> = pool.install(|| {
            loaded
                .par_iter()
                .enumerate()
                .map(|(i, l)| {
                    let file = l.as_parsed()?;
                    if self.is_cancelled() {
                        return Some((FileStatus::Cancelled, 0, BTreeSet::new()));
                    }
                    let result =
                        self.rewrite(FileId(i as u32), file, &classifications[i], &plan, key_map);
                    self.tick(&completed, total);
                    Some(result)
                })
                .collect()
        });
        self.roll_back_factories(
            &pool,
            &loaded,
            &classifications,
            &mut plan,
            &mut rewritten,
            key_map,
        );

        let mut issues: Vec<Issue> = Vec::new();
        let outcomes: Vec<FileOutcome> = files
            .iter()
            .zip(loaded)
            .zip(rewritten)
            .enumerate()
            .map(|(i, ((path, loaded), rewritten))| {
                let display = display_path(path, self.options.root);
                match (loaded, rewritten) {
                    (Loaded::Parsed(_), Some((status, strings_wrapped, client_namespaces))) => {
                        if let FileStatus::Skipped(err) = &status {
                            issues.push(Issue::from(err));
                        }
                        FileOutcome {
                            path: path.clone(),
                            display,
                            status,
                            is_client: classifications[i].is_client_root
                                || classifications[i].is_client_reachable,
                            strings_wrapped,
                            client_namespaces,
                        }
                    }
                    (Loaded::Failed { error, .. }, _) => {
                        issues.push(Issue::from(&error));
                        FileOutcome::failed(path, display, error)
                    }
                    _ => FileOutcome::cancelled(path, display),
                }
            })
            .collect();

        issues.extend(plan.rejected.iter().map(|rejected| {
            Issue::UnsafeFactory(UnsafeFactoryIssue {
                file_path: display_path(graph.path(rejected.file), self.options.root),
                name: rejected.name.clone(),
                reason: rejected.reason,
            })
        }));
        issues.sort();

        Ok(CodegenReport {
            summary: CodegenSummary::from_outcomes(&outcomes),
            files: outcomes,
            classifications,
            rejected_factories: plan.rejected,
            issues,
        })
    }
}

/// Writes every modified file back in place. Returns how many were written.
pub fn write_outputs(report: &CodegenReport) -> Result<usize> {
    let mut written = 0;
    for outcome in &report.files {
        if let FileStatus::Modified { code } = &outcome.status {
            fs::write(&outcome.path, code).map_err(|source| FileError::Write {
                path: outcome.path.clone(),
                source,
            })?;
            written += 1;
        }
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;
    use tempfile::{TempDir, tempdir};

    use super::*;
    use crate::issues::Rule;

    fn project(files: &[(&str, &str)]) -> (TempDir, Vec<PathBuf>) {
        let dir = tempdir().unwrap();
        let mut paths = Vec::new();
        for (name, content) in files {
            let path = dir.path().join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, content).unwrap();
            paths.push(path);
        }
        (dir, paths)
    }

    fn options<'a>(root: &'a Path, aliases: &'a PathAliases) -> CodegenOptions<'a> {
        CodegenOptions {
            root,
            mode: RewriteMode::Keys,
            i18n_import: "next-intl",
            component_path: "@/components/i18n",
            translatable_props: &[],
            module_factory: false,
            aliases,
            external_files: &[],
            concurrency: 2,
        }
    }

    fn key_map(entries: &[(&str, &str)]) -> TextToKeyMap {
        TextToKeyMap::from_entries(
            entries
                .iter()
                .map(|(t, k)| (t.to_string(), k.to_string()))
                .collect::<Vec<_>>(),
        )
    }

    fn code_of(outcome: &FileOutcome) -> &str {
        match &outcome.status {
            FileStatus::Modified { code } => code,
            other => panic!("{} not modified: {:?}", outcome.display, other),
        }
    }

    const LOGO: &str = r#"export function Logo() {
  return <span>Acme Studio</span>;
}
"#;

    #[test]
    fn test_dynamic_import_makes_target_client() {
        let page = r#""use client";

export default function Page() {
  const load = () => import("../components/logo");
  return <button onClick={load}>Open</button>;
}
"#;
        let (dir, files) = project(&[("app/page.tsx", page), ("components/logo.tsx", LOGO)]);
        let aliases = PathAliases::default();
        let map = key_map(&[("Acme Studio", "logo.acmeStudio")]);
        let report = Codegen::new(options(dir.path(), &aliases))
            .run(&files, &map)
            .unwrap();

        assert!(report.classifications[0].is_client_root);
        assert!(report.classifications[1].is_client_reachable);
        assert!(!report.classifications[1].is_client_root);

        let logo = code_of(&report.files[1]);
        assert!(logo.contains(r#"const t = useTranslations("logo");"#));
        assert!(logo.contains(r#"<span>{t("acmeStudio")}</span>"#));
        assert!(!logo.contains("await"));
        assert_eq!(report.summary.files_modified, 1);
        assert_eq!(report.summary.strings_wrapped, 1);
        assert_eq!(
            report.summary.client_namespaces.iter().collect::<Vec<_>>(),
            vec!["logo"]
        );
    }

    #[test]
    fn test_unreferenced_file_stays_server() {
        let (dir, files) = project(&[("components/logo.tsx", LOGO)]);
        let aliases = PathAliases::default();
        let map = key_map(&[("Acme Studio", "logo.acmeStudio")]);
        let report = Codegen::new(options(dir.path(), &aliases))
            .run(&files, &map)
            .unwrap();
        let logo = code_of(&report.files[0]);
        assert!(logo.contains(r#"const t = await getTranslations("logo");"#));
        assert!(logo.contains("export async function Logo()"));
        assert!(report.summary.client_namespaces.is_empty());
    }

    #[test]
    fn test_parse_failure_is_skipped_and_counted() {
        let (dir, files) = project(&[
            ("components/broken.tsx", "export const Broken = (;\n"),
            ("components/logo.tsx", LOGO),
        ]);
        let aliases = PathAliases::default();
        let map = key_map(&[("Acme Studio", "logo.acmeStudio")]);
        let calls = Mutex::new(Vec::new());
        let report = Codegen::new(options(dir.path(), &aliases))
            .on_progress(|done, total| calls.lock().unwrap().push((done, total)))
            .run(&files, &map)
            .unwrap();

        assert_eq!(report.summary.files_processed, 2);
        assert_eq!(report.summary.files_skipped, 1);
        assert_eq!(report.summary.files_modified, 1);
        assert!(matches!(report.files[0].status, FileStatus::Skipped(_)));
        assert!(!report.classifications[0].is_parseable);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].rule(), Rule::ParseError);

        let mut calls = calls.into_inner().unwrap();
        calls.sort();
        assert_eq!(calls, vec![(1, 2), (2, 2)]);
    }

    #[test]
    fn test_cancelled_run_touches_nothing() {
        let (dir, files) = project(&[("components/logo.tsx", LOGO)]);
        let aliases = PathAliases::default();
        let map = key_map(&[("Acme Studio", "logo.acmeStudio")]);
        let cancel = AtomicBool::new(true);
        let report = Codegen::new(options(dir.path(), &aliases))
            .cancel_flag(&cancel)
            .run(&files, &map)
            .unwrap();
        assert!(matches!(report.files[0].status, FileStatus::Cancelled));
        assert_eq!(report.summary, CodegenSummary::default());
        assert_eq!(write_outputs(&report).unwrap(), 0);
    }

    #[test]
    fn test_write_outputs_only_writes_modified_files() {
        let untouched = "export const VERSION = 1;\n";
        let (dir, files) = project(&[
            ("components/logo.tsx", LOGO),
            ("components/version.ts", untouched),
        ]);
        let aliases = PathAliases::default();
        let map = key_map(&[("Acme Studio", "logo.acmeStudio")]);
        let report = Codegen::new(options(dir.path(), &aliases))
            .run(&files, &map)
            .unwrap();

        assert_eq!(fs::read_to_string(&files[0]).unwrap(), LOGO);
        assert_eq!(write_outputs(&report).unwrap(), 1);
        let written = fs::read_to_string(&files[0]).unwrap();
        assert!(written.contains(r#"t("acmeStudio")"#));
        assert_eq!(fs::read_to_string(&files[1]).unwrap(), untouched);
    }

    #[test]
    fn test_module_factory_across_files() {
        let data = r#"export const FEATURES = [
  { title: "Fast builds" },
];
"#;
        let list = r#""use client";
import { FEATURES } from "../data/features";

export function FeatureList() {
  return <ul>{FEATURES.map((f) => <li key={f.title}>{f.title}</li>)}</ul>;
}
"#;
        let (dir, files) = project(&[("data/features.ts", data), ("components/list.tsx", list)]);
        let aliases = PathAliases::default();
        let map = key_map(&[("Fast builds", "features.fastBuilds")]);
        let mut opts = options(dir.path(), &aliases);
        opts.module_factory = true;
        let report = Codegen::new(opts).run(&files, &map).unwrap();

        let data_out = code_of(&report.files[0]);
        assert!(data_out.contains("export const FEATURES = (t: (key: string"));
        assert!(data_out.contains(r#"{ title: t("features.fastBuilds") },"#));
        let list_out = code_of(&report.files[1]);
        assert!(list_out.contains("const t = useTranslations();"));
        assert!(list_out.contains("{FEATURES(t).map("));
        assert!(report.rejected_factories.is_empty());
    }

    #[test]
    fn test_factory_is_retracted_when_a_user_cannot_be_rewritten() {
        let data = r#"export const FEATURES = [{ title: "Fast builds" }];
"#;
        let list = r#""use client";
import { FEATURES } from "../data/features";

export function FeatureList({ t, translate, tr, i18n }) {
  return <ul>{FEATURES.map((f) => <li key={f.title}>{f.title}</li>)}</ul>;
}
"#;
        let (dir, files) = project(&[("data/features.ts", data), ("components/list.tsx", list)]);
        let aliases = PathAliases::default();
        let map = key_map(&[("Fast builds", "features.fastBuilds")]);
        let mut opts = options(dir.path(), &aliases);
        opts.module_factory = true;
        let report = Codegen::new(opts).run(&files, &map).unwrap();

        assert!(matches!(report.files[0].status, FileStatus::Unchanged));
        assert!(!report.files[1].is_modified());
        assert_eq!(report.summary.files_modified, 0);
        assert_eq!(report.rejected_factories.len(), 1);
        assert_eq!(report.rejected_factories[0].name, "FEATURES");
        assert_eq!(report.rejected_factories[0].reason, UnsafeReason::RewriteFailed);
        assert!(report.issues.iter().any(|i| i.rule() == Rule::UnsafeFactory));

        assert_eq!(write_outputs(&report).unwrap(), 0);
        assert_eq!(fs::read_to_string(&files[0]).unwrap(), data);
    }

    #[test]
    fn test_extract_collects_candidates_in_file_order() {
        let (dir, files) = project(&[
            ("components/logo.tsx", LOGO),
            ("components/broken.tsx", "export const Broken = (;\n"),
        ]);
        let aliases = PathAliases::default();
        let report = Codegen::new(options(dir.path(), &aliases))
            .extract(&files)
            .unwrap();
        assert_eq!(report.files_processed, 2);
        assert_eq!(report.strings.len(), 1);
        assert_eq!(report.strings[0].text, "Acme Studio");
        assert_eq!(report.strings[0].file, "components/logo.tsx");
        assert_eq!(report.issues.len(), 1);
    }
}
