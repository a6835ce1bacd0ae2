use std::{collections::HashMap, path::Path};

use rayon::prelude::*;
use swc_common::Span;
use swc_ecma_visit::VisitWith;

use super::{
    ExternalFile, FactoryBinding, FactoryFile, FactoryPlan, FactoryReference, FileAnalysis, FileFactories,
    RejectedFactory, UnsafeReason,
    references::{BindingRefs, ReferenceCollector},
};
use crate::{
    core::{
        extract::{
            StringKind,
            filters::is_reserved_export,
            types::{AccessorArg, ScopeKind},
        },
        graph::{
            FileId, ImportGraph,
            aliases::PathAliases,
            imports::{SourceKind, SpecifierKind},
            resolver::ImportResolver,
        },
        keys::TextToKeyMap,
    },
    utils::is_pascal_case,
};

#[derive(Debug, Clone)]
struct Candidate {
    file: FileId,
    name: String,
    name_span: Span,
}

#[derive(Default)]
struct FileFacts {
    hazards: Vec<(usize, UnsafeReason)>,
    refs: Vec<(usize, FactoryReference)>,
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Whole-word occurrence of `name` in `text`.
fn mentions(text: &str, name: &str) -> bool {
    text.match_indices(name).any(|(start, _)| {
        let before = text[..start].chars().next_back();
        let after = text[start + name.len()..].chars().next();
        !before.is_some_and(is_ident_char) && !after.is_some_and(is_ident_char)
    })
}

/// Exported constants whose content strings have keys.
fn find_candidates(files: &[FactoryFile<'_>], key_map: &TextToKeyMap) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    for (i, file) in files.iter().enumerate() {
        let Some(analysis) = &file.analysis else {
            continue;
        };
        for exported in &analysis.scan.exported_consts {
            let has_keys = analysis.scan.occurrences.iter().any(|o| {
                o.kind == StringKind::ModuleObjectProperty
                    && o.parent_const.as_deref() == Some(exported.name.as_str())
                    && key_map.key_for(&o.text()).is_some()
            });
            if has_keys {
                candidates.push(Candidate {
                    file: FileId(i as u32),
                    name: exported.name.clone(),
                    name_span: exported.name_span,
                });
            }
        }
    }
    candidates
}

fn candidates_in(candidates: &[Candidate], file: FileId) -> impl Iterator<Item = (usize, &Candidate)> {
    candidates
        .iter()
        .enumerate()
        .filter(move |(_, c)| c.file == file)
}

fn file_facts(
    id: FileId,
    path: &Path,
    analysis: &FileAnalysis<'_>,
    candidates: &[Candidate],
    resolver: &ImportResolver<'_>,
) -> FileFacts {
    let mut facts = FileFacts::default();
    let mut watched: HashMap<String, usize> = HashMap::new();
    let mut declarations: Vec<Span> = Vec::new();

    for (k, candidate) in candidates_in(candidates, id) {
        watched.insert(candidate.name.clone(), k);
        declarations.push(candidate.name_span);
    }

    for decl in &analysis.imports.decls {
        let target = resolver.resolve(path, &decl.source);
        for spec in &decl.specifiers {
            match target {
                Some(target) => {
                    for (k, candidate) in candidates_in(candidates, target) {
                        match &spec.kind {
                            SpecifierKind::Namespace => {
                                facts.hazards.push((k, UnsafeReason::NamespaceImport));
                            }
                            SpecifierKind::Named { imported } if *imported == candidate.name => {
                                if decl.type_only || spec.type_only {
                                    facts.hazards.push((k, UnsafeReason::TypeQuery));
                                } else {
                                    watched.insert(spec.local.clone(), k);
                                }
                            }
                            _ => {}
                        }
                    }
                }
                None => {
                    if let SpecifierKind::Named { imported } = &spec.kind {
                        for (k, candidate) in candidates.iter().enumerate() {
                            if candidate.name == *imported && decl.source.starts_with(['.', '@', '~', '/']) {
                                facts.hazards.push((k, UnsafeReason::AmbiguousImport));
                            }
                        }
                    }
                }
            }
        }
    }

    for source in &analysis.imports.runtime {
        if source.kind == SourceKind::Import {
            continue;
        }
        let Some(target) = resolver.resolve(path, &source.source) else {
            continue;
        };
        for (k, candidate) in candidates_in(candidates, target) {
            let reason = match source.kind {
                SourceKind::ReExportAll => Some(UnsafeReason::ExportAll),
                SourceKind::ReExport
                    if source.namespace || source.names.contains(&candidate.name) =>
                {
                    Some(UnsafeReason::ReExported)
                }
                SourceKind::Dynamic | SourceKind::Require => Some(UnsafeReason::DynamicImport),
                _ => None,
            };
            if let Some(reason) = reason {
                facts.hazards.push((k, reason));
            }
        }
    }

    if watched.is_empty() {
        return facts;
    }

    let local_names: HashMap<usize, Vec<String>> =
        watched.iter().fold(HashMap::new(), |mut acc, (local, &k)| {
            acc.entry(k).or_default().push(local.clone());
            acc
        });

    let mut collector = ReferenceCollector::new(&watched, &declarations);
    analysis.parsed.module.visit_with(&mut collector);
    for (k, BindingRefs { refs, hazards }) in collector.finish() {
        facts.hazards.extend(hazards.into_iter().map(|h| (k, h)));
        for value_ref in refs {
            let scope = analysis
                .scan
                .scopes
                .iter()
                .find(|s| s.span.lo <= value_ref.span.lo && value_ref.span.hi <= s.span.hi);
            let Some(scope) = scope else {
                facts.hazards.push((k, UnsafeReason::ModuleScope));
                continue;
            };
            let component = scope.kind != ScopeKind::Method
                && scope.name.as_deref().is_some_and(is_pascal_case)
                && (scope.is_async || scope.async_insert_at.is_some());
            if !component {
                facts.hazards.push((k, UnsafeReason::NonComponent));
                continue;
            }
            let opaque = scope.accessors.iter().any(|a| match a.arg {
                AccessorArg::Opaque | AccessorArg::Object(Some(_)) => true,
                AccessorArg::Namespace(_) => a.dynamic_uses,
                AccessorArg::None | AccessorArg::Object(None) => false,
            });
            if opaque {
                facts.hazards.push((k, UnsafeReason::OpaqueAccessor));
                continue;
            }
            let local = local_names
                .get(&k)
                .and_then(|names| {
                    let source = analysis.parsed.text().slice(value_ref.span);
                    names.iter().find(|n| n.as_str() == source)
                })
                .cloned()
                .unwrap_or_default();
            facts.refs.push((
                k,
                FactoryReference {
                    binding: FactoryBinding {
                        file: candidates[k].file,
                        name: candidates[k].name.clone(),
                    },
                    local,
                    span: value_ref.span,
                    shorthand: value_ref.shorthand,
                    scope: scope.id,
                },
            ));
        }
    }
    facts
}

/// Decides which candidate bindings are converted and where their
/// references are.
///
/// `files[i]` must be the file with id `FileId(i)` in `graph`.
pub fn analyze_factories(
    files: &[FactoryFile<'_>],
    externals: &[ExternalFile],
    graph: &ImportGraph,
    key_map: &TextToKeyMap,
    root: &Path,
    aliases: &PathAliases,
) -> FactoryPlan {
    let candidates = find_candidates(files, key_map);
    if candidates.is_empty() {
        return FactoryPlan::default();
    }
    let resolver = ImportResolver::new(root, aliases, graph.known_files());

    let facts: Vec<FileFacts> = files
        .par_iter()
        .enumerate()
        .map(|(i, file)| {
            let id = FileId(i as u32);
            match &file.analysis {
                Some(analysis) => file_facts(id, graph.path(id), analysis, &candidates, &resolver),
                None => FileFacts {
                    hazards: candidates
                        .iter()
                        .enumerate()
                        .filter(|(_, c)| mentions(file.source, &c.name))
                        .map(|(k, _)| (k, UnsafeReason::UnparseableMention))
                        .collect(),
                    refs: Vec::new(),
                },
            }
        })
        .collect();

    let mut reasons: Vec<Option<UnsafeReason>> = candidates
        .iter()
        .map(|c| is_reserved_export(&c.name).then_some(UnsafeReason::Reserved))
        .collect();

    for external in externals {
        match &external.imports {
            Some(imports) => {
                for source in &imports.runtime {
                    let Some(target) = resolver.resolve(&external.path, &source.source) else {
                        continue;
                    };
                    for (k, candidate) in candidates_in(&candidates, target) {
                        if source.namespace || source.names.contains(&candidate.name) {
                            reasons[k].get_or_insert(UnsafeReason::ExternalImporter);
                        }
                    }
                }
            }
            None => {
                for (k, candidate) in candidates.iter().enumerate() {
                    if mentions(&external.source, &candidate.name) {
                        reasons[k].get_or_insert(UnsafeReason::ExternalImporter);
                    }
                }
            }
        }
    }

    for file_facts in &facts {
        for &(k, reason) in &file_facts.hazards {
            reasons[k].get_or_insert(reason);
        }
    }

    let mut plan = FactoryPlan::default();
    for (k, candidate) in candidates.iter().enumerate() {
        match reasons[k] {
            Some(reason) => {
                tracing::debug!(
                    "Keeping {} in {} as a constant: {}",
                    candidate.name,
                    graph.path(candidate.file).display(),
                    reason
                );
                plan.rejected.push(RejectedFactory {
                    file: candidate.file,
                    name: candidate.name.clone(),
                    reason,
                });
            }
            None => {
                plan.files
                    .entry(candidate.file)
                    .or_insert_with(FileFactories::default)
                    .definitions
                    .push(candidate.name.clone());
            }
        }
    }
    for (i, file_facts) in facts.into_iter().enumerate() {
        for (k, reference) in file_facts.refs {
            if reasons[k].is_none() {
                plan.files
                    .entry(FileId(i as u32))
                    .or_default()
                    .references
                    .push(reference);
            }
        }
    }
    plan
}

#[cfg(test)]
mod tests {
    use std::{path::PathBuf, sync::Arc};

    use pretty_assertions::assert_eq;
    use swc_common::SourceMap;

    use super::*;
    use crate::core::{
        extract::{FileScan, scan_file},
        graph::imports::{FileImports, collect_imports},
        parsers::jsx::{ParsedJSX, parse_jsx_source},
    };

    const FEATURES: &str = r#"
export const FEATURES = [
    { title: "Fast", description: "Built for speed" },
];
"#;

    struct Unit {
        source: String,
        parsed: Option<(ParsedJSX, FileScan, FileImports)>,
    }

    fn plan_for(files: &[(&str, &str)], externals: &[(&str, &str)]) -> FactoryPlan {
        let units: Vec<Unit> = files
            .iter()
            .map(|(path, code)| {
                let parsed =
                    parse_jsx_source(code.to_string(), path, Arc::new(SourceMap::default()))
                        .ok()
                        .map(|parsed| {
                            let scan = scan_file(&parsed, &[]);
                            let imports = collect_imports(&parsed);
                            (parsed, scan, imports)
                        });
                Unit {
                    source: code.to_string(),
                    parsed,
                }
            })
            .collect();
        let factory_files: Vec<FactoryFile<'_>> = units
            .iter()
            .map(|u| FactoryFile {
                source: &u.source,
                analysis: u.parsed.as_ref().map(|(parsed, scan, imports)| FileAnalysis {
                    parsed,
                    scan,
                    imports,
                }),
            })
            .collect();
        let paths: Vec<PathBuf> = files.iter().map(|(p, _)| PathBuf::from(p)).collect();
        let imports: Vec<Option<&FileImports>> = units
            .iter()
            .map(|u| u.parsed.as_ref().map(|(_, _, i)| i))
            .collect();
        let aliases = PathAliases::default();
        let graph = ImportGraph::build(&paths, &imports, Path::new("/p"), &aliases);
        let externals: Vec<ExternalFile> = externals
            .iter()
            .map(|(p, code)| ExternalFile::from_source(PathBuf::from(p), code.to_string()))
            .collect();
        let key_map = TextToKeyMap::from_entries(vec![
            ("Fast".to_string(), "features.fast".to_string()),
            ("Built for speed".to_string(), "features.builtForSpeed".to_string()),
        ]);
        analyze_factories(&factory_files, &externals, &graph, &key_map, Path::new("/p"), &aliases)
    }

    fn rejected(plan: &FactoryPlan) -> Vec<UnsafeReason> {
        plan.rejected.iter().map(|r| r.reason).collect()
    }

    const LIST: &str = r#"
import { FEATURES } from "./features";
export function FeatureList() {
    return <ul>{FEATURES.map((f) => <li key={f.title}>{f.title}</li>)}</ul>;
}
"#;

    #[test]
    fn test_component_only_binding_is_convertible() {
        let plan = plan_for(
            &[("/p/src/features.ts", FEATURES), ("/p/src/List.tsx", LIST)],
            &[],
        );
        assert!(plan.rejected.is_empty());
        assert_eq!(plan.converted_count(), 1);
        let defining = plan.for_file(FileId(0)).unwrap();
        assert_eq!(defining.definitions, vec!["FEATURES"]);
        let list = plan.for_file(FileId(1)).unwrap();
        assert_eq!(list.references.len(), 1);
        assert_eq!(list.references[0].local, "FEATURES");
    }

    #[test]
    fn test_index_assignment_is_unsafe() {
        let mutating = r#"
import { FEATURES } from "./features";
export function Admin() {
    FEATURES[0] = { title: "Other" };
    return null;
}
"#;
        let plan = plan_for(
            &[
                ("/p/src/features.ts", FEATURES),
                ("/p/src/List.tsx", LIST),
                ("/p/src/Admin.tsx", mutating),
            ],
            &[],
        );
        assert_eq!(rejected(&plan), vec![UnsafeReason::Mutated]);
        assert!(plan.for_file(FileId(0)).is_none());
        assert!(plan.for_file(FileId(1)).is_none());
    }

    #[test]
    fn test_namespace_import_is_unsafe() {
        let ns = r#"
import * as data from "./features";
export function Grid() { return <div>{data.FEATURES.length}</div>; }
"#;
        let plan = plan_for(&[("/p/src/features.ts", FEATURES), ("/p/src/Grid.tsx", ns)], &[]);
        assert_eq!(rejected(&plan), vec![UnsafeReason::NamespaceImport]);
    }

    #[test]
    fn test_module_level_reference_is_unsafe() {
        let logged = format!("{}\nconsole.log(FEATURES);\n", FEATURES);
        let plan = plan_for(&[("/p/src/features.ts", logged.as_str())], &[]);
        assert_eq!(rejected(&plan), vec![UnsafeReason::ModuleScope]);
    }

    #[test]
    fn test_helper_reference_is_unsafe() {
        let helper = r#"
import { FEATURES } from "./features";
export function countFeatures() { return FEATURES.length; }
"#;
        let plan = plan_for(&[("/p/src/features.ts", FEATURES), ("/p/src/count.ts", helper)], &[]);
        assert_eq!(rejected(&plan), vec![UnsafeReason::NonComponent]);
    }

    #[test]
    fn test_external_importer_is_unsafe() {
        let plan = plan_for(
            &[("/p/src/features.ts", FEATURES), ("/p/src/List.tsx", LIST)],
            &[("/p/scripts/dump.ts", "import { FEATURES } from '../src/features';\nconsole.log(FEATURES);")],
        );
        assert_eq!(rejected(&plan), vec![UnsafeReason::ExternalImporter]);
        assert!(plan.for_file(FileId(1)).is_none());
    }

    #[test]
    fn test_unparseable_mention_is_unsafe() {
        let plan = plan_for(
            &[
                ("/p/src/features.ts", FEATURES),
                ("/p/src/Broken.tsx", "export const Broken = (;\nuse(FEATURES);"),
            ],
            &[],
        );
        assert_eq!(rejected(&plan), vec![UnsafeReason::UnparseableMention]);
    }

    #[test]
    fn test_strings_without_keys_are_not_candidates() {
        let plan = plan_for(
            &[("/p/src/other.ts", "export const OTHER = [{ title: \"Unmapped\" }];")],
            &[],
        );
        assert!(plan.rejected.is_empty());
        assert_eq!(plan.converted_count(), 0);
    }

    #[test]
    fn test_mentions_is_word_based() {
        assert!(mentions("use(FEATURES)", "FEATURES"));
        assert!(!mentions("MY_FEATURES_LIST", "FEATURES"));
    }
}
