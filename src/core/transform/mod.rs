//! Phase 3: the rewrite pass.
//!
//! Works on the occurrences and scopes collected by
//! [`OccurrenceCollector`](crate::core::extract::OccurrenceCollector) and
//! turns them into byte-range edits against the original text. Everything
//! that cannot be rewritten safely is left alone.

pub mod accessor;
pub mod edits;
pub mod imports;


use std::{
    collections::{BTreeMap, BTreeSet, HashMap, HashSet},
    path::Path,
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use swc_common::SourceMap;

use accessor::{
    ACCESSOR_NAMES, ScopeAccessor, accessor_call, accessor_namespace, choose_binding,
    inject_declaration, is_injectable, resolve_scope, runtime_callee,
};
use edits::EditSet;
use imports::{ImportPlan, count_callees, js_string};

use crate::core::{
    error::FileError,
    extract::{
        FileScan, Occurrence, StringKind, scan_file,
        types::{AccessorArg, AccessorCallee, ScopeId, Slot},
        visitor::{ExportedConst, WRAPPER_ELEMENT},
    },
    factory::{FactoryReference, FileFactories},
    graph::imports::{FileImports, collect_imports},
    keys::{
        TextToKeyMap, detect_namespace,
        namespace::{full_key, relative_key},
    },
    parsers::jsx::{ParsedJSX, SourceText, parse_jsx_source},
};

/// How strings are routed through the runtime.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewriteMode {
    /// `t("key")` against message files.
    #[default]
    Keys,
    /// `<T id="key">text</T>` and `t("text", "key")`, source text kept inline.
    Inline,
}

pub struct TransformOptions<'a> {
    pub key_map: &'a TextToKeyMap,
    pub mode: RewriteMode,
    pub i18n_import: &'a str,
    pub component_path: &'a str,
    pub translatable_props: &'a [String],
}

impl TransformOptions<'_> {
    /// Module the accessor of a runtime is imported from.
    pub fn runtime_source(&self, client: bool) -> String {
        let base = match self.mode {
            RewriteMode::Keys => self.i18n_import,
            RewriteMode::Inline => self.component_path,
        };
        if client {
            base.to_string()
        } else {
            format!("{}/server", base)
        }
    }
}

pub struct TransformInput<'a> {
    pub path: &'a str,
    pub parsed: &'a ParsedJSX,
    pub scan: &'a FileScan,
    pub imports: &'a FileImports,
    /// Client root or reachable from one.
    pub is_client: bool,
    pub factories: Option<&'a FileFactories>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformResult {
    pub code: String,
    pub modified: bool,
    pub strings_wrapped: usize,
    pub used_keys: Vec<String>,
    /// First key segments a client file looks up.
    pub client_namespaces: BTreeSet<String>,
}

fn is_typescript(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| matches!(e, "ts" | "tsx" | "mts" | "cts"))
}

fn first_segment(key: &str) -> Option<&str> {
    key.split_once('.').map(|(ns, _)| ns)
}

/// `t("key")` / `t("key", { name })`.
fn keys_lookup(accessor: &str, key: &str, values: Option<String>) -> String {
    match values {
        Some(values) => format!("{}({}, {})", accessor, js_string(key), values),
        None => format!("{}({})", accessor, js_string(key)),
    }
}

/// `t("Text", "key")` / `t("Hello {name}", "key", { name })`.
fn inline_lookup(accessor: &str, text: &str, key: &str, values: Option<String>) -> String {
    match values {
        Some(values) => format!(
            "{}({}, {}, {})",
            accessor,
            js_string(text),
            js_string(key),
            values
        ),
        None => format!("{}({}, {})", accessor, js_string(text), js_string(key)),
    }
}

fn in_slot(slot: Slot, call: String) -> String {
    match slot {
        Slot::JsxText | Slot::AttrString => format!("{{{}}}", call),
        Slot::Expr | Slot::Existing => call,
    }
}

fn jsx_attr_string(value: &str) -> String {
    if value.contains('"') {
        format!("{{{}}}", js_string(value))
    } else {
        format!("\"{}\"", value)
    }
}

struct Rewriter<'a> {
    input: &'a TransformInput<'a>,
    options: &'a TransformOptions<'a>,
    source: SourceText<'a>,
    inline: bool,
    edits: EditSet,
    imports: ImportPlan<'a>,
    used_keys: Vec<String>,
    wrapped: usize,
    /// Accessor factories swapped away from, for stale import cleanup.
    swapped: Vec<AccessorCallee>,
}

impl<'a> Rewriter<'a> {
    fn new(input: &'a TransformInput<'a>, options: &'a TransformOptions<'a>) -> Self {
        let source = input.parsed.text();
        Self {
            input,
            options,
            source,
            inline: options.mode == RewriteMode::Inline,
            edits: EditSet::default(),
            imports: ImportPlan::new(input.imports, source),
            used_keys: Vec::new(),
            wrapped: 0,
            swapped: Vec::new(),
        }
    }

    fn replace(&mut self, occurrence: &Occurrence, key: &str, call: String) {
        self.edits
            .replace(self.source.range(occurrence.span), in_slot(occurrence.slot, call));
        self.used_keys.push(key.to_string());
        self.wrapped += 1;
    }

    fn lookup(&self, accessor: &str, occurrence: &Occurrence, key: &str, namespace: Option<&str>) -> Option<String> {
        let values = occurrence.value.template().and_then(|t| t.values_object());
        if self.inline {
            return Some(inline_lookup(accessor, &occurrence.text(), key, values));
        }
        let relative = relative_key(key, namespace)?;
        Some(keys_lookup(accessor, relative, values))
    }

    fn make_async(&mut self, scope_id: ScopeId) {
        let scope = self.input.scan.scope(scope_id);
        if !scope.is_async
            && let Some(at) = scope.async_insert_at
        {
            self.edits.insert(self.source.offset(at), "async ");
        }
    }

    fn module_names(&self) -> HashSet<String> {
        let mut names: HashSet<String> = self
            .input
            .imports
            .decls
            .iter()
            .flat_map(|d| d.specifiers.iter().map(|s| s.local.clone()))
            .collect();
        names.extend(self.input.scan.exported_consts.iter().map(|c| c.name.clone()));
        names.extend(self.input.scan.scopes.iter().filter_map(|s| s.name.clone()));
        names
    }

    fn convert_definition(&mut self, exported: &ExportedConst, param: &str) {
        let mut head = if is_typescript(self.input.path) {
            let param_type = if self.inline {
                "(text: string, key: string, values?: Record<string, any>) => string"
            } else {
                "(key: string, values?: Record<string, any>) => string"
            };
            format!("({}: {})", param, param_type)
        } else {
            format!("({})", param)
        };
        if let Some(type_ann) = exported.type_ann {
            head.push_str(&format!(": {}", self.source.slice(type_ann)));
            let start = self.source.offset(exported.name_span.hi);
            let end = self.source.offset(type_ann.hi);
            self.edits.replace(start..end, "");
        }
        let init = self.source.range(exported.init_span);
        self.edits.insert(init.start, format!("{} => (", head));
        self.edits.insert(init.end, ")");
    }

    fn run(mut self) -> Result<TransformResult, FileError> {
        let input = self.input;
        let scan = input.scan;
        let client = input.is_client;
        let key_map = self.options.key_map;
        let factories = input.factories.filter(|f| !f.is_empty());
        let module_names = self.module_names();

        // Factory definitions and their parameter names.
        let mut factory_params: HashMap<&str, &str> = HashMap::new();
        if let Some(factories) = factories {
            for name in &factories.definitions {
                let Some(exported) = scan.exported_const(name) else {
                    continue;
                };
                let free = choose_binding(
                    |n| exported.init_bindings.iter().any(|b| b == n),
                    ACCESSOR_NAMES,
                );
                if let Some(param) = free {
                    factory_params.insert(name.as_str(), param);
                    self.convert_definition(exported, param);
                }
            }
        }

        let mut scoped: BTreeMap<ScopeId, Vec<(&Occurrence, &str)>> = BTreeMap::new();
        let mut in_factories: Vec<(&Occurrence, &str, &str)> = Vec::new();
        let mut wrapped_markup: Vec<(&Occurrence, &str)> = Vec::new();

        for occurrence in &scan.occurrences {
            if occurrence.slot == Slot::Existing {
                continue;
            }
            let Some(key) = key_map.key_for(&occurrence.text()) else {
                continue;
            };
            if occurrence.kind == StringKind::ModuleObjectProperty {
                if let Some(param) = occurrence
                    .parent_const
                    .as_deref()
                    .and_then(|c| factory_params.get(c))
                    .copied()
                {
                    in_factories.push((occurrence, key, param));
                }
                continue;
            }
            if self.inline && occurrence.slot == Slot::JsxText {
                wrapped_markup.push((occurrence, key));
                continue;
            }
            match occurrence.scope {
                Some(id) => scoped.entry(id).or_default().push((occurrence, key)),
                None => tracing::debug!(
                    "{}: leaving module-level string {:?}",
                    input.path,
                    occurrence.text()
                ),
            }
        }

        let mut factory_refs: BTreeMap<ScopeId, Vec<&FactoryReference>> = BTreeMap::new();
        if let Some(factories) = factories {
            for reference in &factories.references {
                factory_refs.entry(reference.scope).or_default().push(reference);
            }
        }

        let scope_ids: BTreeSet<ScopeId> =
            scoped.keys().chain(factory_refs.keys()).copied().collect();
        let states: Vec<(ScopeId, ScopeAccessor<'_>)> = scope_ids
            .iter()
            .map(|&id| (id, resolve_scope(scan.scope(id), self.inline, client, &module_names)))
            .collect();

        // One namespace per file, over every key that goes through an
        // accessor whose namespace this pass controls.
        let file_namespace = if self.inline || factories.is_some() {
            None
        } else {
            let mut keys: Vec<String> = Vec::new();
            for (id, state) in &states {
                match state {
                    ScopeAccessor::Inject { .. } => {}
                    ScopeAccessor::Reuse {
                        accessor,
                        editable: true,
                    } => {
                        let current = accessor_namespace(accessor);
                        keys.extend(
                            scan.scope(*id)
                                .calls
                                .iter()
                                .filter(|c| c.accessor == accessor.binding)
                                .map(|c| full_key(&c.key, current)),
                        );
                    }
                    _ => continue,
                }
                if let Some(found) = scoped.get(id) {
                    keys.extend(found.iter().map(|(_, key)| key.to_string()));
                }
            }
            detect_namespace(&keys)
        };

        for (id, state) in &states {
            let scope = scan.scope(*id);
            let (binding, namespace): (String, Option<String>) = match state {
                ScopeAccessor::Decline(reason) => {
                    if factory_refs.contains_key(id) {
                        return Err(FileError::InvalidOutputAfterTransform {
                            path: input.path.to_string(),
                            message: format!("factory referenced where no accessor fits ({})", reason),
                        });
                    }
                    tracing::debug!(
                        "{}: declining {} string(s) in {}: {}",
                        input.path,
                        scoped.get(id).map_or(0, Vec::len),
                        scope.name.as_deref().unwrap_or("anonymous function"),
                        reason
                    );
                    continue;
                }
                ScopeAccessor::Inject { binding } => {
                    let callee = runtime_callee(self.inline, client);
                    let local = self
                        .imports
                        .require(&self.options.runtime_source(client), callee.name());
                    let call = accessor_call(&local, !client, file_namespace.as_deref());
                    inject_declaration(
                        &mut self.edits,
                        self.source,
                        scope,
                        &format!("const {} = {};", binding, call),
                    );
                    if !client {
                        self.make_async(*id);
                    }
                    (binding.clone(), file_namespace.clone())
                }
                ScopeAccessor::Reuse {
                    accessor,
                    editable: false,
                } => (
                    accessor.binding.clone(),
                    accessor_namespace(accessor).map(str::to_string),
                ),
                ScopeAccessor::Reuse {
                    accessor,
                    editable: true,
                } => {
                    let current = accessor_namespace(accessor).map(str::to_string);
                    let desired = if self.inline {
                        None
                    } else {
                        file_namespace.clone()
                    };
                    let wrong_runtime = accessor.callee.is_client() != client;
                    let can_swap = wrong_runtime && (client || is_injectable(scope, false));
                    let final_client = if can_swap {
                        client
                    } else {
                        accessor.callee.is_client()
                    };
                    let stale_arg = self.inline && accessor.arg != AccessorArg::None;

                    if current != desired || can_swap || stale_arg {
                        let callee = runtime_callee(self.inline, final_client);
                        let local = self
                            .imports
                            .require(&self.options.runtime_source(final_client), callee.name());
                        let call = accessor_call(&local, !final_client, desired.as_deref());
                        self.edits
                            .replace(self.source.range(accessor.init_span), call);
                        if !final_client {
                            self.make_async(*id);
                        }
                        if can_swap {
                            self.swapped.push(accessor.callee);
                        }
                    }
                    if current != desired && !self.inline {
                        for call in scope.calls.iter().filter(|c| c.accessor == accessor.binding) {
                            let full = full_key(&call.key, current.as_deref());
                            if let Some(relative) = relative_key(&full, desired.as_deref())
                                && relative != call.key
                            {
                                self.edits
                                    .replace(self.source.range(call.key_span), js_string(relative));
                            }
                        }
                    }
                    (accessor.binding.clone(), desired)
                }
            };

            if let Some(found) = scoped.get(id) {
                for (occurrence, key) in found {
                    match self.lookup(&binding, occurrence, key, namespace.as_deref()) {
                        Some(call) => self.replace(occurrence, key, call),
                        None => tracing::debug!(
                            "{}: key {} is outside the accessor namespace {:?}",
                            input.path,
                            key,
                            namespace
                        ),
                    }
                }
            }
            if let Some(references) = factory_refs.get(id) {
                for reference in references {
                    let text = if reference.shorthand {
                        format!("{0}: {0}({1})", reference.local, binding)
                    } else {
                        format!("{}({})", reference.local, binding)
                    };
                    self.edits.replace(self.source.range(reference.span), text);
                }
            }
        }

        for (occurrence, key, param) in in_factories {
            if let Some(call) = self.lookup(param, occurrence, key, None) {
                self.replace(occurrence, key, call);
            }
        }

        if !wrapped_markup.is_empty() {
            let wrapper = self
                .imports
                .require(&self.options.runtime_source(client), WRAPPER_ELEMENT);
            for (occurrence, key) in wrapped_markup {
                let raw = self.source.slice(occurrence.span);
                let element = format!(
                    "<{wrapper} id={}>{raw}</{wrapper}>",
                    jsx_attr_string(key)
                );
                self.edits.replace(self.source.range(occurrence.span), element);
                self.used_keys.push(key.to_string());
                self.wrapped += 1;
            }
        }

        self.drop_stale_imports();
        let client_namespaces = if client {
            self.client_namespaces()
        } else {
            BTreeSet::new()
        };

        let Rewriter {
            mut edits,
            imports,
            used_keys,
            wrapped,
            ..
        } = self;
        if edits.is_empty() {
            return Ok(TransformResult {
                code: input.parsed.source.clone(),
                modified: false,
                strings_wrapped: 0,
                used_keys,
                client_namespaces,
            });
        }
        imports.emit(&mut edits);
        let code = edits
            .apply(&input.parsed.source)
            .map_err(|offset| FileError::EditConflict {
                path: input.path.to_string(),
                offset,
            })?;
        let modified = code != input.parsed.source;
        Ok(TransformResult {
            code,
            modified,
            strings_wrapped: wrapped,
            used_keys,
            client_namespaces,
        })
    }

    /// Removes accessor imports that lost their last call site, moving the
    /// inline wrapper element along with its runtime.
    fn drop_stale_imports(&mut self) {
        if self.swapped.is_empty() {
            return;
        }
        let counts = count_callees(&self.input.parsed.module);
        let client_source = self.options.runtime_source(true);
        let server_source = self.options.runtime_source(false);
        let sources = [client_source.as_str(), server_source.as_str()];

        let mut seen: Vec<AccessorCallee> = Vec::new();
        for callee in self.swapped.clone() {
            if seen.contains(&callee) {
                continue;
            }
            seen.push(callee);
            let name = callee.name();
            let swapped = self.swapped.iter().filter(|c| **c == callee).count();
            let remaining = counts.get(name).copied().unwrap_or(0).saturating_sub(swapped);
            if remaining > 0 {
                continue;
            }
            let Some(old_source) = self.imports.remove(name, name, &sources) else {
                continue;
            };
            if self.inline
                && self
                    .imports
                    .remove(WRAPPER_ELEMENT, WRAPPER_ELEMENT, &[old_source.as_str()])
                    .is_some()
            {
                let target = self.options.runtime_source(!callee.is_client());
                self.imports.require(&target, WRAPPER_ELEMENT);
            }
        }
    }

    fn client_namespaces(&self) -> BTreeSet<String> {
        let mut namespaces: BTreeSet<String> = self
            .used_keys
            .iter()
            .filter_map(|k| first_segment(k))
            .map(str::to_string)
            .collect();
        for scope in &self.input.scan.scopes {
            for accessor in &scope.accessors {
                if let Some(ns) = accessor_namespace(accessor) {
                    namespaces.insert(ns.split('.').next().unwrap_or(ns).to_string());
                }
            }
            for call in &scope.calls {
                let key = call.second.as_deref().unwrap_or(&call.key);
                let owner = scope.accessors.iter().find(|a| a.binding == call.accessor);
                if owner.is_some_and(|a| accessor_namespace(a).is_some()) {
                    continue;
                }
                if let Some(ns) = first_segment(key) {
                    namespaces.insert(ns.to_string());
                }
            }
        }
        namespaces
    }
}

/// Rewrites one parsed file.
pub fn transform_file(
    input: &TransformInput<'_>,
    options: &TransformOptions<'_>,
) -> Result<TransformResult, FileError> {
    Rewriter::new(input, options).run()
}

/// Parses, scans and rewrites a source string on its own, without
/// cross-file information.
pub fn transform_source(
    code: &str,
    path: &str,
    is_client: bool,
    options: &TransformOptions<'_>,
) -> Result<TransformResult, FileError> {
    let parsed = parse_jsx_source(code.to_string(), path, Arc::new(SourceMap::default()))
        .map_err(|err| FileError::ParseFailure {
            path: path.to_string(),
            message: err.to_string(),
        })?;
    let scan = scan_file(&parsed, options.translatable_props);
    let imports = collect_imports(&parsed);
    let input = TransformInput {
        path,
        parsed: &parsed,
        scan: &scan,
        imports: &imports,
        is_client,
        factories: None,
    };
    transform_file(&input, options)
}
