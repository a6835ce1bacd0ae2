//! Import reconciliation for a rewritten file.
//!
//! Changes to one declaration are collected first and rendered as a single
//! replacement of that declaration, so adding and removing specifiers never
//! produce overlapping edits.

use std::collections::HashMap;

use swc_common::Span;
use swc_ecma_ast::{CallExpr, Callee, Expr, Module};
use swc_ecma_visit::{Visit, VisitWith};

use super::edits::EditSet;
use crate::core::{
    graph::imports::{FileImports, ImportDeclInfo, SpecifierKind},
    parsers::jsx::SourceText,
};

#[derive(Debug, Default, Clone)]
struct DeclChange {
    removed: Vec<String>,
    added: Vec<String>,
}

pub struct ImportPlan<'a> {
    imports: &'a FileImports,
    source: SourceText<'a>,
    changes: HashMap<usize, DeclChange>,
    /// New declarations: source -> imported names, in first-use order.
    new_decls: Vec<(String, Vec<String>)>,
}

fn named_imported(decl: &ImportDeclInfo, imported: &str) -> Option<String> {
    decl.specifiers.iter().find_map(|spec| match &spec.kind {
        SpecifierKind::Named { imported: name } if name == imported && !spec.type_only => {
            Some(spec.local.clone())
        }
        _ => None,
    })
}

fn is_extendable(decl: &ImportDeclInfo) -> bool {
    !decl.type_only
        && !decl.has_namespace()
        && decl
            .specifiers
            .iter()
            .any(|s| matches!(s.kind, SpecifierKind::Named { .. }))
}

impl<'a> ImportPlan<'a> {
    pub fn new(imports: &'a FileImports, source: SourceText<'a>) -> Self {
        Self {
            imports,
            source,
            changes: HashMap::new(),
            new_decls: Vec::new(),
        }
    }

    fn is_removed(&self, decl: usize, local: &str) -> bool {
        self.changes
            .get(&decl)
            .is_some_and(|c| c.removed.iter().any(|r| r == local))
    }

    /// Local name bound to `imported` from `source`, adding the import when
    /// it is missing.
    pub fn require(&mut self, source: &str, imported: &str) -> String {
        for (i, decl) in self.imports.decls.iter().enumerate() {
            if decl.source != source || decl.type_only {
                continue;
            }
            if let Some(local) = named_imported(decl, imported)
                && !self.is_removed(i, &local)
            {
                return local;
            }
        }
        let pending = self
            .changes
            .values()
            .any(|c| c.added.iter().any(|a| a == imported))
            || self
                .new_decls
                .iter()
                .any(|(s, names)| s == source && names.iter().any(|n| n == imported));
        if pending {
            return imported.to_string();
        }

        let target = self
            .imports
            .decls
            .iter()
            .position(|d| d.source == source && is_extendable(d));
        match target {
            Some(i) => self
                .changes
                .entry(i)
                .or_default()
                .added
                .push(imported.to_string()),
            None => match self.new_decls.iter_mut().find(|(s, _)| s == source) {
                Some((_, names)) => names.push(imported.to_string()),
                None => self
                    .new_decls
                    .push((source.to_string(), vec![imported.to_string()])),
            },
        }
        imported.to_string()
    }

    /// Removes the named specifier `imported as local` from a declaration
    /// with one of `sources`. Returns the declaration's source.
    pub fn remove(&mut self, imported: &str, local: &str, sources: &[&str]) -> Option<String> {
        let (i, decl) = self.imports.decls.iter().enumerate().find(|(i, d)| {
            sources.contains(&d.source.as_str())
                && named_imported(d, imported).as_deref() == Some(local)
                && !self.is_removed(*i, local)
        })?;
        let source = decl.source.clone();
        self.changes
            .entry(i)
            .or_default()
            .removed
            .push(local.to_string());
        Some(source)
    }

    fn render(&self, decl: &ImportDeclInfo, change: &DeclChange) -> Option<String> {
        let mut default: Option<&str> = None;
        let mut named: Vec<String> = Vec::new();
        for spec in &decl.specifiers {
            if change.removed.contains(&spec.local) {
                continue;
            }
            let text = self.source.slice(spec.span);
            match spec.kind {
                SpecifierKind::Default => default = Some(text),
                SpecifierKind::Named { .. } => named.push(text.to_string()),
                SpecifierKind::Namespace => return Some(self.source.slice(decl.span).to_string()),
            }
        }
        named.extend(change.added.iter().cloned());

        let head = match (default, named.is_empty()) {
            (None, true) => return None,
            (Some(default), true) => default.to_string(),
            (Some(default), false) => format!("{}, {{ {} }}", default, named.join(", ")),
            (None, false) => format!("{{ {} }}", named.join(", ")),
        };
        let tail = self
            .source
            .slice(Span::new(decl.src_span.lo, decl.span.hi));
        Some(format!("import {} from {}", head, tail))
    }

    /// Turns the plan into edits.
    pub fn emit(self, edits: &mut EditSet) {
        let code = self.source.code;
        let mut kept_end: Option<usize> = None;
        let mut first_removed: Option<usize> = None;

        for (i, decl) in self.imports.decls.iter().enumerate() {
            let range = self.source.range(decl.span);
            let Some(change) = self.changes.get(&i) else {
                kept_end = kept_end.max(Some(range.end));
                continue;
            };
            match self.render(decl, change) {
                Some(text) => {
                    kept_end = kept_end.max(Some(range.end));
                    edits.replace(range, text);
                }
                None => {
                    let end = if code[range.end..].starts_with('\n') {
                        range.end + 1
                    } else {
                        range.end
                    };
                    first_removed = Some(first_removed.map_or(range.start, |s| s.min(range.start)));
                    edits.replace(range.start..end, "");
                }
            }
        }

        if self.new_decls.is_empty() {
            return;
        }
        let lines: Vec<String> = self
            .new_decls
            .iter()
            .map(|(source, names)| format!("import {{ {} }} from {};", names.join(", "), js_string(source)))
            .collect();
        let block = lines.join("\n");

        if let Some(end) = kept_end {
            edits.insert(end, format!("\n{}", block));
        } else if let Some(start) = first_removed {
            edits.insert(start, format!("{}\n", block));
        } else if let Some(end) = self.imports.directive_end {
            edits.insert(self.source.offset(end), format!("\n{}", block));
        } else if code.starts_with("#!") {
            let at = code.find('\n').map(|i| i + 1).unwrap_or(code.len());
            edits.insert(at, format!("{}\n", block));
        } else {
            edits.insert(0, format!("{}\n", block));
        }
    }
}

pub fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{}\"", value))
}

/// How often each identifier is called in a module.
pub fn count_callees(module: &Module) -> HashMap<String, usize> {
    let mut counter = CalleeCounter::default();
    module.visit_with(&mut counter);
    counter.counts
}

#[derive(Default)]
struct CalleeCounter {
    counts: HashMap<String, usize>,
}

impl Visit for CalleeCounter {
    fn visit_call_expr(&mut self, node: &CallExpr) {
        if let Callee::Expr(callee) = &node.callee
            && let Expr::Ident(ident) = &**callee
        {
            *self.counts.entry(ident.sym.to_string()).or_default() += 1;
        }
        node.visit_children_with(self);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;
    use swc_common::SourceMap;

    use super::*;
    use crate::core::{
        graph::imports::collect_imports,
        parsers::jsx::{ParsedJSX, parse_jsx_source},
    };

    fn parse(code: &str) -> ParsedJSX {
        parse_jsx_source(code.to_string(), "a.tsx", Arc::new(SourceMap::default())).unwrap()
    }

    fn plan(code: &str, f: impl FnOnce(&mut ImportPlan<'_>)) -> String {
        let parsed = parse(code);
        let imports = collect_imports(&parsed);
        let mut plan = ImportPlan::new(&imports, parsed.text());
        f(&mut plan);
        let mut edits = EditSet::default();
        plan.emit(&mut edits);
        edits.apply(code).unwrap()
    }

    #[test]
    fn test_extends_existing_declaration() {
        let out = plan("import { useLocale } from 'next-intl';\n", |p| {
            assert_eq!(p.require("next-intl", "useTranslations"), "useTranslations");
            assert_eq!(p.require("next-intl", "useLocale"), "useLocale");
        });
        assert_eq!(out, "import { useLocale, useTranslations } from 'next-intl';\n");
    }

    #[test]
    fn test_reuses_aliased_binding() {
        let code = "import { getTranslations as gt } from \"next-intl/server\";\n";
        let out = plan(code, |p| {
            assert_eq!(p.require("next-intl/server", "getTranslations"), "gt");
        });
        assert_eq!(out, code);
    }

    #[test]
    fn test_new_declaration_placement() {
        let after_imports = plan("import React from 'react';\nconst a = 1;\n", |p| {
            p.require("next-intl", "useTranslations");
        });
        assert_eq!(
            after_imports,
            "import React from 'react';\nimport { useTranslations } from \"next-intl\";\nconst a = 1;\n"
        );

        let after_directive = plan("\"use client\";\nconst a = 1;\n", |p| {
            p.require("next-intl", "useTranslations");
        });
        assert_eq!(
            after_directive,
            "\"use client\";\nimport { useTranslations } from \"next-intl\";\nconst a = 1;\n"
        );

        let top = plan("const a = 1;\n", |p| {
            p.require("next-intl", "useTranslations");
        });
        assert_eq!(top, "import { useTranslations } from \"next-intl\";\nconst a = 1;\n");
    }

    #[test]
    fn test_remove_and_replace_runtime() {
        let code = "import { getTranslations } from \"next-intl/server\";\nconst a = 1;\n";
        let out = plan(code, |p| {
            let removed = p.remove("getTranslations", "getTranslations", &["next-intl/server"]);
            assert_eq!(removed.as_deref(), Some("next-intl/server"));
            p.require("next-intl", "useTranslations");
        });
        assert_eq!(out, "import { useTranslations } from \"next-intl\";\nconst a = 1;\n");
    }

    #[test]
    fn test_partial_removal_keeps_default() {
        let code = "import Link, { getT, T } from '@/i18n/server';\n";
        let out = plan(code, |p| {
            p.remove("getT", "getT", &["@/i18n/server"]);
        });
        assert_eq!(out, "import Link, { T } from '@/i18n/server';\n");
    }

    #[test]
    fn test_count_callees() {
        let parsed = parse("const t = useT(); t('a'); t('b'); obj.t('c');");
        let counts = count_callees(&parsed.module);
        assert_eq!(counts.get("t"), Some(&2));
        assert_eq!(counts.get("useT"), Some(&1));
    }
}
