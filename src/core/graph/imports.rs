//! Module-level import facts of one file.

use swc_common::{BytePos, Span, Spanned};
use swc_ecma_ast::{
    CallExpr, Callee, ExportSpecifier, Expr, ImportSpecifier, Lit, ModuleDecl, ModuleExportName,
    ModuleItem, Stmt,
};
use swc_ecma_visit::{Visit, VisitWith};

use crate::core::parsers::jsx::ParsedJSX;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecifierKind {
    Named { imported: String },
    Default,
    Namespace,
}

#[derive(Debug, Clone)]
pub struct SpecifierInfo {
    pub kind: SpecifierKind,
    pub local: String,
    pub span: Span,
    pub type_only: bool,
}

/// One `import ... from "x"` declaration.
#[derive(Debug, Clone)]
pub struct ImportDeclInfo {
    pub span: Span,
    pub source: String,
    /// Span of the quoted source string.
    pub src_span: Span,
    pub type_only: bool,
    pub specifiers: Vec<SpecifierInfo>,
}

impl ImportDeclInfo {
    /// True when nothing from this declaration exists at runtime.
    pub fn is_type_only(&self) -> bool {
        self.type_only
            || (!self.specifiers.is_empty() && self.specifiers.iter().all(|s| s.type_only))
    }

    pub fn has_namespace(&self) -> bool {
        self.specifiers
            .iter()
            .any(|s| s.kind == SpecifierKind::Namespace)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Import,
    /// `export { a, b } from "x"`
    ReExport,
    /// `export * from "x"`
    ReExportAll,
    /// `import("x")`
    Dynamic,
    /// `require("x")`
    Require,
}

/// A runtime dependency edge before resolution.
#[derive(Debug, Clone)]
pub struct RuntimeSource {
    pub source: String,
    pub kind: SourceKind,
    /// Names taken from the target: imported names, or re-exported originals.
    pub names: Vec<String>,
    pub namespace: bool,
}

#[derive(Debug, Default, Clone)]
pub struct FileImports {
    pub decls: Vec<ImportDeclInfo>,
    pub runtime: Vec<RuntimeSource>,
    pub directives: Vec<String>,
    /// End of the directive prologue.
    pub directive_end: Option<BytePos>,
}

impl FileImports {
    pub fn has_directive(&self, directive: &str) -> bool {
        self.directives.iter().any(|d| d == directive)
    }

    pub fn last_import_end(&self) -> Option<BytePos> {
        self.decls.iter().map(|d| d.span.hi).max()
    }

    pub fn runtime_sources(&self) -> impl Iterator<Item = &str> {
        self.runtime.iter().map(|r| r.source.as_str())
    }
}

fn export_name(name: &ModuleExportName) -> String {
    match name {
        ModuleExportName::Ident(ident) => ident.sym.to_string(),
        ModuleExportName::Str(s) => str_value(s),
    }
}

fn str_value(s: &swc_ecma_ast::Str) -> String {
    s.value.as_str().unwrap_or_default().to_string()
}

pub fn collect_imports(parsed: &ParsedJSX) -> FileImports {
    let mut imports = FileImports::default();
    let mut in_prologue = true;

    for item in &parsed.module.body {
        match item {
            ModuleItem::Stmt(Stmt::Expr(expr_stmt)) if in_prologue => {
                if let Expr::Lit(Lit::Str(s)) = &*expr_stmt.expr {
                    imports.directives.push(str_value(s));
                    imports.directive_end = Some(expr_stmt.span.hi);
                } else {
                    in_prologue = false;
                }
            }
            ModuleItem::ModuleDecl(ModuleDecl::Import(decl)) => {
                in_prologue = false;
                let specifiers: Vec<SpecifierInfo> = decl
                    .specifiers
                    .iter()
                    .map(|spec| match spec {
                        ImportSpecifier::Named(named) => SpecifierInfo {
                            kind: SpecifierKind::Named {
                                imported: named
                                    .imported
                                    .as_ref()
                                    .map(export_name)
                                    .unwrap_or_else(|| named.local.sym.to_string()),
                            },
                            local: named.local.sym.to_string(),
                            span: named.span,
                            type_only: named.is_type_only,
                        },
                        ImportSpecifier::Default(default) => SpecifierInfo {
                            kind: SpecifierKind::Default,
                            local: default.local.sym.to_string(),
                            span: default.span,
                            type_only: false,
                        },
                        ImportSpecifier::Namespace(ns) => SpecifierInfo {
                            kind: SpecifierKind::Namespace,
                            local: ns.local.sym.to_string(),
                            span: ns.span,
                            type_only: false,
                        },
                    })
                    .collect();
                let info = ImportDeclInfo {
                    span: decl.span,
                    source: str_value(&decl.src),
                    src_span: decl.src.span,
                    type_only: decl.type_only,
                    specifiers,
                };
                if !info.is_type_only() {
                    imports.runtime.push(RuntimeSource {
                        source: info.source.clone(),
                        kind: SourceKind::Import,
                        names: info
                            .specifiers
                            .iter()
                            .filter(|s| !s.type_only)
                            .map(|s| match &s.kind {
                                SpecifierKind::Named { imported } => imported.clone(),
                                SpecifierKind::Default => "default".to_string(),
                                SpecifierKind::Namespace => "*".to_string(),
                            })
                            .collect(),
                        namespace: info.has_namespace(),
                    });
                }
                imports.decls.push(info);
            }
            ModuleItem::ModuleDecl(ModuleDecl::ExportNamed(export)) => {
                in_prologue = false;
                let Some(src) = &export.src else {
                    continue;
                };
                if export.type_only {
                    continue;
                }
                let mut names = Vec::new();
                let mut namespace = false;
                let mut runtime = false;
                for spec in &export.specifiers {
                    match spec {
                        ExportSpecifier::Named(named) if !named.is_type_only => {
                            names.push(export_name(&named.orig));
                            runtime = true;
                        }
                        ExportSpecifier::Named(_) => {}
                        ExportSpecifier::Namespace(_) => {
                            namespace = true;
                            runtime = true;
                        }
                        ExportSpecifier::Default(_) => {
                            names.push("default".to_string());
                            runtime = true;
                        }
                    }
                }
                if runtime {
                    imports.runtime.push(RuntimeSource {
                        source: str_value(src),
                        kind: SourceKind::ReExport,
                        names,
                        namespace,
                    });
                }
            }
            ModuleItem::ModuleDecl(ModuleDecl::ExportAll(export)) => {
                in_prologue = false;
                if !export.type_only {
                    imports.runtime.push(RuntimeSource {
                        source: str_value(&export.src),
                        kind: SourceKind::ReExportAll,
                        names: Vec::new(),
                        namespace: true,
                    });
                }
            }
            _ => in_prologue = false,
        }
    }

    let mut finder = DynamicImportFinder::default();
    parsed.module.visit_with(&mut finder);
    imports.runtime.extend(finder.found);
    imports
}

/// `import("x")` and `require("x")` anywhere in the file.
#[derive(Default)]
struct DynamicImportFinder {
    found: Vec<RuntimeSource>,
}

impl Visit for DynamicImportFinder {
    fn visit_call_expr(&mut self, node: &CallExpr) {
        let kind = match &node.callee {
            Callee::Import(_) => Some(SourceKind::Dynamic),
            Callee::Expr(callee) => match &**callee {
                Expr::Ident(ident) if &*ident.sym == "require" => Some(SourceKind::Require),
                _ => None,
            },
            Callee::Super(_) => None,
        };
        if let Some(kind) = kind
            && let Some(first) = node.args.first()
        {
            let source = match &*first.expr {
                Expr::Lit(Lit::Str(s)) => Some(str_value(s)),
                Expr::Tpl(tpl) if tpl.exprs.is_empty() => tpl
                    .quasis
                    .first()
                    .and_then(|q| q.cooked.as_ref())
                    .and_then(|c| c.as_str())
                    .map(str::to_string),
                _ => None,
            };
            if let Some(source) = source {
                self.found.push(RuntimeSource {
                    source,
                    kind,
                    names: Vec::new(),
                    namespace: true,
                });
            }
        }
        node.visit_children_with(self);
    }
}

/// Span of the statement following the directive prologue, if any.
pub fn first_statement_start(parsed: &ParsedJSX) -> Option<BytePos> {
    parsed.module.body.first().map(|item| item.span().lo)
}
