//! Accessor bindings: which scopes get one, what it is called and how it is
//! declared.

use std::collections::HashSet;

use super::edits::{EditSet, line_indent};
use super::imports::js_string;
use crate::{
    core::{
        extract::types::{
            AccessorArg, AccessorCallee, ExistingAccessor, FunctionScope, ScopeBody, ScopeKind,
        },
        parsers::jsx::SourceText,
    },
    utils::{is_hook_name, is_pascal_case},
};

/// Names tried, in order, for a new accessor binding.
pub const ACCESSOR_NAMES: &[&str] = &["t", "translate", "tr", "i18n"];

/// How a scope gets at its accessor.
#[derive(Debug)]
pub enum ScopeAccessor<'s> {
    Inject { binding: String },
    /// `editable` is false for object arguments, which are never rewritten.
    Reuse { accessor: &'s ExistingAccessor, editable: bool },
    Decline(&'static str),
}

/// Whether a new accessor may be declared in `scope`.
///
/// Components (PascalCase or default export) always qualify. Custom hooks
/// qualify on the client, already-async functions on the server. A server
/// accessor is awaited, so the function must be async or made async.
pub fn is_injectable(scope: &FunctionScope, client: bool) -> bool {
    if scope.kind == ScopeKind::Method {
        return false;
    }
    let name = scope.name.as_deref();
    let shaped = name.is_some_and(is_pascal_case)
        || scope.is_default_export
        || (client && name.is_some_and(is_hook_name))
        || (!client && scope.is_async);
    shaped && (client || scope.is_async || scope.async_insert_at.is_some())
}

/// First accessor name not bound in the scope or at module level.
pub fn choose_binding<'n>(bound: impl Fn(&str) -> bool, candidates: &[&'n str]) -> Option<&'n str> {
    candidates.iter().copied().find(|name| !bound(name))
}

pub fn resolve_scope<'s>(
    scope: &'s FunctionScope,
    inline: bool,
    client: bool,
    module_names: &HashSet<String>,
) -> ScopeAccessor<'s> {
    if let Some(accessor) = scope
        .accessors
        .iter()
        .find(|a| a.callee.is_inline() == inline)
    {
        return match accessor.arg {
            AccessorArg::Opaque => ScopeAccessor::Decline("accessor namespace is not a literal"),
            AccessorArg::Object(_) => ScopeAccessor::Reuse {
                accessor,
                editable: false,
            },
            AccessorArg::None | AccessorArg::Namespace(_) => ScopeAccessor::Reuse {
                accessor,
                editable: !accessor.dynamic_uses,
            },
        };
    }
    if !is_injectable(scope, client) {
        return ScopeAccessor::Decline("not a component");
    }
    match choose_binding(|n| scope.binds(n) || module_names.contains(n), ACCESSOR_NAMES) {
        Some(binding) => ScopeAccessor::Inject {
            binding: binding.to_string(),
        },
        None => ScopeAccessor::Decline("no free accessor name"),
    }
}

/// Namespace an existing accessor was created with.
pub fn accessor_namespace(accessor: &ExistingAccessor) -> Option<&str> {
    match &accessor.arg {
        AccessorArg::Namespace(ns) => Some(ns),
        AccessorArg::Object(ns) => ns.as_deref(),
        AccessorArg::None | AccessorArg::Opaque => None,
    }
}

/// The accessor factory for a mode and runtime.
pub fn runtime_callee(inline: bool, client: bool) -> AccessorCallee {
    match (inline, client) {
        (false, true) => AccessorCallee::UseTranslations,
        (false, false) => AccessorCallee::GetTranslations,
        (true, true) => AccessorCallee::UseT,
        (true, false) => AccessorCallee::GetT,
    }
}

/// `await getTranslations("hero")` / `useTranslations()`.
pub fn accessor_call(callee_local: &str, server: bool, namespace: Option<&str>) -> String {
    let arg = namespace.map(js_string).unwrap_or_default();
    if server {
        format!("await {}({})", callee_local, arg)
    } else {
        format!("{}({})", callee_local, arg)
    }
}

/// Declares the accessor at the top of the scope body.
///
/// Expression-bodied arrows get a block body returning the old expression.
pub fn inject_declaration(
    edits: &mut EditSet,
    source: SourceText<'_>,
    scope: &FunctionScope,
    declaration: &str,
) {
    match scope.body {
        ScopeBody::Block {
            first_stmt: Some(first),
            ..
        } => {
            let at = source.offset(first);
            let indent = line_indent(source.code, at);
            edits.insert(at, format!("{}\n{}", declaration, indent));
        }
        ScopeBody::Block {
            lbrace,
            first_stmt: None,
        } => {
            edits.insert(source.offset(lbrace) + 1, format!(" {} ", declaration));
        }
        ScopeBody::Expr(body) => {
            let indent = line_indent(source.code, source.offset(scope.span.lo));
            edits.insert(
                source.offset(body.lo),
                format!("{{\n{indent}  {declaration}\n{indent}  return ("),
            );
            edits.insert(source.offset(body.hi), format!(");\n{indent}}}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use swc_common::{BytePos, DUMMY_SP};

    use super::*;

    fn scope(name: &str, kind: ScopeKind, is_async: bool) -> FunctionScope {
        FunctionScope {
            id: 0,
            name: Some(name.to_string()),
            kind,
            span: DUMMY_SP,
            body: ScopeBody::Block {
                lbrace: BytePos(0),
                first_stmt: None,
            },
            is_async,
            is_default_export: false,
            contains_jsx: true,
            async_insert_at: (!is_async).then_some(BytePos(0)),
            bindings: vec!["t".to_string()],
            accessors: Vec::new(),
            calls: Vec::new(),
        }
    }

    #[test]
    fn test_injectable_rule_table() {
        assert!(is_injectable(&scope("Hero", ScopeKind::FnDecl, false), true));
        assert!(is_injectable(&scope("Hero", ScopeKind::Arrow, false), false));
        assert!(is_injectable(&scope("useCart", ScopeKind::Arrow, false), true));
        assert!(!is_injectable(&scope("useCart", ScopeKind::Arrow, false), false));
        assert!(is_injectable(&scope("loader", ScopeKind::FnDecl, true), false));
        assert!(!is_injectable(&scope("helper", ScopeKind::FnDecl, false), true));
        assert!(!is_injectable(&scope("Legacy", ScopeKind::Method, false), true));
        assert!(!is_injectable(&scope("FEATURES", ScopeKind::Arrow, false), true));
    }

    #[test]
    fn test_binding_avoids_bound_names() {
        let hero = scope("Hero", ScopeKind::FnDecl, false);
        let names = HashSet::new();
        match resolve_scope(&hero, false, true, &names) {
            ScopeAccessor::Inject { binding } => assert_eq!(binding, "translate"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_accessor_call_shapes() {
        assert_eq!(accessor_call("getTranslations", true, Some("hero")), "await getTranslations(\"hero\")");
        assert_eq!(accessor_call("useT", false, None), "useT()");
        assert_eq!(runtime_callee(true, false), AccessorCallee::GetT);
    }
}
