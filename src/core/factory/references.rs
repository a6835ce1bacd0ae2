//! Per-file reference index for factory candidates.
//!
//! Given the local names a file uses for candidate bindings, records every
//! value reference and every use that would make a conversion unsafe.

use std::collections::HashMap;

use swc_common::Span;
use swc_ecma_ast::{
    AssignExpr, AssignTarget, CallExpr, Callee, ClassDecl, ExportDefaultExpr, Expr, FnDecl,
    Ident, JSXElementName, JSXObject, MemberExpr, MemberProp, ModuleExportName, NamedExport,
    OptChainBase, Pat, Prop, SimpleAssignTarget, TsEntityName, TsTypeQuery, TsTypeQueryExpr,
    UnaryExpr, UnaryOp, UpdateExpr,
};
use swc_ecma_visit::{Visit, VisitWith};

use super::UnsafeReason;

/// Array and object methods that change their receiver.
pub const MUTATING_METHODS: &[&str] = &[
    "push",
    "pop",
    "shift",
    "unshift",
    "splice",
    "sort",
    "reverse",
    "fill",
    "copyWithin",
];

/// `Object.*` functions that change their first argument.
pub const MUTATING_OBJECT_FNS: &[&str] =
    &["assign", "defineProperty", "defineProperties", "setPrototypeOf"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueRef {
    pub span: Span,
    /// `{ NAME }` object shorthand.
    pub shorthand: bool,
}

#[derive(Debug, Default)]
pub struct BindingRefs {
    pub refs: Vec<ValueRef>,
    pub hazards: Vec<UnsafeReason>,
}

/// Base identifier of a member chain: `a` in `a.b[0].c`.
fn root_ident(expr: &Expr) -> Option<&Ident> {
    match expr {
        Expr::Ident(ident) => Some(ident),
        Expr::Member(member) => root_ident(&member.obj),
        Expr::Paren(paren) => root_ident(&paren.expr),
        Expr::TsNonNull(e) => root_ident(&e.expr),
        Expr::TsAs(e) => root_ident(&e.expr),
        Expr::TsSatisfies(e) => root_ident(&e.expr),
        Expr::OptChain(chain) => match &*chain.base {
            OptChainBase::Member(member) => root_ident(&member.obj),
            OptChainBase::Call(_) => None,
        },
        _ => None,
    }
}

fn member_root(member: &MemberExpr) -> Option<&Ident> {
    root_ident(&member.obj)
}

pub struct ReferenceCollector<'a> {
    /// Local name -> index of the binding it stands for.
    watched: &'a HashMap<String, usize>,
    /// Span of the declaration name in the defining file.
    declarations: &'a [Span],
    found: HashMap<usize, BindingRefs>,
}

impl<'a> ReferenceCollector<'a> {
    pub fn new(watched: &'a HashMap<String, usize>, declarations: &'a [Span]) -> Self {
        Self {
            watched,
            declarations,
            found: HashMap::new(),
        }
    }

    pub fn finish(self) -> HashMap<usize, BindingRefs> {
        self.found
    }

    fn lookup(&self, ident: &Ident) -> Option<usize> {
        self.watched.get(&*ident.sym).copied()
    }

    fn hazard(&mut self, ident: &Ident, reason: UnsafeReason) {
        if let Some(binding) = self.lookup(ident) {
            self.found.entry(binding).or_default().hazards.push(reason);
        }
    }

    fn hazard_root(&mut self, expr: &Expr, reason: UnsafeReason) {
        if let Some(ident) = root_ident(expr) {
            self.hazard(ident, reason);
        }
    }

    fn reference(&mut self, ident: &Ident, shorthand: bool) {
        if let Some(binding) = self.lookup(ident) {
            self.found.entry(binding).or_default().refs.push(ValueRef {
                span: ident.span,
                shorthand,
            });
        }
    }

    fn export_name(&mut self, name: &ModuleExportName) {
        if let ModuleExportName::Ident(ident) = name {
            self.hazard(ident, UnsafeReason::ReExported);
        }
    }
}

impl Visit for ReferenceCollector<'_> {
    fn visit_expr(&mut self, node: &Expr) {
        if let Expr::Ident(ident) = node {
            self.reference(ident, false);
            return;
        }
        node.visit_children_with(self);
    }

    fn visit_prop(&mut self, node: &Prop) {
        if let Prop::Shorthand(ident) = node {
            self.reference(ident, true);
            return;
        }
        node.visit_children_with(self);
    }

    fn visit_assign_expr(&mut self, node: &AssignExpr) {
        match &node.left {
            AssignTarget::Simple(SimpleAssignTarget::Ident(binding)) => {
                self.hazard(&binding.id, UnsafeReason::Mutated);
                node.right.visit_with(self);
                return;
            }
            AssignTarget::Simple(SimpleAssignTarget::Member(member)) => {
                if let Some(ident) = member_root(member) {
                    self.hazard(ident, UnsafeReason::Mutated);
                }
            }
            AssignTarget::Simple(_) => {}
            AssignTarget::Pat(pat) => {
                let mut idents = PatIdents::default();
                pat.visit_with(&mut idents);
                for ident in idents.found {
                    self.hazard(&ident, UnsafeReason::Mutated);
                }
                node.right.visit_with(self);
                return;
            }
        }
        node.visit_children_with(self);
    }

    fn visit_update_expr(&mut self, node: &UpdateExpr) {
        self.hazard_root(&node.arg, UnsafeReason::Mutated);
        node.visit_children_with(self);
    }

    fn visit_unary_expr(&mut self, node: &UnaryExpr) {
        if node.op == UnaryOp::Delete {
            self.hazard_root(&node.arg, UnsafeReason::Mutated);
        }
        node.visit_children_with(self);
    }

    fn visit_call_expr(&mut self, node: &CallExpr) {
        match &node.callee {
            Callee::Expr(callee) => {
                if let Expr::Member(member) = &**callee
                    && let MemberProp::Ident(prop) = &member.prop
                {
                    if MUTATING_METHODS.contains(&&*prop.sym) {
                        self.hazard_root(&member.obj, UnsafeReason::Mutated);
                    }
                    if let Expr::Ident(obj) = &*member.obj
                        && &*obj.sym == "Object"
                        && MUTATING_OBJECT_FNS.contains(&&*prop.sym)
                        && let Some(first) = node.args.first()
                    {
                        self.hazard_root(&first.expr, UnsafeReason::Mutated);
                    }
                }
            }
            Callee::Import(_) | Callee::Super(_) => {}
        }
        node.visit_children_with(self);
    }

    fn visit_binding_ident(&mut self, node: &swc_ecma_ast::BindingIdent) {
        if !self.declarations.contains(&node.id.span) {
            self.hazard(&node.id, UnsafeReason::Shadowed);
        }
        node.visit_children_with(self);
    }

    fn visit_fn_decl(&mut self, node: &FnDecl) {
        self.hazard(&node.ident, UnsafeReason::Shadowed);
        node.visit_children_with(self);
    }

    fn visit_class_decl(&mut self, node: &ClassDecl) {
        self.hazard(&node.ident, UnsafeReason::Shadowed);
        node.visit_children_with(self);
    }

    fn visit_ts_type_query(&mut self, node: &TsTypeQuery) {
        if let TsTypeQueryExpr::TsEntityName(name) = &node.expr_name {
            let mut entity = name;
            loop {
                match entity {
                    TsEntityName::Ident(ident) => {
                        self.hazard(ident, UnsafeReason::TypeQuery);
                        break;
                    }
                    TsEntityName::TsQualifiedName(qualified) => entity = &qualified.left,
                }
            }
        }
    }

    fn visit_jsx_element_name(&mut self, node: &JSXElementName) {
        match node {
            JSXElementName::Ident(ident) => self.hazard(ident, UnsafeReason::JsxTag),
            JSXElementName::JSXMemberExpr(member) => {
                let mut obj = &member.obj;
                loop {
                    match obj {
                        JSXObject::Ident(ident) => {
                            self.hazard(ident, UnsafeReason::JsxTag);
                            break;
                        }
                        JSXObject::JSXMemberExpr(inner) => obj = &inner.obj,
                    }
                }
            }
            JSXElementName::JSXNamespacedName(_) => {}
        }
    }

    fn visit_named_export(&mut self, node: &NamedExport) {
        // Re-exports with a source are handled through the import facts.
        if node.src.is_some() {
            return;
        }
        for spec in &node.specifiers {
            if let swc_ecma_ast::ExportSpecifier::Named(named) = spec {
                self.export_name(&named.orig);
            }
        }
    }

    fn visit_export_default_expr(&mut self, node: &ExportDefaultExpr) {
        if let Expr::Ident(ident) = &*node.expr {
            self.hazard(ident, UnsafeReason::ReExported);
        }
        node.visit_children_with(self);
    }
}

#[derive(Default)]
struct PatIdents {
    found: Vec<Ident>,
}

impl Visit for PatIdents {
    fn visit_pat(&mut self, node: &Pat) {
        match node {
            Pat::Ident(binding) => self.found.push(binding.id.clone()),
            Pat::Expr(expr) => {
                if let Some(ident) = root_ident(expr) {
                    self.found.push(ident.clone());
                }
            }
            _ => node.visit_children_with(self),
        }
    }
}
