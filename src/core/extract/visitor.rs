//! Occurrence collector shared by extraction and rewriting.
//!
//! One walk records every eligible string literal together with the outermost
//! function it lives in, the accessor bindings that function already has and
//! the literal lookups made through them.

use swc_common::{BytePos, Span, Spanned};
use swc_ecma_ast::{
    ArrowExpr, BinaryOp, BlockStmtOrExpr, CallExpr, Callee, ClassDecl, ClassExpr, Decl,
    ExportDecl, ExportDefaultDecl, ExportDefaultExpr, Expr, ExprOrSpread, FnDecl, FnExpr, Function,
    JSXAttrName, JSXAttrOrSpread, JSXAttrValue, JSXElement, JSXElementChild, JSXElementName,
    JSXExpr, JSXExprContainer, JSXFragment, JSXObject, JSXText, Lit, MemberProp, MethodProp,
    Module, ObjectLit, Pat, Prop, PropName, PropOrSpread, Stmt, VarDeclarator,
};
use swc_ecma_visit::{Visit, VisitWith};

use super::filters::{
    is_content_property, is_ignored_tag, is_opaque_attribute, is_reserved_export,
    is_translatable_prop, should_ignore,
};
use super::template::{TemplateText, placeholder_name};
use super::types::{
    AccessorArg, AccessorCallee, ChildShape, ExistingAccessor, ExistingCall, FunctionScope,
    LiteralValue, Occurrence, ScopeBody, ScopeId, ScopeKind, Slot, StringKind,
};
use crate::core::parsers::jsx::SourceText;
use crate::utils::{contains_alphabetic, is_pascal_case};

/// Reserved lookup function of the runtime.
pub const TRANSLATE_FN: &str = "t";
/// Reserved markup wrapper of the inline runtime.
pub const WRAPPER_ELEMENT: &str = "T";

const ACCESSOR_METHODS: &[&str] = &["rich", "markup", "raw", "has"];

/// A top-level `export const NAME = <init>`.
#[derive(Debug, Clone)]
pub struct ExportedConst {
    pub name: String,
    pub name_span: Span,
    /// `: Type` annotation: the inner type span.
    pub type_ann: Option<Span>,
    pub init_span: Span,
    /// Names bound inside the initializer.
    pub init_bindings: Vec<String>,
}

/// Everything the collector found in one file.
#[derive(Debug, Default)]
pub struct FileScan {
    pub occurrences: Vec<Occurrence>,
    pub scopes: Vec<FunctionScope>,
    pub composites: Vec<Vec<ChildShape>>,
    pub exported_consts: Vec<ExportedConst>,
}

impl FileScan {
    pub fn scope(&self, id: ScopeId) -> &FunctionScope {
        &self.scopes[id]
    }

    pub fn exported_const(&self, name: &str) -> Option<&ExportedConst> {
        self.exported_consts.iter().find(|c| c.name == name)
    }
}

pub struct OccurrenceCollector<'a> {
    source: SourceText<'a>,
    translatable_props: &'a [String],
    scan: FileScan,

    current_scope: Option<ScopeId>,
    fn_depth: usize,
    pending_name: Option<String>,
    pending_default_export: bool,
    pending_method: bool,
    default_export_name: Option<String>,
    class_names: Vec<Option<String>>,

    export_const: Option<String>,
    reserved_depth: usize,
    tag_stack: Vec<String>,
    current_composite: Option<usize>,
}

impl<'a> OccurrenceCollector<'a> {
    pub fn new(source: SourceText<'a>, translatable_props: &'a [String]) -> Self {
        Self {
            source,
            translatable_props,
            scan: FileScan::default(),
            current_scope: None,
            fn_depth: 0,
            pending_name: None,
            pending_default_export: false,
            pending_method: false,
            default_export_name: None,
            class_names: Vec::new(),
            export_const: None,
            reserved_depth: 0,
            tag_stack: Vec::new(),
            current_composite: None,
        }
    }

    pub fn collect(mut self, module: &Module) -> FileScan {
        self.visit_module(module);
        if let Some(name) = self.default_export_name.take() {
            for scope in &mut self.scan.scopes {
                if scope.name.as_deref() == Some(name.as_str()) {
                    scope.is_default_export = true;
                }
            }
        }
        self.scan
    }

    fn component_name(&self) -> Option<String> {
        let scope = self.scan.scopes.get(self.current_scope?)?;
        scope.name.clone().filter(|n| is_pascal_case(n))
    }

    fn nearest_tag_ignored(&self) -> bool {
        self.tag_stack.last().is_some_and(|tag| is_ignored_tag(tag))
    }

    fn push(&mut self, kind: StringKind, value: LiteralValue, slot: Slot, span: Span) {
        self.push_with(kind, value, slot, span, None, None);
    }

    fn push_with(
        &mut self,
        kind: StringKind,
        value: LiteralValue,
        slot: Slot,
        span: Span,
        prop_name: Option<String>,
        id: Option<String>,
    ) {
        let judged = match &value {
            LiteralValue::Plain(text) => text.clone(),
            LiteralValue::Template(template) => template.static_text(),
        };
        if should_ignore(&judged) {
            return;
        }
        let parent_const = match kind {
            StringKind::ModuleObjectProperty => self.export_const.clone(),
            _ => None,
        };
        let composite = match kind {
            StringKind::JsxText => self.current_composite,
            _ => None,
        };
        self.scan.occurrences.push(Occurrence {
            kind,
            value,
            slot,
            span,
            scope: self.current_scope,
            component_name: self.component_name(),
            parent_tag: self.tag_stack.last().cloned(),
            prop_name,
            parent_const,
            id,
            composite,
        });
    }

    /// Records literal branches of an expression: the literal itself, both
    /// arms of a conditional and the right operand of `&&`, `||`, `??`.
    fn literal_branches(&mut self, expr: &Expr, kind: StringKind, prop_name: Option<&str>) {
        match expr {
            Expr::Paren(paren) => self.literal_branches(&paren.expr, kind, prop_name),
            Expr::Lit(Lit::Str(s)) => {
                if let Some(value) = s.value.as_str() {
                    self.push_with(
                        kind,
                        LiteralValue::Plain(value.to_string()),
                        Slot::Expr,
                        s.span,
                        prop_name.map(str::to_string),
                        None,
                    );
                }
            }
            Expr::Tpl(tpl) => {
                if let Some(template) = TemplateText::from_tpl(tpl, self.source) {
                    self.push_with(
                        kind,
                        LiteralValue::Template(template),
                        Slot::Expr,
                        tpl.span,
                        prop_name.map(str::to_string),
                        None,
                    );
                }
            }
            Expr::Cond(cond) => {
                self.literal_branches(&cond.cons, kind, prop_name);
                self.literal_branches(&cond.alt, kind, prop_name);
            }
            Expr::Bin(bin)
                if matches!(
                    bin.op,
                    BinaryOp::LogicalAnd | BinaryOp::LogicalOr | BinaryOp::NullishCoalescing
                ) =>
            {
                self.literal_branches(&bin.right, kind, prop_name);
            }
            _ => {}
        }
    }

    fn enter_function<N>(&mut self, node: &N, info: FunctionInfo)
    where
        N: VisitWith<Self>
            + VisitWith<JsxFinder>
            + VisitWith<BindingCollector>
            + VisitWith<AccessorUses>,
    {
        let opened = self.fn_depth == 0;
        if opened {
            let kind = if self.pending_method || !self.class_names.is_empty() {
                ScopeKind::Method
            } else {
                info.kind
            };
            let name = match kind {
                ScopeKind::Method => self.class_names.iter().rev().flatten().next().cloned(),
                _ => self.pending_name.take().or(info.own_name),
            };
            let mut finder = JsxFinder::default();
            node.visit_with(&mut finder);
            let mut bindings = BindingCollector::default();
            node.visit_with(&mut bindings);

            let id = self.scan.scopes.len();
            self.scan.scopes.push(FunctionScope {
                id,
                name,
                kind,
                span: info.span,
                body: info.body,
                is_async: info.is_async,
                is_default_export: std::mem::take(&mut self.pending_default_export),
                contains_jsx: finder.found,
                async_insert_at: if kind == ScopeKind::Method {
                    None
                } else {
                    info.async_insert_at
                },
                bindings: bindings.names,
                accessors: info.accessors,
                calls: Vec::new(),
            });
            self.current_scope = Some(id);
            self.pending_method = false;
        }

        self.fn_depth += 1;
        node.visit_children_with(self);
        self.fn_depth -= 1;

        if opened && let Some(id) = self.current_scope.take() {
            self.mark_dynamic_uses(node, id);
        }
    }

    /// Every mention of an accessor that is not a recorded literal call
    /// makes it dynamic.
    fn mark_dynamic_uses<N: VisitWith<AccessorUses>>(&mut self, node: &N, id: ScopeId) {
        let scope = &mut self.scan.scopes[id];
        if scope.accessors.is_empty() {
            return;
        }
        let mut uses = AccessorUses {
            accessors: scope
                .accessors
                .iter()
                .map(|a| (a.binding.clone(), a.binding_span))
                .collect(),
            counts: vec![0; scope.accessors.len()],
        };
        node.visit_with(&mut uses);
        for (accessor, mentions) in scope.accessors.iter_mut().zip(uses.counts) {
            let literal = scope
                .calls
                .iter()
                .filter(|c| c.accessor == accessor.binding)
                .count();
            accessor.dynamic_uses = mentions > literal;
        }
    }

    fn record_accessor_call(&mut self, call: &CallExpr) {
        let Some(scope_id) = self.current_scope else {
            return;
        };
        let Callee::Expr(callee) = &call.callee else {
            return;
        };
        let accessor = match &**callee {
            Expr::Ident(ident) => ident.sym.to_string(),
            Expr::Member(member) => match (&*member.obj, &member.prop) {
                (Expr::Ident(obj), MemberProp::Ident(prop))
                    if ACCESSOR_METHODS.contains(&&*prop.sym) =>
                {
                    obj.sym.to_string()
                }
                _ => return,
            },
            _ => return,
        };
        let scope = &mut self.scan.scopes[scope_id];
        if !scope.accessors.iter().any(|a| a.binding == accessor) {
            return;
        }
        let Some((key, key_span)) = call.args.first().and_then(string_arg) else {
            return;
        };
        let second = call.args.get(1).and_then(string_arg).map(|(s, _)| s);
        scope.calls.push(ExistingCall {
            accessor,
            key,
            key_span,
            second,
        });
    }

    fn record_t_call(&mut self, call: &CallExpr) {
        let Callee::Expr(callee) = &call.callee else {
            return;
        };
        let Expr::Ident(ident) = &**callee else {
            return;
        };
        if &*ident.sym != TRANSLATE_FN {
            return;
        }
        let Some(first) = call.args.first() else {
            return;
        };
        let value = match &*first.expr {
            Expr::Lit(Lit::Str(s)) => s.value.as_str().map(|v| LiteralValue::Plain(v.to_string())),
            Expr::Tpl(tpl) if tpl.exprs.is_empty() => {
                TemplateText::from_tpl(tpl, self.source).map(LiteralValue::Template)
            }
            _ => None,
        };
        let Some(value) = value else {
            return;
        };
        let id = call.args.get(1).and_then(string_arg).map(|(s, _)| s);
        self.push_with(StringKind::TCall, value, Slot::Existing, call.span, None, id);
    }

    fn visit_attributes(&mut self, attrs: &[JSXAttrOrSpread]) {
        for attr in attrs {
            let attr = match attr {
                JSXAttrOrSpread::JSXAttr(attr) => attr,
                JSXAttrOrSpread::SpreadElement(spread) => {
                    spread.visit_with(self);
                    continue;
                }
            };
            let name = attr_name(&attr.name);
            if is_opaque_attribute(&name) {
                continue;
            }
            let translatable = is_translatable_prop(&name, self.translatable_props);
            match &attr.value {
                Some(JSXAttrValue::Str(s)) if translatable => {
                    if let Some(value) = s.value.as_str() {
                        self.push_with(
                            StringKind::JsxAttribute,
                            LiteralValue::Plain(value.to_string()),
                            Slot::AttrString,
                            s.span,
                            Some(name.clone()),
                            None,
                        );
                    }
                }
                Some(JSXAttrValue::JSXExprContainer(container)) => {
                    if let JSXExpr::Expr(expr) = &container.expr {
                        if translatable {
                            self.literal_branches(expr, StringKind::JsxAttribute, Some(&name));
                        }
                        expr.visit_with(self);
                    }
                }
                Some(JSXAttrValue::JSXElement(element)) => element.visit_with(self),
                Some(JSXAttrValue::JSXFragment(fragment)) => fragment.visit_with(self),
                _ => {}
            }
        }
    }

    fn visit_jsx_children(&mut self, children: &[JSXElementChild]) {
        let composite = child_shapes(children, self.source).map(|shapes| {
            self.scan.composites.push(shapes);
            self.scan.composites.len() - 1
        });
        let prev = std::mem::replace(&mut self.current_composite, composite);
        for child in children {
            child.visit_with(self);
        }
        self.current_composite = prev;
    }

    fn record_wrapper(&mut self, node: &JSXElement) {
        let id = node.opening.attrs.iter().find_map(|attr| match attr {
            JSXAttrOrSpread::JSXAttr(attr) if attr_name(&attr.name) == "id" => match &attr.value {
                Some(JSXAttrValue::Str(s)) => s.value.as_str().map(str::to_string),
                _ => None,
            },
            _ => None,
        });
        let mut text = String::new();
        for child in &node.children {
            match child {
                JSXElementChild::JSXText(t) => text.push_str(&clean_jsx_text(self.source.slice(t.span))),
                _ => return,
            }
        }
        let text = decode_entities(text.trim());
        if id.is_none() || text.is_empty() {
            return;
        }
        self.push_with(
            StringKind::TComponent,
            LiteralValue::Plain(text),
            Slot::Existing,
            node.span,
            None,
            id,
        );
    }
}

struct FunctionInfo {
    kind: ScopeKind,
    own_name: Option<String>,
    span: Span,
    body: ScopeBody,
    is_async: bool,
    async_insert_at: Option<BytePos>,
    accessors: Vec<ExistingAccessor>,
}

impl<'a> Visit for OccurrenceCollector<'a> {
    fn visit_export_decl(&mut self, node: &ExportDecl) {
        if self.fn_depth > 0 {
            node.visit_children_with(self);
            return;
        }
        match &node.decl {
            Decl::Var(var) => {
                for decl in &var.decls {
                    let Pat::Ident(binding) = &decl.name else {
                        decl.visit_with(self);
                        continue;
                    };
                    let name = binding.id.sym.to_string();
                    if is_reserved_export(&name) {
                        self.reserved_depth += 1;
                        decl.visit_with(self);
                        self.reserved_depth -= 1;
                        continue;
                    }
                    if let Some(init) = &decl.init {
                        let mut bindings = BindingCollector::default();
                        init.visit_with(&mut bindings);
                        self.scan.exported_consts.push(ExportedConst {
                            name: name.clone(),
                            name_span: binding.id.span,
                            type_ann: binding.type_ann.as_ref().map(|ann| ann.type_ann.span()),
                            init_span: init.span(),
                            init_bindings: bindings.names,
                        });
                    }
                    let prev = self.export_const.replace(name);
                    decl.visit_with(self);
                    self.export_const = prev;
                }
            }
            Decl::Fn(f) if is_reserved_export(&f.ident.sym) => {
                self.reserved_depth += 1;
                f.visit_with(self);
                self.reserved_depth -= 1;
            }
            _ => node.visit_children_with(self),
        }
    }

    fn visit_export_default_decl(&mut self, node: &ExportDefaultDecl) {
        self.pending_default_export = true;
        node.visit_children_with(self);
        self.pending_default_export = false;
    }

    fn visit_export_default_expr(&mut self, node: &ExportDefaultExpr) {
        match unwrap_expr(&node.expr) {
            Expr::Ident(ident) => self.default_export_name = Some(ident.sym.to_string()),
            Expr::Arrow(_) | Expr::Fn(_) | Expr::Call(_) => {
                self.pending_default_export = true;
                node.visit_children_with(self);
                self.pending_default_export = false;
            }
            _ => node.visit_children_with(self),
        }
    }

    fn visit_var_declarator(&mut self, node: &VarDeclarator) {
        let named = self.fn_depth == 0
            && match (&node.name, node.init.as_deref().map(unwrap_expr)) {
                (Pat::Ident(binding), Some(Expr::Arrow(_) | Expr::Fn(_) | Expr::Call(_))) => {
                    self.pending_name = Some(binding.id.sym.to_string());
                    true
                }
                _ => false,
            };
        node.visit_children_with(self);
        if named {
            self.pending_name = None;
        }
    }

    fn visit_fn_decl(&mut self, node: &FnDecl) {
        if self.fn_depth == 0 {
            self.pending_name = Some(node.ident.sym.to_string());
        }
        node.visit_children_with(self);
    }

    fn visit_fn_expr(&mut self, node: &FnExpr) {
        if self.fn_depth == 0
            && self.pending_name.is_none()
            && let Some(ident) = &node.ident
        {
            self.pending_name = Some(ident.sym.to_string());
        }
        node.visit_children_with(self);
    }

    fn visit_method_prop(&mut self, node: &MethodProp) {
        if self.fn_depth == 0 {
            self.pending_method = true;
        }
        node.visit_children_with(self);
    }

    fn visit_class_decl(&mut self, node: &ClassDecl) {
        self.class_names.push(Some(node.ident.sym.to_string()));
        node.visit_children_with(self);
        self.class_names.pop();
    }

    fn visit_class_expr(&mut self, node: &ClassExpr) {
        self.class_names
            .push(node.ident.as_ref().map(|i| i.sym.to_string()));
        node.visit_children_with(self);
        self.class_names.pop();
    }

    fn visit_function(&mut self, node: &Function) {
        let Some(body) = &node.body else {
            return;
        };
        let info = FunctionInfo {
            kind: ScopeKind::FnDecl,
            own_name: None,
            span: node.span,
            body: ScopeBody::Block {
                lbrace: body.span.lo,
                first_stmt: body.stmts.first().map(|s| s.span().lo),
            },
            is_async: node.is_async,
            async_insert_at: if node.is_async {
                None
            } else {
                function_keyword_pos(self.source, node.span.lo, body.span.lo)
            },
            accessors: scan_accessors(&body.stmts),
        };
        self.enter_function(node, info);
    }

    fn visit_arrow_expr(&mut self, node: &ArrowExpr) {
        let (body, accessors) = match &*node.body {
            BlockStmtOrExpr::BlockStmt(block) => (
                ScopeBody::Block {
                    lbrace: block.span.lo,
                    first_stmt: block.stmts.first().map(|s| s.span().lo),
                },
                scan_accessors(&block.stmts),
            ),
            BlockStmtOrExpr::Expr(expr) => (ScopeBody::Expr(expr.span()), Vec::new()),
        };
        let info = FunctionInfo {
            kind: ScopeKind::Arrow,
            own_name: None,
            span: node.span,
            body,
            is_async: node.is_async,
            async_insert_at: (!node.is_async).then_some(node.span.lo),
            accessors,
        };
        self.enter_function(node, info);
    }

    fn visit_call_expr(&mut self, node: &CallExpr) {
        self.record_t_call(node);
        self.record_accessor_call(node);
        node.visit_children_with(self);
    }

    fn visit_object_lit(&mut self, node: &ObjectLit) {
        let in_component = self
            .current_scope
            .is_some_and(|id| self.scan.scopes[id].contains_jsx);
        let at_module_export = self.fn_depth == 0 && self.export_const.is_some();
        let allowed = self.reserved_depth == 0 && (in_component || at_module_export);

        if allowed {
            let kind = if self.fn_depth == 0 {
                StringKind::ModuleObjectProperty
            } else {
                StringKind::ObjectProperty
            };
            for prop in &node.props {
                let PropOrSpread::Prop(prop) = prop else {
                    continue;
                };
                let Prop::KeyValue(kv) = &**prop else {
                    continue;
                };
                let key = match &kv.key {
                    PropName::Ident(ident) => ident.sym.to_string(),
                    PropName::Str(s) => match s.value.as_str() {
                        Some(v) => v.to_string(),
                        None => continue,
                    },
                    _ => continue,
                };
                if is_content_property(&key, self.translatable_props) {
                    self.literal_branches(&kv.value, kind, Some(&key));
                }
            }
        }
        node.visit_children_with(self);
    }

    fn visit_jsx_element(&mut self, node: &JSXElement) {
        let tag = jsx_tag_name(&node.opening.name);
        self.visit_attributes(&node.opening.attrs);

        if tag == WRAPPER_ELEMENT {
            self.record_wrapper(node);
            return;
        }

        self.tag_stack.push(tag);
        self.visit_jsx_children(&node.children);
        self.tag_stack.pop();
    }

    fn visit_jsx_fragment(&mut self, node: &JSXFragment) {
        self.visit_jsx_children(&node.children);
    }

    fn visit_jsx_text(&mut self, node: &JSXText) {
        if self.nearest_tag_ignored() {
            return;
        }
        let raw = self.source.slice(node.span);
        let text = decode_entities(clean_jsx_text(raw).trim());
        if text.is_empty() {
            return;
        }
        let leading = raw.len() - raw.trim_start().len();
        let trailing = raw.len() - raw.trim_end().len();
        let span = Span::new(
            node.span.lo + BytePos(leading as u32),
            node.span.hi - BytePos(trailing as u32),
        );
        self.push(StringKind::JsxText, LiteralValue::Plain(text), Slot::JsxText, span);
    }

    fn visit_jsx_expr_container(&mut self, node: &JSXExprContainer) {
        if self.nearest_tag_ignored() {
            return;
        }
        if let JSXExpr::Expr(expr) = &node.expr {
            self.literal_branches(expr, StringKind::JsxExpression, None);
        }
        let prev = self.current_composite.take();
        node.visit_children_with(self);
        self.current_composite = prev;
    }
}

/// Literal string argument (plain or expression-free template).
fn string_arg(arg: &ExprOrSpread) -> Option<(String, Span)> {
    if arg.spread.is_some() {
        return None;
    }
    match &*arg.expr {
        Expr::Lit(Lit::Str(s)) => s.value.as_str().map(|v| (v.to_string(), s.span)),
        Expr::Tpl(tpl) if tpl.exprs.is_empty() => tpl
            .quasis
            .first()
            .and_then(|q| q.cooked.as_ref())
            .and_then(|c| c.as_str())
            .map(|v| (v.to_string(), tpl.span)),
        _ => None,
    }
}

/// Strips parentheses and TypeScript-only wrappers.
pub fn unwrap_expr(expr: &Expr) -> &Expr {
    match expr {
        Expr::Paren(p) => unwrap_expr(&p.expr),
        Expr::TsAs(e) => unwrap_expr(&e.expr),
        Expr::TsSatisfies(e) => unwrap_expr(&e.expr),
        Expr::TsConstAssertion(e) => unwrap_expr(&e.expr),
        Expr::TsNonNull(e) => unwrap_expr(&e.expr),
        _ => expr,
    }
}

fn function_keyword_pos(source: SourceText<'_>, lo: BytePos, body_lo: BytePos) -> Option<BytePos> {
    let head = source.slice(Span::new(lo, body_lo));
    let offset = head.find("function")?;
    Some(lo + BytePos(offset as u32))
}

/// Accessor bindings declared directly in a function body.
fn scan_accessors(stmts: &[Stmt]) -> Vec<ExistingAccessor> {
    let mut found = Vec::new();
    for stmt in stmts {
        let Stmt::Decl(Decl::Var(var)) = stmt else {
            continue;
        };
        for decl in &var.decls {
            let (Pat::Ident(binding), Some(init)) = (&decl.name, &decl.init) else {
                continue;
            };
            let call = match &**init {
                Expr::Await(await_expr) => match &*await_expr.arg {
                    Expr::Call(call) => call,
                    _ => continue,
                },
                Expr::Call(call) => call,
                _ => continue,
            };
            let Callee::Expr(callee) = &call.callee else {
                continue;
            };
            let Expr::Ident(callee) = &**callee else {
                continue;
            };
            let Some(callee) = AccessorCallee::from_name(&callee.sym) else {
                continue;
            };
            let arg = match call.args.first() {
                None => AccessorArg::None,
                Some(first) => match &*first.expr {
                    Expr::Lit(Lit::Str(s)) => match s.value.as_str() {
                        Some(ns) => AccessorArg::Namespace(ns.to_string()),
                        None => AccessorArg::Opaque,
                    },
                    Expr::Object(obj) => AccessorArg::Object(object_namespace(obj)),
                    _ => AccessorArg::Opaque,
                },
            };
            found.push(ExistingAccessor {
                binding: binding.id.sym.to_string(),
                callee,
                arg,
                init_span: init.span(),
                binding_span: binding.id.span,
                dynamic_uses: false,
            });
        }
    }
    found
}

fn object_namespace(obj: &ObjectLit) -> Option<String> {
    obj.props.iter().find_map(|prop| {
        let PropOrSpread::Prop(prop) = prop else {
            return None;
        };
        let Prop::KeyValue(kv) = &**prop else {
            return None;
        };
        let PropName::Ident(key) = &kv.key else {
            return None;
        };
        if &*key.sym != "namespace" {
            return None;
        }
        match &*kv.value {
            Expr::Lit(Lit::Str(s)) => s.value.as_str().map(str::to_string),
            _ => None,
        }
    })
}

pub fn jsx_tag_name(name: &JSXElementName) -> String {
    match name {
        JSXElementName::Ident(ident) => ident.sym.to_string(),
        JSXElementName::JSXMemberExpr(member) => {
            format!("{}.{}", jsx_object_name(&member.obj), member.prop.sym)
        }
        JSXElementName::JSXNamespacedName(ns) => format!("{}:{}", ns.ns.sym, ns.name.sym),
    }
}

fn jsx_object_name(obj: &JSXObject) -> String {
    match obj {
        JSXObject::Ident(ident) => ident.sym.to_string(),
        JSXObject::JSXMemberExpr(member) => {
            format!("{}.{}", jsx_object_name(&member.obj), member.prop.sym)
        }
    }
}

fn attr_name(name: &JSXAttrName) -> String {
    match name {
        JSXAttrName::Ident(ident) => ident.sym.to_string(),
        JSXAttrName::JSXNamespacedName(ns) => format!("{}:{}", ns.ns.sym, ns.name.sym),
    }
}

/// JSX whitespace semantics: lines are trimmed where they meet a line break,
/// blank lines dropped, the rest joined by single spaces.
pub fn clean_jsx_text(raw: &str) -> String {
    let lines: Vec<&str> = raw.split('\n').collect();
    let last = lines.len().saturating_sub(1);
    let mut parts: Vec<&str> = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        let mut line = line.trim_end_matches('\r');
        if i != 0 {
            line = line.trim_start_matches([' ', '\t']);
        }
        if i != last {
            line = line.trim_end_matches([' ', '\t']);
        }
        if !line.is_empty() {
            parts.push(line);
        }
    }
    parts.join(" ")
}

pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let decoded = tail.find(';').and_then(|end| {
            let entity = &tail[1..end];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            };
            ch.map(|c| (c, end + 1))
        });
        match decoded {
            Some((c, consumed)) => {
                out.push(c);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Shapes of a mixed children run, or `None` when the run is not mixed.
fn child_shapes(children: &[JSXElementChild], source: SourceText<'_>) -> Option<Vec<ChildShape>> {
    let mut shapes = Vec::new();
    let mut has_text = false;
    let mut has_other = false;
    for child in children {
        match child {
            JSXElementChild::JSXText(t) => {
                let text = decode_entities(&clean_jsx_text(source.slice(t.span)));
                if text.trim().is_empty() {
                    continue;
                }
                has_text |= contains_alphabetic(&text);
                shapes.push(ChildShape::Text(text));
            }
            JSXElementChild::JSXElement(el) => {
                has_other = true;
                shapes.push(ChildShape::Element(jsx_tag_name(&el.opening.name)));
            }
            JSXElementChild::JSXFragment(_) => {
                has_other = true;
                shapes.push(ChildShape::Element(String::new()));
            }
            JSXElementChild::JSXExprContainer(container) => {
                if let JSXExpr::Expr(expr) = &container.expr {
                    has_other = true;
                    shapes.push(ChildShape::Expr(placeholder_name(unwrap_expr(expr))));
                }
            }
            JSXElementChild::JSXSpreadChild(_) => {}
        }
    }
    (has_text && has_other).then_some(shapes)
}

#[derive(Default)]
pub struct JsxFinder {
    pub found: bool,
}

impl Visit for JsxFinder {
    fn visit_jsx_element(&mut self, _: &JSXElement) {
        self.found = true;
    }

    fn visit_jsx_fragment(&mut self, _: &JSXFragment) {
        self.found = true;
    }
}

/// Mentions of accessor bindings, declarations excluded.
pub struct AccessorUses {
    accessors: Vec<(String, Span)>,
    counts: Vec<usize>,
}

impl Visit for AccessorUses {
    fn visit_ident(&mut self, node: &swc_ecma_ast::Ident) {
        for (i, (name, declared)) in self.accessors.iter().enumerate() {
            if &*node.sym == name.as_str() && node.span != *declared {
                self.counts[i] += 1;
            }
        }
    }
}

/// Every name declared inside a node: parameters, variables, functions, classes.
#[derive(Default)]
pub struct BindingCollector {
    pub names: Vec<String>,
}

impl BindingCollector {
    fn add(&mut self, name: &str) {
        if !self.names.iter().any(|n| n == name) {
            self.names.push(name.to_string());
        }
    }
}

impl Visit for BindingCollector {
    fn visit_binding_ident(&mut self, node: &swc_ecma_ast::BindingIdent) {
        self.add(&node.id.sym);
    }

    fn visit_fn_decl(&mut self, node: &FnDecl) {
        self.add(&node.ident.sym);
        node.visit_children_with(self);
    }

    fn visit_fn_expr(&mut self, node: &FnExpr) {
        if let Some(ident) = &node.ident {
            self.add(&ident.sym);
        }
        node.visit_children_with(self);
    }

    fn visit_class_decl(&mut self, node: &ClassDecl) {
        self.add(&node.ident.sym);
        node.visit_children_with(self);
    }
}
