//! Template literal reduction.
//!
//! `` `Search ${type}` `` becomes the text `Search {type}` plus a placeholder
//! table. Names and expressions stay paired one-to-one so a rewrite can emit
//! `{ type }` or `{ userName: user.name }` without re-deriving anything.

use swc_ecma_ast::{Expr, MemberProp, OptChainBase, Tpl};

use crate::core::parsers::jsx::SourceText;
use crate::utils::capitalize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub name: String,
    /// Source text of the interpolated expression.
    pub expr: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateText {
    /// Cooked static parts; always one more than `placeholders`.
    pub quasis: Vec<String>,
    pub placeholders: Vec<Placeholder>,
}

impl TemplateText {
    /// Reduces a template literal, or `None` when any part is ineligible.
    pub fn from_tpl(tpl: &Tpl, source: SourceText<'_>) -> Option<Self> {
        let quasis = tpl
            .quasis
            .iter()
            .map(|q| q.cooked.as_ref().and_then(|c| c.as_str()).map(str::to_string))
            .collect::<Option<Vec<_>>>()?;

        let mut placeholders: Vec<Placeholder> = Vec::with_capacity(tpl.exprs.len());
        for expr in &tpl.exprs {
            let base = placeholder_name(expr)?;
            let name = unique_name(&base, &placeholders);
            placeholders.push(Placeholder {
                name,
                expr: source.slice(expr_span(expr)).to_string(),
            });
        }

        if quasis.len() != placeholders.len() + 1 {
            return None;
        }
        Some(Self {
            quasis,
            placeholders,
        })
    }

    pub fn text(&self) -> String {
        let mut out = String::new();
        for (i, quasi) in self.quasis.iter().enumerate() {
            out.push_str(quasi);
            if let Some(p) = self.placeholders.get(i) {
                out.push('{');
                out.push_str(&p.name);
                out.push('}');
            }
        }
        out
    }

    /// Static parts only; eligibility is judged on these.
    pub fn static_text(&self) -> String {
        self.quasis.concat()
    }

    /// `{ type, userName: user.name }`, or `None` without placeholders.
    pub fn values_object(&self) -> Option<String> {
        if self.placeholders.is_empty() {
            return None;
        }
        let fields: Vec<String> = self
            .placeholders
            .iter()
            .map(|p| {
                if p.name == p.expr {
                    p.name.clone()
                } else {
                    format!("{}: {}", p.name, p.expr)
                }
            })
            .collect();
        Some(format!("{{ {} }}", fields.join(", ")))
    }
}

fn expr_span(expr: &Expr) -> swc_common::Span {
    use swc_common::Spanned;
    expr.span()
}

fn unique_name(base: &str, taken: &[Placeholder]) -> String {
    if !taken.iter().any(|p| p.name == base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{}{}", base, n))
        .find(|candidate| !taken.iter().any(|p| &p.name == candidate))
        .unwrap_or_else(|| base.to_string())
}

/// Identifier -> its name; member chain -> camel-cased concatenation.
pub fn placeholder_name(expr: &Expr) -> Option<String> {
    let segments = chain_segments(expr)?;
    let mut iter = segments.into_iter();
    let mut name = iter.next()?;
    for segment in iter {
        name.push_str(&capitalize(&segment));
    }
    Some(name)
}

fn chain_segments(expr: &Expr) -> Option<Vec<String>> {
    match expr {
        Expr::Ident(ident) => Some(vec![ident.sym.to_string()]),
        Expr::Member(member) => {
            let MemberProp::Ident(prop) = &member.prop else {
                return None;
            };
            let mut segments = chain_segments(&member.obj)?;
            segments.push(prop.sym.to_string());
            Some(segments)
        }
        Expr::OptChain(chain) => match &*chain.base {
            OptChainBase::Member(member) => {
                let MemberProp::Ident(prop) = &member.prop else {
                    return None;
                };
                let mut segments = chain_segments(&member.obj)?;
                segments.push(prop.sym.to_string());
                Some(segments)
            }
            OptChainBase::Call(_) => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;
    use swc_common::SourceMap;
    use swc_ecma_ast::{Decl, ModuleItem, Stmt};

    use super::*;
    use crate::core::parsers::jsx::{ParsedJSX, parse_jsx_source};

    fn parse(code: &str) -> ParsedJSX {
        parse_jsx_source(code.to_string(), "t.tsx", Arc::new(SourceMap::default())).unwrap()
    }

    fn reduce(template: &str) -> Option<TemplateText> {
        let parsed = parse(&format!("const x = {};", template));
        let ModuleItem::Stmt(Stmt::Decl(Decl::Var(var))) = &parsed.module.body[0] else {
            panic!("expected var decl");
        };
        let Some(init) = &var.decls[0].init else {
            panic!("expected init");
        };
        let Expr::Tpl(tpl) = &**init else {
            panic!("expected template");
        };
        TemplateText::from_tpl(tpl, parsed.text())
    }

    #[test]
    fn test_identifier_placeholder() {
        let t = reduce("`Search ${type}`").unwrap();
        assert_eq!(t.text(), "Search {type}");
        assert_eq!(t.values_object().as_deref(), Some("{ type }"));
    }

    #[test]
    fn test_member_chain_placeholder() {
        let t = reduce("`Hello ${user.name}, you have ${user?.inbox.count} messages`").unwrap();
        assert_eq!(t.text(), "Hello {userName}, you have {userInboxCount} messages");
        assert_eq!(
            t.values_object().as_deref(),
            Some("{ userName: user.name, userInboxCount: user?.inbox.count }")
        );
    }

    #[test]
    fn test_duplicate_names_are_numbered() {
        let t = reduce("`${count} of ${count} and ${count}`").unwrap();
        assert_eq!(t.text(), "{count} of {count2} and {count3}");
        assert_eq!(
            t.values_object().as_deref(),
            Some("{ count, count2: count, count3: count }")
        );
    }

    #[test]
    fn test_complex_expression_is_ineligible() {
        assert_eq!(reduce("`Total: ${price * 2}`"), None);
        assert_eq!(reduce("`Hi ${getName()}`"), None);
        assert_eq!(reduce("`Hi ${items[0]}`"), None);
    }

    #[test]
    fn test_plain_template() {
        let t = reduce("`Just text`").unwrap();
        assert_eq!(t.text(), "Just text");
        assert_eq!(t.values_object(), None);
    }
}
