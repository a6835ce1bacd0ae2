//! Client-boundary classification.
//!
//! A file is a client root when it opens with `"use client"` or calls one of
//! the hooks below. The accessor hooks this tool injects are not in the table,
//! so a file promoted by the closure can be demoted on a later run.

use swc_ecma_ast::{CallExpr, Callee, Expr, MemberProp};
use swc_ecma_visit::{Visit, VisitWith};

use super::imports::FileImports;
use crate::core::parsers::jsx::ParsedJSX;

pub const CLIENT_DIRECTIVE: &str = "use client";

/// React state and effect hooks.
pub const REACT_HOOKS: &[&str] = &[
    "useState",
    "useEffect",
    "useLayoutEffect",
    "useInsertionEffect",
    "useReducer",
    "useRef",
    "useContext",
    "useCallback",
    "useMemo",
    "useTransition",
    "useDeferredValue",
    "useSyncExternalStore",
    "useId",
    "useOptimistic",
    "useActionState",
    "useFormStatus",
    "useImperativeHandle",
];

/// Router hooks of the App and Pages routers.
pub const NAVIGATION_HOOKS: &[&str] = &[
    "useRouter",
    "usePathname",
    "useSearchParams",
    "useParams",
    "useSelectedLayoutSegment",
    "useSelectedLayoutSegments",
];

/// Data fetching hooks.
pub const QUERY_HOOKS: &[&str] = &[
    "useQuery",
    "useMutation",
    "useInfiniteQuery",
    "useSuspenseQuery",
    "useQueryClient",
    "useSWR",
    "useSWRMutation",
];

pub fn is_client_hook(name: &str) -> bool {
    REACT_HOOKS.contains(&name) || NAVIGATION_HOOKS.contains(&name) || QUERY_HOOKS.contains(&name)
}

/// Why a file runs on the client by itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientSignals {
    pub directive: bool,
    /// First client hook called, if any.
    pub hook: Option<String>,
}

impl ClientSignals {
    pub fn is_client_root(&self) -> bool {
        self.directive || self.hook.is_some()
    }
}

pub fn client_signals(parsed: &ParsedJSX, imports: &FileImports) -> ClientSignals {
    let mut finder = HookFinder::default();
    parsed.module.visit_with(&mut finder);
    ClientSignals {
        directive: imports.has_directive(CLIENT_DIRECTIVE),
        hook: finder.found,
    }
}

#[derive(Default)]
struct HookFinder {
    found: Option<String>,
}

impl Visit for HookFinder {
    fn visit_call_expr(&mut self, node: &CallExpr) {
        if self.found.is_some() {
            return;
        }
        if let Callee::Expr(callee) = &node.callee {
            let name = match &**callee {
                Expr::Ident(ident) => Some(&*ident.sym),
                Expr::Member(member) => match (&*member.obj, &member.prop) {
                    (Expr::Ident(obj), MemberProp::Ident(prop)) if &*obj.sym == "React" => {
                        Some(&*prop.sym)
                    }
                    _ => None,
                },
                _ => None,
            };
            if let Some(name) = name.filter(|n| is_client_hook(n)) {
                self.found = Some(name.to_string());
                return;
            }
        }
        node.visit_children_with(self);
    }
}
