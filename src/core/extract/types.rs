use serde::{Deserialize, Serialize};
use swc_common::{BytePos, Span};

use super::template::TemplateText;

/// Structural position a string was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StringKind {
    JsxText,
    JsxAttribute,
    JsxExpression,
    ObjectProperty,
    ModuleObjectProperty,
    TCall,
    #[serde(rename = "T-component")]
    TComponent,
}

/// A candidate string with everything a key generator needs to name it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedString {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: StringKind,
    pub file: String,
    pub line: usize,
    pub column: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prop_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_const_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sibling_texts: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_heading: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composite_context: Option<String>,
    /// Explicit id of an existing `t` call or `T` element.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// The literal an occurrence was built from.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Plain(String),
    Template(TemplateText),
}

impl LiteralValue {
    pub fn text(&self) -> String {
        match self {
            LiteralValue::Plain(text) => text.clone(),
            LiteralValue::Template(template) => template.text(),
        }
    }

    pub fn template(&self) -> Option<&TemplateText> {
        match self {
            LiteralValue::Template(template) => Some(template),
            LiteralValue::Plain(_) => None,
        }
    }
}

/// How the replacement for an occurrence has to be shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Trimmed JSX text between tags.
    JsxText,
    /// Bare string attribute value, `title="x"`; the lookup needs braces.
    AttrString,
    /// Any expression position.
    Expr,
    /// Existing lookup; reported, never rewritten.
    Existing,
}

pub type ScopeId = usize;

/// One shape in a run of mixed JSX children.
#[derive(Debug, Clone, PartialEq)]
pub enum ChildShape {
    Text(String),
    Element(String),
    Expr(Option<String>),
}

#[derive(Debug, Clone)]
pub struct Occurrence {
    pub kind: StringKind,
    pub value: LiteralValue,
    pub slot: Slot,
    pub span: Span,
    pub scope: Option<ScopeId>,
    pub component_name: Option<String>,
    pub parent_tag: Option<String>,
    pub prop_name: Option<String>,
    pub parent_const: Option<String>,
    pub id: Option<String>,
    /// Index into `FileScan::composites` for texts inside mixed children.
    pub composite: Option<usize>,
}

impl Occurrence {
    pub fn text(&self) -> String {
        self.value.text()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    FnDecl,
    FnExpr,
    Arrow,
    /// Class member or object method; never receives an accessor.
    Method,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeBody {
    /// Block body; `lbrace` is the position of `{`.
    Block { lbrace: BytePos, first_stmt: Option<BytePos> },
    /// Expression-bodied arrow.
    Expr(Span),
}

/// Argument shape of an existing accessor call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessorArg {
    None,
    Namespace(String),
    /// `getTranslations({ namespace: "x", locale })`; never edited.
    Object(Option<String>),
    /// Anything else (identifiers, calls); never edited.
    Opaque,
}

/// Known accessor factories and the runtime they belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessorCallee {
    UseTranslations,
    GetTranslations,
    UseT,
    GetT,
}

impl AccessorCallee {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "useTranslations" => Some(Self::UseTranslations),
            "getTranslations" => Some(Self::GetTranslations),
            "useT" => Some(Self::UseT),
            "getT" => Some(Self::GetT),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::UseTranslations => "useTranslations",
            Self::GetTranslations => "getTranslations",
            Self::UseT => "useT",
            Self::GetT => "getT",
        }
    }

    pub fn is_client(self) -> bool {
        matches!(self, Self::UseTranslations | Self::UseT)
    }

    pub fn is_inline(self) -> bool {
        matches!(self, Self::UseT | Self::GetT)
    }
}

/// `const t = await getTranslations("hero")` at the top of a scope body.
#[derive(Debug, Clone)]
pub struct ExistingAccessor {
    pub binding: String,
    pub callee: AccessorCallee,
    pub arg: AccessorArg,
    /// Span of the whole initializer, `await` included.
    pub init_span: Span,
    pub binding_span: Span,
    /// Used other than as `t("literal")`: passed along, called with a
    /// computed key, captured by a nested binding of the same name.
    pub dynamic_uses: bool,
}

/// A call through an accessor binding with a literal first argument.
#[derive(Debug, Clone)]
pub struct ExistingCall {
    pub accessor: String,
    pub key: String,
    pub key_span: Span,
    /// Second literal argument (`t("Text", "key")` in inline mode).
    pub second: Option<String>,
}

/// Outermost enclosing function of one or more occurrences.
#[derive(Debug, Clone)]
pub struct FunctionScope {
    pub id: ScopeId,
    pub name: Option<String>,
    pub kind: ScopeKind,
    pub span: Span,
    pub body: ScopeBody,
    pub is_async: bool,
    pub is_default_export: bool,
    pub contains_jsx: bool,
    /// Where `async ` goes to make the function async, when it can be.
    pub async_insert_at: Option<BytePos>,
    /// Every name bound anywhere inside the function.
    pub bindings: Vec<String>,
    pub accessors: Vec<ExistingAccessor>,
    pub calls: Vec<ExistingCall>,
}

impl FunctionScope {
    pub fn accessor_names(&self) -> impl Iterator<Item = &str> {
        self.accessors.iter().map(|a| a.binding.as_str())
    }

    pub fn binds(&self, name: &str) -> bool {
        self.bindings.iter().any(|b| b == name)
    }
}
