//! Eligibility predicates: which texts, attributes, tags and object
//! properties carry user-visible copy.

use std::sync::LazyLock;

use regex::Regex;

use crate::utils::contains_alphabetic;

/// Tags whose text content is never user copy.
pub const IGNORED_TAGS: &[&str] = &[
    "script",
    "style",
    "code",
    "pre",
    "svg",
    "path",
    "g",
    "circle",
    "rect",
    "line",
    "polyline",
    "polygon",
    "ellipse",
    "defs",
    "use",
    "symbol",
    "clipPath",
    "mask",
    "linearGradient",
    "radialGradient",
    "stop",
    "tspan",
    "kbd",
    "samp",
    "math",
    "noscript",
];

pub const DEFAULT_TRANSLATABLE_PROPS: &[&str] = &[
    "title",
    "placeholder",
    "alt",
    "label",
    "aria-label",
    "aria-description",
    "aria-placeholder",
    "aria-roledescription",
    "aria-valuetext",
    "description",
    "content",
    "caption",
    "tooltip",
    "heading",
    "subtitle",
    "message",
    "helperText",
    "errorMessage",
];

const NEVER_TRANSLATE_PROPS: &[&str] = &[
    "style",
    "className",
    "class",
    "id",
    "key",
    "ref",
    "href",
    "src",
    "type",
    "name",
    "htmlFor",
    "role",
    "value",
    "target",
    "rel",
    "method",
    "action",
    "testId",
];

/// Object keys that hold copy inside component data.
pub const CONTENT_PROPERTIES: &[&str] = &[
    "title",
    "description",
    "label",
    "text",
    "placeholder",
    "alt",
    "content",
    "heading",
    "subtitle",
    "subheading",
    "caption",
    "message",
    "tooltip",
    "summary",
    "buttonText",
    "cta",
    "ctaText",
    "helperText",
    "errorMessage",
    "successMessage",
    "emptyMessage",
    "hint",
    "excerpt",
    "question",
    "answer",
    "tagline",
];

/// Next.js route-segment exports and metadata objects, never copy.
pub const RESERVED_EXPORTS: &[&str] = &[
    "metadata",
    "generateMetadata",
    "viewport",
    "generateViewport",
    "config",
    "runtime",
    "dynamic",
    "dynamicParams",
    "revalidate",
    "fetchCache",
    "preferredRegion",
    "maxDuration",
    "generateStaticParams",
];

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[a-zA-Z][a-zA-Z0-9+.-]*://|www\.|mailto:|tel:)\S*$").unwrap()
});
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
static PATH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\.{0,2}/\S*$").unwrap());
static KEBAB_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)+$").unwrap());
static SNAKE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:_[a-z0-9]+)+$").unwrap());
static CONSTANT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9]+(?:_[A-Z0-9]+)+$").unwrap());
static CSS_VALUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:#[0-9a-fA-F]{3,8}|-?\d*\.?\d+(?:px|rem|em|vh|vw|vmin|vmax|%|ms|s|deg|fr|ch|pt))$")
        .unwrap()
});

/// True when the text is not worth translating.
pub fn should_ignore(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() || !contains_alphabetic(trimmed) {
        return true;
    }
    URL_RE.is_match(trimmed)
        || EMAIL_RE.is_match(trimmed)
        || PATH_RE.is_match(trimmed)
        || KEBAB_RE.is_match(trimmed)
        || SNAKE_RE.is_match(trimmed)
        || CONSTANT_RE.is_match(trimmed)
        || CSS_VALUE_RE.is_match(trimmed)
}

fn is_never_translated(name: &str) -> bool {
    if NEVER_TRANSLATE_PROPS.contains(&name) || name.starts_with("data-") {
        return true;
    }
    // Event handlers: onClick, onChange, ...
    name.strip_prefix("on")
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_uppercase())
}

pub fn is_translatable_prop(name: &str, custom: &[String]) -> bool {
    if is_never_translated(name) {
        return false;
    }
    DEFAULT_TRANSLATABLE_PROPS.contains(&name) || custom.iter().any(|c| c == name)
}

/// Attributes whose values are skipped entirely, including nested object literals.
pub fn is_opaque_attribute(name: &str) -> bool {
    matches!(name, "style" | "className" | "class" | "sx" | "css")
}

pub fn is_ignored_tag(tag: &str) -> bool {
    IGNORED_TAGS.contains(&tag)
}

pub fn is_content_property(name: &str, custom: &[String]) -> bool {
    CONTENT_PROPERTIES.contains(&name) || custom.iter().any(|c| c == name)
}

pub fn is_reserved_export(name: &str) -> bool {
    RESERVED_EXPORTS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_ignore_non_copy() {
        for text in [
            "",
            "   ",
            "123",
            "$4.99",
            "---",
            "https://example.com",
            "www.example.com",
            "mailto:team@example.com",
            "team@example.com",
            "/dashboard",
            "./logo.svg",
            "../assets/icon.png",
            "primary-button",
            "user_id",
            "MAX_RETRIES",
            "12px",
            "1.5rem",
            "#fff",
            "#1a2b3c",
        ] {
            assert!(should_ignore(text), "expected {:?} to be ignored", text);
        }
    }

    #[test]
    fn test_should_keep_copy() {
        for text in [
            "Welcome to our platform",
            "Save",
            "Sign in",
            "你好",
            "Don't have an account?",
            "Search {type}",
            "OK",
        ] {
            assert!(!should_ignore(text), "expected {:?} to be kept", text);
        }
    }

    #[test]
    fn test_translatable_props() {
        assert!(is_translatable_prop("placeholder", &[]));
        assert!(is_translatable_prop("aria-label", &[]));
        assert!(!is_translatable_prop("className", &[]));
        assert!(!is_translatable_prop("onClick", &[]));
        assert!(!is_translatable_prop("data-label", &[]));
        assert!(!is_translatable_prop("tagline", &[]));
        assert!(is_translatable_prop("tagline", &["tagline".to_string()]));
        // Custom entries cannot re-enable never-translate names.
        assert!(!is_translatable_prop("href", &["href".to_string()]));
    }

    #[test]
    fn test_tag_and_property_tables() {
        assert!(is_ignored_tag("code"));
        assert!(is_ignored_tag("svg"));
        assert!(!is_ignored_tag("p"));
        assert!(is_content_property("buttonText", &[]));
        assert!(!is_content_property("href", &[]));
        assert!(is_reserved_export("metadata"));
        assert!(!is_reserved_export("FEATURES"));
    }
}
