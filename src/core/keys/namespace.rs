use std::path::Path;

use crate::core::extract::enrich::CONVENTIONAL_STEMS;
use crate::utils::to_camel_case;

pub const FALLBACK_NAMESPACE: &str = "common";

/// Common first segment of a set of dotted keys.
///
/// `None` when the list is empty, any key has no dot, or first segments differ.
pub fn detect_namespace<S: AsRef<str>>(keys: &[S]) -> Option<String> {
    let mut namespace: Option<&str> = None;
    for key in keys {
        let (first, _) = key.as_ref().split_once('.')?;
        match namespace {
            None => namespace = Some(first),
            Some(ns) if ns == first => {}
            Some(_) => return None,
        }
    }
    namespace.filter(|ns| !ns.is_empty()).map(str::to_string)
}

fn is_dynamic_segment(segment: &str) -> bool {
    segment.starts_with('[') || segment.starts_with('(') || segment.starts_with('@')
}

/// Namespace for a generated key that came back without one.
///
/// Preference: component name, last static route segment, file stem (parent
/// directory for conventional stems), then [`FALLBACK_NAMESPACE`].
pub fn infer_namespace(component: Option<&str>, route: Option<&str>, file: &str) -> String {
    let from_component = component.map(to_camel_case);
    let from_route = || {
        route.and_then(|r| {
            r.split('/')
                .rev()
                .find(|s| !s.is_empty() && !is_dynamic_segment(s))
                .map(to_camel_case)
        })
    };
    let from_file = || {
        let path = Path::new(file);
        let stem = path.file_stem()?.to_str()?;
        let stem = stem.split('.').next().unwrap_or(stem);
        if !CONVENTIONAL_STEMS.contains(&stem) {
            return Some(to_camel_case(stem));
        }
        let parent = path.parent()?.file_name()?.to_str()?;
        (!is_dynamic_segment(parent)).then(|| to_camel_case(parent))
    };

    from_component
        .filter(|ns| !ns.is_empty())
        .or_else(|| from_route().filter(|ns| !ns.is_empty()))
        .or_else(|| from_file().filter(|ns| !ns.is_empty()))
        .unwrap_or_else(|| FALLBACK_NAMESPACE.to_string())
}

pub fn qualify_key(key: &str, namespace: &str) -> String {
    if key.contains('.') {
        key.to_string()
    } else {
        format!("{}.{}", namespace, key)
    }
}

/// Key relative to an accessor namespace, if it lives under it.
pub fn relative_key<'k>(key: &'k str, namespace: Option<&str>) -> Option<&'k str> {
    match namespace {
        None => Some(key),
        Some(ns) => key.strip_prefix(ns).and_then(|rest| rest.strip_prefix('.')),
    }
}

pub fn full_key(key: &str, namespace: Option<&str>) -> String {
    match namespace {
        Some(ns) => format!("{}.{}", ns, key),
        None => key.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_detect_namespace() {
        assert_eq!(detect_namespace(&["hero.welcome", "hero.title"]).as_deref(), Some("hero"));
        assert_eq!(detect_namespace(&["hero.welcome", "common.signUp"]), None);
        assert_eq!(detect_namespace::<&str>(&[]), None);
        assert_eq!(detect_namespace(&["greeting"]), None);
        assert_eq!(detect_namespace(&["hero.welcome", "greeting"]), None);
        assert_eq!(
            detect_namespace(&["pricing.plans.pro".to_string(), "pricing.cta".to_string()])
                .as_deref(),
            Some("pricing")
        );
    }

    #[test]
    fn test_infer_namespace_preference() {
        assert_eq!(
            infer_namespace(Some("HeroSection"), Some("/about"), "src/components/Hero.tsx"),
            "heroSection"
        );
        assert_eq!(
            infer_namespace(None, Some("/blog/[slug]"), "app/blog/[slug]/page.tsx"),
            "blog"
        );
        assert_eq!(infer_namespace(None, None, "src/lib/pricing-table.ts"), "pricingTable");
        assert_eq!(infer_namespace(None, Some("/"), "app/settings/page.tsx"), "settings");
        assert_eq!(infer_namespace(None, Some("/"), "app/[locale]/page.tsx"), "common");
    }

    #[test]
    fn test_key_helpers() {
        assert_eq!(qualify_key("welcome", "hero"), "hero.welcome");
        assert_eq!(qualify_key("hero.welcome", "common"), "hero.welcome");
        assert_eq!(relative_key("hero.welcome", Some("hero")), Some("welcome"));
        assert_eq!(relative_key("heroes.welcome", Some("hero")), None);
        assert_eq!(relative_key("hero.welcome", None), Some("hero.welcome"));
        assert_eq!(full_key("welcome", Some("hero")), "hero.welcome");
    }
}
