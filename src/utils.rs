//! Common utility functions shared across the codebase.

/// Checks if the text contains at least one Unicode alphabetic character.
///
/// Returns false for empty strings, pure numbers, or pure symbols.
///
/// # Examples
///
/// ```
/// use tolk::utils::contains_alphabetic;
///
/// assert!(contains_alphabetic("Hello"));
/// assert!(contains_alphabetic("你好"));
/// assert!(contains_alphabetic("Hello123"));
/// assert!(!contains_alphabetic("123"));
/// assert!(!contains_alphabetic("---"));
/// assert!(!contains_alphabetic("$100"));
/// assert!(!contains_alphabetic(""));
/// ```
pub fn contains_alphabetic(text: &str) -> bool {
    text.chars().any(|c| c.is_alphabetic())
}

/// `HeroSection` / `hero-section` / `hero_section` -> `heroSection`.
pub fn to_camel_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut upper_next = false;
    for ch in text.chars() {
        if ch == '-' || ch == '_' || ch == ' ' || ch == '.' {
            upper_next = !out.is_empty();
            continue;
        }
        if !ch.is_alphanumeric() {
            continue;
        }
        if out.is_empty() {
            out.extend(ch.to_lowercase());
        } else if upper_next {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        upper_next = false;
    }
    out
}

/// Uppercases the first character, leaving the rest untouched.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Component-style name: leading uppercase letter and not SCREAMING_CASE.
///
/// `Hero`, `PricingTable` and `A` qualify; `FEATURES` and `hero` do not.
pub fn is_pascal_case(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_uppercase() {
        return false;
    }
    let rest: Vec<char> = chars.collect();
    rest.is_empty() || rest.iter().any(|c| c.is_lowercase())
}

/// `useSomething` custom hook naming.
pub fn is_hook_name(name: &str) -> bool {
    name.strip_prefix("use")
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_uppercase())
}

#[cfg(test)]
mod tests {
    use crate::utils::*;

    #[test]
    fn test_contains_alphabetic() {
        assert!(contains_alphabetic("Hello"));
        assert!(contains_alphabetic("你好"));
        assert!(contains_alphabetic("123 abc"));
        assert!(contains_alphabetic("Test!@#"));

        assert!(!contains_alphabetic("123"));
        assert!(!contains_alphabetic("!@#$%"));
        assert!(!contains_alphabetic("   "));
        assert!(!contains_alphabetic(""));
        assert!(!contains_alphabetic("123-456"));
    }

    #[test]
    fn test_to_camel_case() {
        assert_eq!(to_camel_case("HeroSection"), "heroSection");
        assert_eq!(to_camel_case("hero-section"), "heroSection");
        assert_eq!(to_camel_case("about_us"), "aboutUs");
        assert_eq!(to_camel_case("pricing"), "pricing");
        assert_eq!(to_camel_case("[slug]"), "slug");
        assert_eq!(to_camel_case(""), "");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("name"), "Name");
        assert_eq!(capitalize("Name"), "Name");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_is_pascal_case() {
        assert!(is_pascal_case("Hero"));
        assert!(is_pascal_case("PricingTable"));
        assert!(is_pascal_case("A"));
        assert!(!is_pascal_case("FEATURES"));
        assert!(!is_pascal_case("hero"));
        assert!(!is_pascal_case(""));
    }

    #[test]
    fn test_is_hook_name() {
        assert!(is_hook_name("useCart"));
        assert!(!is_hook_name("user"));
        assert!(!is_hook_name("use"));
    }
}
