use anyhow::{Context, Result};
use serde_json::Value;

/// Parses JSON that may carry `//` and `/* */` comments and trailing commas.
pub fn parse_jsonc(content: &str) -> Result<Value> {
    let cleaned = strip_trailing_commas(&strip_comments(content));
    serde_json::from_str(&cleaned).context("Invalid JSON")
}

fn strip_comments(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();
    let mut in_string = false;

    while let Some(ch) = chars.next() {
        if in_string {
            out.push(ch);
            match ch {
                '\\' => {
                    if let Some(next) = chars.next() {
                        out.push(next);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match (ch, chars.peek()) {
            ('"', _) => {
                in_string = true;
                out.push(ch);
            }
            ('/', Some('/')) => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
                out.push(' ');
            }
            _ => out.push(ch),
        }
    }
    out
}

fn strip_trailing_commas(content: &str) -> String {
    let chars: Vec<char> = content.chars().collect();
    let mut out = String::with_capacity(content.len());
    let mut in_string = false;
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        if in_string {
            out.push(ch);
            if ch == '\\' && i + 1 < chars.len() {
                out.push(chars[i + 1]);
                i += 2;
                continue;
            }
            if ch == '"' {
                in_string = false;
            }
            i += 1;
            continue;
        }
        if ch == '"' {
            in_string = true;
        }
        if ch == ',' {
            let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
            if matches!(next, Some('}') | Some(']')) {
                i += 1;
                continue;
            }
        }
        out.push(ch);
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_json() {
        let value = parse_jsonc(r#"{"a": 1}"#).unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn test_comments_and_trailing_commas() {
        let value = parse_jsonc(
            r#"{
                // line comment
                "compilerOptions": {
                    /* block
                       comment */
                    "baseUrl": ".",
                    "paths": { "@/*": ["./src/*"], },
                },
            }"#,
        )
        .unwrap();
        assert_eq!(value["compilerOptions"]["baseUrl"], ".");
        assert_eq!(value["compilerOptions"]["paths"]["@/*"][0], "./src/*");
    }

    #[test]
    fn test_comment_markers_inside_strings_are_kept() {
        let value = parse_jsonc(r#"{"url": "https://example.com/*x*/", "s": "a,}"}"#).unwrap();
        assert_eq!(value["url"], "https://example.com/*x*/");
        assert_eq!(value["s"], "a,}");
    }

    #[test]
    fn test_invalid_json_errors() {
        assert!(parse_jsonc("{ nope }").is_err());
    }
}
