//! Byte-range edits against the original source.

use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: Range<usize>,
    pub text: String,
}

impl TextEdit {
    fn is_insertion(&self) -> bool {
        self.range.is_empty()
    }
}

/// Ordered collection of edits; applied all at once.
#[derive(Debug, Default)]
pub struct EditSet {
    edits: Vec<TextEdit>,
}

impl EditSet {
    pub fn insert(&mut self, at: usize, text: impl Into<String>) {
        self.edits.push(TextEdit {
            range: at..at,
            text: text.into(),
        });
    }

    pub fn replace(&mut self, range: Range<usize>, text: impl Into<String>) {
        self.edits.push(TextEdit {
            range,
            text: text.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Applies every edit, or returns the offset of the first overlap.
    ///
    /// Insertions at a position go before a replacement starting there, and
    /// keep the order they were added in.
    pub fn apply(mut self, code: &str) -> Result<String, usize> {
        self.edits
            .sort_by_key(|e| (e.range.start, !e.is_insertion()));

        let mut out = String::with_capacity(code.len() + self.edits.len() * 16);
        let mut cursor = 0;
        for edit in &self.edits {
            if edit.range.start < cursor || edit.range.end > code.len() {
                return Err(edit.range.start);
            }
            out.push_str(&code[cursor..edit.range.start]);
            out.push_str(&edit.text);
            cursor = edit.range.end;
        }
        out.push_str(&code[cursor..]);
        Ok(out)
    }
}

/// Leading whitespace of the line containing `offset`.
pub fn line_indent(code: &str, offset: usize) -> &str {
    let line_start = code[..offset.min(code.len())]
        .rfind('\n')
        .map(|i| i + 1)
        .unwrap_or(0);
    let line = &code[line_start..];
    let end = line
        .find(|c: char| c != ' ' && c != '\t')
        .unwrap_or(line.len());
    &line[..end]
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_apply_in_position_order() {
        let mut edits = EditSet::default();
        edits.replace(6..11, "there");
        edits.insert(0, "<");
        edits.insert(11, ">");
        assert_eq!(edits.apply("hello world").unwrap(), "<hello there>");
    }

    #[test]
    fn test_insertion_before_replacement_at_same_start() {
        let mut edits = EditSet::default();
        edits.replace(0..1, "B");
        edits.insert(0, "1");
        edits.insert(0, "2");
        assert_eq!(edits.apply("a").unwrap(), "12B");
    }

    #[test]
    fn test_overlap_is_reported() {
        let mut edits = EditSet::default();
        edits.replace(0..5, "x");
        edits.replace(3..7, "y");
        assert_eq!(edits.apply("0123456789"), Err(3));

        let mut inside = EditSet::default();
        inside.replace(0..5, "x");
        inside.insert(2, "y");
        assert_eq!(inside.apply("0123456789"), Err(2));
    }

    #[test]
    fn test_line_indent() {
        let code = "fn() {\n    return 1;\n}";
        assert_eq!(line_indent(code, 11), "    ");
        assert_eq!(line_indent(code, 0), "");
    }
}
