use anyhow::{Result, anyhow};
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;
use swc_common::{BytePos, FileName, Globals, SourceMap, Span};
use swc_ecma_ast::Module;
use swc_ecma_parser::{Parser, StringInput, Syntax, TsSyntax};

/// A parsed source file together with the text it was parsed from.
///
/// Spans in `module` are absolute positions in `source_map`; `start_pos`
/// maps them back to byte offsets into `source`.
pub struct ParsedJSX {
    pub module: Module,
    pub source_map: Arc<SourceMap>,
    pub source: String,
    pub start_pos: BytePos,
    /// Errors the parser recovered from. Output is held to the same count.
    pub recovered_errors: usize,
}

impl ParsedJSX {
    pub fn text(&self) -> SourceText<'_> {
        SourceText {
            code: &self.source,
            start: self.start_pos,
        }
    }

    /// 1-based line and column of a position.
    pub fn line_col(&self, pos: BytePos) -> (usize, usize) {
        let loc = self.source_map.lookup_char_pos(pos);
        (loc.line, loc.col_display + 1)
    }
}

/// Borrowed view of a file's text addressed by swc spans.
#[derive(Clone, Copy)]
pub struct SourceText<'a> {
    pub code: &'a str,
    pub start: BytePos,
}

impl<'a> SourceText<'a> {
    pub fn offset(&self, pos: BytePos) -> usize {
        (pos.0.saturating_sub(self.start.0) as usize).min(self.code.len())
    }

    pub fn range(&self, span: Span) -> Range<usize> {
        self.offset(span.lo)..self.offset(span.hi)
    }

    pub fn slice(&self, span: Span) -> &'a str {
        self.code.get(self.range(span)).unwrap_or("")
    }

    pub fn pos(&self, offset: usize) -> BytePos {
        BytePos(self.start.0 + offset as u32)
    }
}

fn syntax_for(file_path: &str) -> Syntax {
    let plain_ts = Path::new(file_path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| matches!(ext, "ts" | "mts" | "cts"));

    Syntax::Typescript(TsSyntax {
        tsx: !plain_ts,
        ..Default::default()
    })
}

/// Parse JSX/TSX source code string into an AST.
///
/// Accepts a shared SourceMap; every call registers its own source file in it.
pub fn parse_jsx_source(
    code: String,
    file_path: &str,
    source_map: Arc<SourceMap>,
) -> Result<ParsedJSX> {
    use swc_common::GLOBALS;

    // Wrap in GLOBALS.set() for thread safety
    GLOBALS.set(&Globals::new(), || {
        let source_file =
            source_map.new_source_file(FileName::Real(file_path.into()).into(), code.clone());

        let mut parser = Parser::new(syntax_for(file_path), StringInput::from(&*source_file), None);

        let module = parser
            .parse_module()
            .map_err(|e| anyhow!("Failed to parse {}: {:?}", file_path, e.kind()))?;
        let recovered_errors = parser.take_errors().len();

        Ok(ParsedJSX {
            module,
            start_pos: source_file.start_pos,
            source_map,
            source: code,
            recovered_errors,
        })
    })
}

/// Re-parses generated output with a fresh source map.
///
/// Fails when the output does not parse, or when it needed more error
/// recovery than the input it was generated from.
pub fn validate_reparse(code: &str, file_path: &str, allowed_recoveries: usize) -> Result<()> {
    let parsed = parse_jsx_source(code.to_string(), file_path, Arc::new(SourceMap::default()))?;
    if parsed.recovered_errors > allowed_recoveries {
        return Err(anyhow!(
            "Output of {} has {} recoverable syntax error(s)",
            file_path,
            parsed.recovered_errors
        ));
    }
    Ok(())
}
