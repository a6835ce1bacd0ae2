//! Phase 1: Extraction - per-file candidate strings.
//!
//! The occurrence collector walks a parsed file once; the same occurrences
//! feed both the candidate list handed to key generation and the rewrite pass.

pub mod enrich;
pub mod filters;
pub mod template;
pub mod types;
pub mod visitor;


pub use types::{ExtractedString, Occurrence, StringKind};
pub use visitor::{FileScan, OccurrenceCollector};

use crate::core::parsers::jsx::ParsedJSX;

/// Collects all occurrences of a file.
pub fn scan_file(parsed: &ParsedJSX, translatable_props: &[String]) -> FileScan {
    OccurrenceCollector::new(parsed.text(), translatable_props).collect(&parsed.module)
}

/// Maps occurrences to enriched candidate strings.
///
/// `file` is the path as reported to the user, relative to the project root.
pub fn extract_strings(parsed: &ParsedJSX, scan: &FileScan, file: &str) -> Vec<ExtractedString> {
    let mut strings = Vec::with_capacity(scan.occurrences.len());
    let mut composites = Vec::with_capacity(scan.occurrences.len());

    for occurrence in &scan.occurrences {
        let (line, column) = parsed.line_col(occurrence.span.lo);
        strings.push(ExtractedString {
            text: occurrence.text(),
            kind: occurrence.kind,
            file: file.to_string(),
            line,
            column,
            component_name: occurrence.component_name.clone(),
            parent_tag: occurrence.parent_tag.clone(),
            prop_name: occurrence.prop_name.clone(),
            parent_const_name: occurrence.parent_const.clone(),
            route_path: None,
            sibling_texts: Vec::new(),
            section_heading: None,
            composite_context: None,
            id: occurrence.id.clone(),
        });
        composites.push(
            occurrence
                .composite
                .and_then(|i| scan.composites.get(i))
                .map(Vec::as_slice),
        );
    }

    enrich::enrich_file(&mut strings, &composites);
    strings
}
