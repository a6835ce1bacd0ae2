//! Report formatting and printing utilities.
//!
//! Issues are printed cargo-style to stderr so that `tolk extract` can keep
//! stdout for JSON. Kept apart from the core so tolk can be used as a library.

use std::io::{self, Write};

use colored::Colorize;
use unicode_width::UnicodeWidthStr;

use super::commands::{
    ChangedFile, CommandResult, CommandSummary, ExtractOutput, ExtractSummary, FileRole,
    GraphSummary, InitSummary, WrapSummary,
};
use crate::config::CONFIG_FILE_NAME;
use crate::core::transform::RewriteMode;
use crate::issues::{Issue, Report, Severity};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

/// Print issues to a custom writer.
///
/// Parse failures are folded into a one-line warning unless `verbose`.
pub fn report_to<W: Write>(issues: &[Issue], verbose: bool, writer: &mut W) {
    let shown: Vec<&Issue> = issues
        .iter()
        .filter(|i| verbose || !matches!(i, Issue::ParseError(_)))
        .collect();

    for issue in &shown {
        print_issue(issue, writer);
    }

    print_summary(&shown, writer);
}

/// Print a parse warning to a custom writer.
pub fn print_parse_warning_to<W: Write>(count: usize, verbose: bool, writer: &mut W) {
    if count > 0 && !verbose {
        let _ = writeln!(
            writer,
            "{} {} file(s) could not be parsed (use {} for details)",
            "warning:".bold().yellow(),
            count,
            "-v".cyan()
        );
    }
}

pub fn print(result: &CommandResult, verbose: bool) {
    {
        let mut stderr = io::stderr().lock();
        report_to(&result.issues, verbose, &mut stderr);
        print_parse_warning_to(result.parse_error_count, verbose, &mut stderr);
    }

    let mut stdout = io::stdout().lock();
    match &result.summary {
        CommandSummary::Extract(summary) => print_extract(summary, &mut stdout),
        CommandSummary::Wrap(summary) => print_wrap(summary, &mut stdout),
        CommandSummary::Graph(summary) => print_graph(summary, &mut stdout),
        CommandSummary::Init(summary) => print_init(summary),
    }
}

// ============================================================
// Internal Functions
// ============================================================

fn print_issue<W: Write>(issue: &Issue, writer: &mut W) {
    let severity_str = match issue.report_severity() {
        Severity::Error => "error".bold().red(),
        Severity::Warning => "warning".bold().yellow(),
    };

    let _ = writeln!(
        writer,
        "{}: \"{}\"  {}",
        severity_str,
        issue.message(),
        issue.report_rule().to_string().dimmed().cyan()
    );
    let _ = writeln!(writer, "  {} {}", "-->".blue(), issue.file_path());

    if let Some(details) = issue.details() {
        let _ = writeln!(writer, "  {} {} {}", "=".blue(), "note:".bold(), details);
    }

    let _ = writeln!(writer);
}

fn print_summary<W: Write>(issues: &[&Issue], writer: &mut W) {
    let total_errors = issues
        .iter()
        .filter(|i| i.report_severity() == Severity::Error)
        .count();
    let total_warnings = issues.len() - total_errors;

    if !issues.is_empty() {
        let _ = writeln!(
            writer,
            "{} {} problems ({} {}, {} {})",
            FAILURE_MARK.red(),
            issues.len(),
            total_errors,
            if total_errors == 1 { "error" } else { "errors" }.red(),
            total_warnings,
            if total_warnings == 1 {
                "warning"
            } else {
                "warnings"
            }
            .yellow()
        );
    }
}

fn print_extract<W: Write>(summary: &ExtractSummary, writer: &mut W) {
    match &summary.output {
        ExtractOutput::Stdout(json) => {
            let _ = writeln!(writer, "{}", json);
        }
        ExtractOutput::File(path) => {
            let _ = writeln!(
                writer,
                "{} {}",
                SUCCESS_MARK.green(),
                format!(
                    "Extracted {} candidate(s) to {}",
                    summary.candidate_count,
                    path.display()
                )
                .green()
            );
        }
    }
}

fn print_changed_files<W: Write>(files: &[ChangedFile], writer: &mut W) {
    let width = files
        .iter()
        .map(|f| UnicodeWidthStr::width(f.path.as_str()))
        .max()
        .unwrap_or(0);

    for file in files {
        let padding = width - UnicodeWidthStr::width(file.path.as_str());
        let side = if file.is_client { "client" } else { "server" };
        let _ = writeln!(
            writer,
            "  {}{:padding$}  {:>3}  {}",
            file.path,
            "",
            file.strings_wrapped,
            side.dimmed(),
            padding = padding
        );
    }
}

fn print_wrap<W: Write>(summary: &WrapSummary, writer: &mut W) {
    let totals = &summary.totals;

    if summary.changed.is_empty() {
        let _ = writeln!(
            writer,
            "{} {}",
            SUCCESS_MARK.green(),
            format!(
                "Checked {} file(s) - nothing to rewrite",
                totals.files_processed
            )
            .green()
        );
        return;
    }

    if summary.is_apply {
        let _ = writeln!(
            writer,
            "{} {} string(s) in {} file(s):",
            "Rewrote".green().bold(),
            totals.strings_wrapped,
            summary.written
        );
    } else {
        let _ = writeln!(
            writer,
            "{} {} string(s) in {} file(s):",
            "Would rewrite".yellow().bold(),
            totals.strings_wrapped,
            summary.changed.len()
        );
    }
    print_changed_files(&summary.changed, writer);

    if summary.mode == RewriteMode::Keys && !totals.client_namespaces.is_empty() {
        let namespaces: Vec<&str> = totals.client_namespaces.iter().map(String::as_str).collect();
        let _ = writeln!(
            writer,
            "{} {}",
            "Client namespaces:".bold(),
            namespaces.join(", ")
        );
    }

    if !summary.is_apply {
        let _ = writeln!(writer, "Run with {} to write these changes.", "--apply".cyan());
    }
}

fn role_label(role: FileRole) -> &'static str {
    match role {
        FileRole::ClientRoot => "root",
        FileRole::ClientReachable => "client",
        FileRole::Server => "server",
        FileRole::Unparseable => "skipped",
    }
}

fn print_graph<W: Write>(summary: &GraphSummary, writer: &mut W) {
    for (path, role) in &summary.files {
        let label = format!("{:<7}", role_label(*role));
        let label = match role {
            FileRole::ClientRoot | FileRole::ClientReachable => label.cyan(),
            FileRole::Server => label.normal(),
            FileRole::Unparseable => label.dimmed(),
        };
        let _ = writeln!(writer, "{} {}", label, path);
    }

    let _ = writeln!(
        writer,
        "{} {} file(s): {} client root(s), {} client, {} server",
        SUCCESS_MARK.green(),
        summary.files.len(),
        summary.count(FileRole::ClientRoot),
        summary.count(FileRole::ClientReachable),
        summary.count(FileRole::Server)
    );
}

fn print_init(summary: &InitSummary) {
    if summary.created {
        println!(
            "{} {}",
            SUCCESS_MARK.green(),
            format!("Created {}", CONFIG_FILE_NAME).green()
        );
    } else if let Some(error) = &summary.error {
        eprintln!("{} {}", "error:".bold().red(), error);
    }
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::core::codegen::CodegenSummary;
    use crate::issues::{InvalidOutputIssue, ParseErrorIssue};

    fn render<F: FnOnce(&mut Vec<u8>)>(f: F) -> String {
        colored::control::set_override(false);
        let mut output = Vec::new();
        f(&mut output);
        String::from_utf8(output).unwrap()
    }

    fn issues() -> Vec<Issue> {
        vec![
            Issue::InvalidOutput(InvalidOutputIssue {
                file_path: "src/a.tsx".to_string(),
                error: "Overlapping edits at byte 12".to_string(),
            }),
            Issue::ParseError(ParseErrorIssue {
                file_path: "src/broken.tsx".to_string(),
                error: "Unexpected token".to_string(),
            }),
        ]
    }

    #[test]
    fn test_report_empty() {
        let output = render(|w| report_to(&[], false, w));
        assert!(output.is_empty());
    }

    #[test]
    fn test_report_hides_parse_errors_unless_verbose() {
        let output = render(|w| report_to(&issues(), false, w));
        assert!(output.contains("error: \"Overlapping edits at byte 12\"  invalid-output"));
        assert!(output.contains("  --> src/a.tsx"));
        assert!(output.contains("  = note: original file kept"));
        assert!(!output.contains("src/broken.tsx"));
        assert!(output.contains("1 problems (1 error, 0 warnings)"));

        let output = render(|w| report_to(&issues(), true, w));
        assert!(output.contains("warning: \"Unexpected token\"  parse-error"));
        assert!(output.contains("2 problems (1 error, 1 warning)"));
    }

    #[test]
    fn test_parse_warning() {
        let output = render(|w| print_parse_warning_to(2, false, w));
        assert!(output.contains("2 file(s) could not be parsed"));
        assert!(render(|w| print_parse_warning_to(2, true, w)).is_empty());
    }

    #[test]
    fn test_wrap_dry_run_lists_files_aligned() {
        let summary = WrapSummary {
            mode: RewriteMode::Keys,
            totals: CodegenSummary {
                files_processed: 3,
                files_modified: 2,
                files_skipped: 0,
                strings_wrapped: 4,
                client_namespaces: BTreeSet::from(["nav".to_string()]),
            },
            changed: vec![
                ChangedFile {
                    path: "app/page.tsx".to_string(),
                    strings_wrapped: 3,
                    is_client: false,
                },
                ChangedFile {
                    path: "components/Nav.tsx".to_string(),
                    strings_wrapped: 1,
                    is_client: true,
                },
            ],
            is_apply: false,
            written: 0,
        };
        let output = render(|w| print_wrap(&summary, w));
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "Would rewrite 4 string(s) in 2 file(s):");
        assert_eq!(lines[1], "  app/page.tsx          3  server");
        assert_eq!(lines[2], "  components/Nav.tsx    1  client");
        assert_eq!(lines[3], "Client namespaces: nav");
        assert_eq!(lines[4], "Run with --apply to write these changes.");
    }

    #[test]
    fn test_graph_output() {
        let summary = GraphSummary {
            files: vec![
                ("a.tsx".to_string(), FileRole::ClientRoot),
                ("b.tsx".to_string(), FileRole::Server),
            ],
        };
        let output = render(|w| print_graph(&summary, w));
        assert!(output.contains("root    a.tsx"));
        assert!(output.contains("server  b.tsx"));
        assert!(output.contains("2 file(s): 1 client root(s), 0 client, 1 server"));
    }
}
