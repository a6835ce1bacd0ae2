use super::{CommandResult, CommandSummary};
use crate::issues::{Issue, Severity};

pub fn finish(
    summary: CommandSummary,
    mut issues: Vec<Issue>,
    files_processed: usize,
    exit_on_errors: bool,
) -> CommandResult {
    issues.sort();

    let parse_error_count = issues
        .iter()
        .filter(|i| matches!(i, Issue::ParseError(_)))
        .count();

    let mut error_count = issues
        .iter()
        .filter(|i| i.severity() == Severity::Error)
        .count();

    let warning_count = issues
        .iter()
        .filter(|i| i.severity() == Severity::Warning)
        .count();

    if let CommandSummary::Init(ref summary) = summary
        && summary.error.is_some()
    {
        error_count += 1;
    }

    CommandResult {
        summary,
        error_count,
        warning_count,
        exit_on_errors,
        issues,
        parse_error_count,
        files_processed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::InitSummary;
    use crate::issues::{InvalidOutputIssue, ParseErrorIssue, Report};

    #[test]
    fn test_finish_counts() {
        let issues = vec![
            Issue::ParseError(ParseErrorIssue {
                file_path: "b.tsx".to_string(),
                error: "Unexpected token".to_string(),
            }),
            Issue::InvalidOutput(InvalidOutputIssue {
                file_path: "a.tsx".to_string(),
                error: "Overlapping edits".to_string(),
            }),
        ];
        let result = finish(
            CommandSummary::Init(InitSummary {
                created: true,
                error: None,
            }),
            issues,
            3,
            true,
        );
        assert_eq!(result.error_count, 1);
        assert_eq!(result.warning_count, 1);
        assert_eq!(result.parse_error_count, 1);
        assert_eq!(result.issues[0].file_path(), "a.tsx");
    }
}
