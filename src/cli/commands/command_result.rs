use std::path::PathBuf;

use crate::core::{codegen::CodegenSummary, transform::RewriteMode};
use crate::issues::Issue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Extract,
    Wrap,
    Graph,
    Init,
}

#[derive(Debug)]
pub enum CommandSummary {
    Extract(ExtractSummary),
    Wrap(WrapSummary),
    Graph(GraphSummary),
    Init(InitSummary),
}

impl CommandSummary {
    pub fn kind(&self) -> CommandKind {
        match self {
            CommandSummary::Extract(_) => CommandKind::Extract,
            CommandSummary::Wrap(_) => CommandKind::Wrap,
            CommandSummary::Graph(_) => CommandKind::Graph,
            CommandSummary::Init(_) => CommandKind::Init,
        }
    }
}

/// Where the candidate list went.
#[derive(Debug)]
pub enum ExtractOutput {
    /// Printed by the reporter.
    Stdout(String),
    File(PathBuf),
}

#[derive(Debug)]
pub struct ExtractSummary {
    pub candidate_count: usize,
    pub output: ExtractOutput,
}

#[derive(Debug)]
pub struct ChangedFile {
    pub path: String,
    pub strings_wrapped: usize,
    pub is_client: bool,
}

#[derive(Debug)]
pub struct WrapSummary {
    pub mode: RewriteMode,
    pub totals: CodegenSummary,
    pub changed: Vec<ChangedFile>,
    pub is_apply: bool,
    /// Files written to disk; always 0 on a dry run.
    pub written: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRole {
    ClientRoot,
    ClientReachable,
    Server,
    Unparseable,
}

#[derive(Debug)]
pub struct GraphSummary {
    pub files: Vec<(String, FileRole)>,
}

impl GraphSummary {
    pub fn count(&self, role: FileRole) -> usize {
        self.files.iter().filter(|(_, r)| *r == role).count()
    }
}

#[derive(Debug)]
pub struct InitSummary {
    pub created: bool,
    pub error: Option<String>,
}

/// Result of running a tolk command.
pub struct CommandResult {
    pub summary: CommandSummary,
    pub error_count: usize,
    pub warning_count: usize,
    /// If true, exit code 1 should be returned when error_count > 0.
    pub exit_on_errors: bool,
    /// File-scoped problems found during the run, sorted.
    pub issues: Vec<Issue>,
    /// Number of files that failed to read or parse.
    pub parse_error_count: usize,
    pub files_processed: usize,
}

impl CommandResult {
    pub fn kind(&self) -> CommandKind {
        self.summary.kind()
    }
}
