use anyhow::Result;

use super::super::args::GraphCommand;
use super::helper::finish;
use super::{CommandResult, CommandSummary, FileRole, GraphSummary};
use crate::core::{context::PipelineContext, graph::FileClassification};

fn role_of(classification: &FileClassification) -> FileRole {
    if !classification.is_parseable {
        FileRole::Unparseable
    } else if classification.is_client_root {
        FileRole::ClientRoot
    } else if classification.is_client_reachable {
        FileRole::ClientReachable
    } else {
        FileRole::Server
    }
}

pub fn graph(cmd: GraphCommand) -> Result<CommandResult> {
    let ctx = PipelineContext::new(&cmd.common)?;
    let report = ctx.codegen().graph(&ctx.files)?;

    let files = report
        .files
        .into_iter()
        .zip(report.classifications.iter().map(role_of))
        .collect();

    Ok(finish(
        CommandSummary::Graph(GraphSummary { files }),
        report.issues,
        ctx.files.len(),
        true,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_of() {
        let mut c = FileClassification {
            is_parseable: true,
            is_client_root: false,
            is_client_reachable: true,
            import_targets: Vec::new(),
        };
        assert_eq!(role_of(&c), FileRole::ClientReachable);
        c.is_client_root = true;
        assert_eq!(role_of(&c), FileRole::ClientRoot);
        c.is_parseable = false;
        assert_eq!(role_of(&c), FileRole::Unparseable);
    }
}
