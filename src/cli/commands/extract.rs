use std::fs;

use anyhow::{Context, Result};

use super::super::args::ExtractCommand;
use super::helper::finish;
use super::{CommandResult, CommandSummary, ExtractOutput, ExtractSummary};
use crate::core::context::PipelineContext;

pub fn extract(cmd: ExtractCommand) -> Result<CommandResult> {
    let ctx = PipelineContext::new(&cmd.common)?;
    let report = ctx.codegen().extract(&ctx.files)?;

    let json =
        serde_json::to_string_pretty(&report.strings).context("Failed to serialize candidates")?;
    let output = match cmd.output {
        Some(path) => {
            fs::write(&path, json + "\n")
                .with_context(|| format!("Failed to write {}", path.display()))?;
            ExtractOutput::File(path)
        }
        None => ExtractOutput::Stdout(json),
    };

    Ok(finish(
        CommandSummary::Extract(ExtractSummary {
            candidate_count: report.strings.len(),
            output,
        }),
        report.issues,
        report.files_processed,
        true,
    ))
}
