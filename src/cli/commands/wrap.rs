use anyhow::Result;

use super::super::args::WrapCommand;
use super::helper::finish;
use super::{ChangedFile, CommandResult, CommandSummary, WrapSummary};
use crate::core::{codegen::write_outputs, context::PipelineContext, keys::TextToKeyMap};

pub fn wrap(cmd: WrapCommand) -> Result<CommandResult> {
    let mut ctx = PipelineContext::new(&cmd.common)?;
    if let Some(mode) = cmd.mode {
        ctx.config.mode = mode.into();
    }
    ctx.config.module_factory |= cmd.module_factory;
    ctx.config.validate()?;

    let key_map = match &cmd.keys {
        Some(path) => TextToKeyMap::load(path)?,
        None => ctx.load_key_map()?,
    };
    tracing::debug!("{} key(s) loaded", key_map.len());

    let report = ctx
        .codegen()
        .on_progress(|done, total| tracing::debug!("[{}/{}] files rewritten", done, total))
        .run(&ctx.files, &key_map)?;

    let written = if cmd.apply {
        write_outputs(&report)?
    } else {
        0
    };

    let changed = report
        .files
        .iter()
        .filter(|outcome| outcome.is_modified())
        .map(|outcome| ChangedFile {
            path: outcome.display.clone(),
            strings_wrapped: outcome.strings_wrapped,
            is_client: outcome.is_client,
        })
        .collect();

    Ok(finish(
        CommandSummary::Wrap(WrapSummary {
            mode: ctx.config.mode,
            totals: report.summary,
            changed,
            is_apply: cmd.apply,
            written,
        }),
        report.issues,
        ctx.files.len(),
        true,
    ))
}
