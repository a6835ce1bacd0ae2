use anyhow::Result;

use super::{
    args::{Arguments, Command},
    commands::{CommandResult, extract::extract, graph::graph, init::init, wrap::wrap},
};

/// Dispatches to the command handler.
///
/// File-scoped problems are part of the returned [`CommandResult`]; an `Err`
/// means the command could not run at all (bad config, unreadable key map).
pub fn run(Arguments { command }: Arguments) -> Result<CommandResult> {
    match command {
        Some(Command::Extract(cmd)) => extract(cmd),
        Some(Command::Wrap(cmd)) => wrap(cmd),
        Some(Command::Graph(cmd)) => graph(cmd),
        Some(Command::Init) => init(),
        None => {
            anyhow::bail!("No command provided. Use --help to see available commands.")
        }
    }
}
