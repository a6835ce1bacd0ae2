//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `extract`: List translatable string candidates as JSON
//! - `wrap`: Rewrite source files into translation lookups
//! - `graph`: Show which files run on the client
//! - `init`: Create a default configuration file

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};

use crate::core::transform::RewriteMode;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    /// Get the verbose flag from the command's common args.
    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Extract(cmd)) => cmd.common.verbose,
            Some(Command::Wrap(cmd)) => cmd.common.verbose,
            Some(Command::Graph(cmd)) => cmd.common.verbose,
            Some(Command::Init) | None => false,
        }
    }
}

/// Common arguments shared by all commands.
#[derive(Debug, Clone, Default, Args)]
pub struct CommonArgs {
    /// Source code root directory (overrides config file)
    #[arg(long)]
    pub source_root: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct ExtractCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Write the candidates to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// `t("key")` lookups through the i18n runtime
    Keys,
    /// `<T id="key">text</T>` wrapping through a local component
    Inline,
}

impl From<ModeArg> for RewriteMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Keys => RewriteMode::Keys,
            ModeArg::Inline => RewriteMode::Inline,
        }
    }
}

#[derive(Debug, Args)]
pub struct WrapCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Text-to-key map (overrides config file)
    #[arg(long, value_name = "FILE")]
    pub keys: Option<PathBuf>,

    /// Rewrite mode (overrides config file)
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Turn exported constants with translatable strings into factories
    #[arg(long)]
    pub module_factory: bool,

    /// Write the rewritten files (default is a dry run)
    #[arg(long)]
    pub apply: bool,
}

#[derive(Debug, Args)]
pub struct GraphCommand {
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract translatable string candidates
    Extract(ExtractCommand),
    /// Rewrite strings into translation lookups
    Wrap(WrapCommand),
    /// Classify files as client or server
    Graph(GraphCommand),
    /// Initialize a configuration file
    Init,
}
