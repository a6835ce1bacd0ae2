use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::{
    cli::args::CommonArgs,
    config::{CONFIG_FILE_NAME, Config, load_config},
    core::{
        codegen::{Codegen, CodegenOptions, display_path},
        file_scanner::scan_files,
        graph::aliases::PathAliases,
        keys::TextToKeyMap,
    },
};

/// Inputs of a run, resolved from configuration and the command line.
///
/// Configuration priority (highest to lowest):
/// 1. CLI arguments
/// 2. `.tolkrc.json`
/// 3. Built-in defaults
pub struct PipelineContext {
    /// Merged configuration. Commands apply their own overrides before
    /// calling [`PipelineContext::codegen`].
    pub config: Config,

    /// Absolute source root; every reported path is relative to it.
    pub root_dir: PathBuf,

    /// Source files in the include set, sorted.
    pub files: Vec<PathBuf>,

    /// Source files under the root outside the include set.
    pub external_files: Vec<PathBuf>,

    pub aliases: PathAliases,

    pub verbose: bool,
}

impl PipelineContext {
    pub fn new(common_args: &CommonArgs) -> Result<Self> {
        let verbose = common_args.verbose;

        // The config is looked up from the CLI root, then its own sourceRoot
        // decides what is scanned.
        let start = common_args
            .source_root
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        let config_result = load_config(&start)?;
        if !config_result.from_file {
            tracing::info!("No {} found, using default configuration", CONFIG_FILE_NAME);
        }
        let config = config_result.config;

        let root_dir = start
            .join(&config.source_root)
            .canonicalize()
            .with_context(|| format!("Source root does not exist: {}", start.display()))?;

        let scan_result = scan_files(
            &root_dir,
            &config.includes,
            &config.ignores,
            config.ignore_test_files,
        );
        if scan_result.skipped_count > 0 {
            tracing::warn!(
                "{} path(s) skipped due to access errors",
                scan_result.skipped_count
            );
        }
        tracing::debug!(
            "{} file(s) in scope, {} outside",
            scan_result.files.len(),
            scan_result.external_files.len()
        );

        let aliases = PathAliases::load(&root_dir, &config.tsconfig);

        Ok(Self {
            config,
            root_dir,
            files: scan_result.files,
            external_files: scan_result.external_files,
            aliases,
            verbose,
        })
    }

    /// Key map location: relative paths are taken from the source root.
    pub fn keys_path(&self) -> PathBuf {
        let path = Path::new(&self.config.keys_file);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root_dir.join(path)
        }
    }

    pub fn load_key_map(&self) -> Result<TextToKeyMap> {
        TextToKeyMap::load(&self.keys_path())
    }

    pub fn display(&self, path: &Path) -> String {
        display_path(path, &self.root_dir)
    }

    pub fn codegen(&self) -> Codegen<'_> {
        Codegen::new(CodegenOptions {
            root: &self.root_dir,
            mode: self.config.mode,
            i18n_import: &self.config.i18n_import,
            component_path: &self.config.component_path,
            translatable_props: &self.config.translatable_props,
            module_factory: self.config.module_factory,
            aliases: &self.aliases,
            external_files: &self.external_files,
            concurrency: self.config.concurrency,
        })
    }
}
