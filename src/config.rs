use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Ok, Result, bail};
use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::core::transform::RewriteMode;

pub const CONFIG_FILE_NAME: &str = ".tolkrc.json";

pub const TEST_FILE_PATTERNS: &[&str] = &[
    "**/*.test.tsx",
    "**/*.test.ts",
    "**/*.test.jsx",
    "**/*.test.js",
    "**/*.spec.tsx",
    "**/*.spec.ts",
    "**/*.spec.jsx",
    "**/*.spec.js",
    "**/__tests__/**",
];

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_includes")]
    pub includes: Vec<String>,
    #[serde(default)]
    pub ignores: Vec<String>,
    #[serde(default = "default_ignore_test_files")]
    pub ignore_test_files: bool,
    /// Extra attribute / property names treated as user-visible text.
    #[serde(default)]
    pub translatable_props: Vec<String>,
    #[serde(default = "default_i18n_import")]
    pub i18n_import: String,
    #[serde(default)]
    pub mode: RewriteMode,
    #[serde(default = "default_component_path")]
    pub component_path: String,
    #[serde(default)]
    pub module_factory: bool,
    #[serde(default = "default_tsconfig")]
    pub tsconfig: String,
    #[serde(default = "default_keys_file")]
    pub keys_file: String,
    #[serde(default = "default_source_root")]
    pub source_root: String,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_includes() -> Vec<String> {
    ["src", "app", "components"].map(String::from).to_vec()
}

fn default_ignore_test_files() -> bool {
    true
}

fn default_i18n_import() -> String {
    "next-intl".to_string()
}

fn default_component_path() -> String {
    "@/components/i18n".to_string()
}

fn default_tsconfig() -> String {
    "tsconfig.json".to_string()
}

fn default_keys_file() -> String {
    "./tolk.keys.json".to_string()
}

fn default_source_root() -> String {
    "./".to_string()
}

fn default_concurrency() -> usize {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            includes: default_includes(),
            ignores: Vec::new(),
            ignore_test_files: default_ignore_test_files(),
            translatable_props: Vec::new(),
            i18n_import: default_i18n_import(),
            mode: RewriteMode::default(),
            component_path: default_component_path(),
            module_factory: false,
            tsconfig: default_tsconfig(),
            keys_file: default_keys_file(),
            source_root: default_source_root(),
            concurrency: default_concurrency(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Rejects invalid glob patterns, a zero worker count and an inline mode
    /// without a component path.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.ignores {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'ignores': \"{}\"", pattern))?;
        }

        // Patterns without wildcards are literal directories, so app/[locale] stays valid.
        for pattern in &self.includes {
            if pattern.contains('*') || pattern.contains('?') {
                Pattern::new(pattern).with_context(|| {
                    format!("Invalid glob pattern in 'includes': \"{}\"", pattern)
                })?;
            }
        }

        if self.concurrency == 0 {
            bail!("'concurrency' must be greater than 0");
        }

        if self.mode == RewriteMode::Inline && self.component_path.trim().is_empty() {
            bail!("'componentPath' is required when 'mode' is \"inline\"");
        }

        if self.i18n_import.trim().is_empty() {
            bail!("'i18nImport' must not be empty");
        }

        Ok(())
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            Ok(ConfigLoadResult {
                config,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
        }),
    }
}

#[cfg(test)]
mod tests {
    use crate::config::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.ignores.is_empty());
        assert_eq!(config.includes, vec!["src", "app", "components"]);
        assert_eq!(config.i18n_import, "next-intl");
        assert_eq!(config.mode, RewriteMode::Keys);
        assert_eq!(config.concurrency, 10);
        assert!(!config.module_factory);
    }

    #[test]
    fn test_parse_config() {
        let json = r#"{
              "ignores": ["**/dist/**"],
              "includes": ["src/**"],
              "translatableProps": ["tagline"],
              "mode": "inline",
              "moduleFactory": true
          }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.ignores, vec!["**/dist/**"]);
        assert_eq!(config.includes, vec!["src/**"]);
        assert_eq!(config.translatable_props, vec!["tagline"]);
        assert_eq!(config.mode, RewriteMode::Inline);
        assert!(config.module_factory);
    }

    #[test]
    fn test_find_config_file() {
        let dir = tempdir().unwrap();
        let sub_dir = dir.path().join("src").join("components");
        fs::create_dir_all(&sub_dir).unwrap();

        let config_path = dir.path().join(CONFIG_FILE_NAME);
        File::create(&config_path).unwrap();

        let found = find_config_file(&sub_dir);
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_stops_at_git_root() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();

        assert!(find_config_file(dir.path()).is_none());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let json = r#"{ "i18nImport": "@acme/intl" }"#;
        let config: Config = serde_json::from_str(json).unwrap();

        assert_eq!(config.i18n_import, "@acme/intl");
        assert_eq!(config.includes, default_includes());
        assert_eq!(config.component_path, "@/components/i18n");
        assert_eq!(config.keys_file, "./tolk.keys.json");
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{ "ignores": ["**/legacy/**"] }"#,
        )
        .unwrap();

        let result = load_config(dir.path()).unwrap();
        assert!(result.from_file);
        assert_eq!(result.config.ignores, vec!["**/legacy/**"]);
    }

    #[test]
    fn test_load_config_default_when_not_found() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();

        let result = load_config(dir.path()).unwrap();
        assert!(!result.from_file);
        assert_eq!(result.config.includes, default_includes());
    }

    #[test]
    fn test_validate_invalid_ignore_pattern() {
        let config = Config {
            ignores: vec!["[invalid".to_string()],
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("ignores"));
    }

    #[test]
    fn test_validate_literal_locale_include_is_valid() {
        let config = Config {
            includes: vec!["app/[locale]".to_string()],
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let config = Config {
            concurrency: 0,
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("concurrency"));
    }

    #[test]
    fn test_validate_inline_requires_component_path() {
        let config = Config {
            mode: RewriteMode::Inline,
            component_path: "  ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("componentPath"));
    }

    #[test]
    fn test_load_config_with_invalid_pattern_fails() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), r#"{ "ignores": ["[invalid"] }"#).unwrap();

        assert!(load_config(dir.path()).is_err());
    }

    #[test]
    fn test_default_json_round_trips() {
        let json = default_config_json().unwrap();
        assert!(json.contains("\"i18nImport\": \"next-intl\""));
        assert!(json.contains("\"mode\": \"keys\""));
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.keys_file, "./tolk.keys.json");
    }
}
