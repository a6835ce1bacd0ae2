//! Tolk - static i18n migration for React and Next.js
//!
//! Tolk finds user-visible strings in JSX/TSX sources and rewrites them into
//! translation lookups, either `t("key")` calls through `next-intl` or
//! `<T id="key">` wrappers through a local component.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer
//! - `config`: Configuration file loading and parsing
//! - `core`: Extraction, client/server graph and rewrite pipeline
//! - `issues`: Issue type definitions and reporting
//! - `utils`: Shared utility functions

pub mod cli;
pub mod config;
pub mod core;
pub mod issues;
pub mod utils;
