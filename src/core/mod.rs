//! Migration engine.
//!
//! ## Pipeline
//!
//! 1. **Load** (`extract`, `graph::client`): parse, collect occurrences and
//!    candidate strings, find direct client roots.
//! 2. **Graph** (`graph`, `factory`): import graph, client closure, module
//!    factory plan.
//! 3. **Rewrite** (`transform`): per-file edits, validated by re-parsing.
//!
//! `codegen` runs the phases over a file set; `context` prepares the inputs
//! from configuration.

pub mod codegen;
pub mod context;
pub mod error;
pub mod extract;
pub mod factory;
pub mod file_scanner;
pub mod graph;
pub mod keys;
pub mod parsers;
pub mod transform;
