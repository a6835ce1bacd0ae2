//! Source parsers.
//!
//! - `jsx`: JSX/TSX/JS/TS source files (swc AST plus span-addressable text)
//! - `jsonc`: JSON-with-comments, as used by `tsconfig.json`

pub mod jsonc;
pub mod jsx;
