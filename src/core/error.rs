//! File-scoped failures of the pipeline.
//!
//! None of these abort a run: the orchestrator turns them into issues and
//! leaves the file untouched.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("failed to parse {path}: {message}")]
    ParseFailure { path: String, message: String },

    #[error("generated output for {path} does not parse: {message}")]
    InvalidOutputAfterTransform { path: String, message: String },

    #[error("overlapping edits in {path} at byte {offset}")]
    EditConflict { path: String, offset: usize },

    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FileError {
    pub fn path(&self) -> String {
        match self {
            FileError::ParseFailure { path, .. }
            | FileError::InvalidOutputAfterTransform { path, .. }
            | FileError::EditConflict { path, .. } => path.clone(),
            FileError::Read { path, .. } | FileError::Write { path, .. } => {
                path.display().to_string()
            }
        }
    }
}
