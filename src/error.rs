use std::path::PathBuf;
use thiserror::Error;

use crate::version::ParseVersionError;

#[derive(Debug, Error)]
pub enum IncrError {
    #[error("{0}")]
    FileNotFound(String),
    #[error(transparent)]
    ParseError(#[from] ParseVersionError),
    #[error("Unable to {action} {path:?} as {encoding}")]
    EncodingError {
        action: &'static str,
        path: PathBuf,
        encoding: &'static str,
    },
    #[error("Unknown encoding: {0}")]
    UnknownEncoding(String),
    #[error("No valid version was found in {0:?}")]
    NoVersionFound(PathBuf),
    #[error(
        "File={0} was modified, but has not been staged to be committed - please `git add` or `git checkout` this file to proceed"
    )]
    UnstagedChanges(String),
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),
    #[error("Unable to inspect the current process: {0}")]
    Process(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
