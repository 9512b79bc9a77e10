use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Application-wide error type. Every variant is terminal for the run; none
/// are retried or recovered locally.
#[derive(Debug, Error)]
pub enum SplitError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("input file not found: {}", .0.display())]
    Path(PathBuf),

    #[error("invalid input: {0}")]
    Format(String),

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}
