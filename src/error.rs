/// Errors that stop the program before or while the terminal is up.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::classify::ClassifyError;
use crate::sim::sequencer::SequenceError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("terminal: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not read config {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("score tables are malformed: {0}")]
    Table(#[from] ClassifyError),

    #[error("screen setup failed: {0}")]
    Sequence(#[from] SequenceError),

    #[error("could not open log file {}: {source}", .path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not start logging: {0}")]
    Log(#[source] Box<dyn std::error::Error + Send + Sync>),
}
