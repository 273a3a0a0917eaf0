use crate::adb::AdbError;
use crate::locate::{CandidatePoint, LocateError};
use std::path::PathBuf;
use thiserror::Error;

pub type AutomationResult<T> = Result<T, AutomationError>;

#[derive(Debug, Error)]
pub enum AutomationError {
    #[error(transparent)]
    Adb(#[from] AdbError),

    #[error(transparent)]
    Locate(#[from] LocateError),

    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{} not found on screen", .template.display())]
    NoMatch { template: PathBuf },

    #[error("{count} matches on screen, refusing to guess which to tap: {points:?}")]
    AmbiguousMatch {
        count: usize,
        points: Vec<CandidatePoint>,
    },

    #[error("Locate task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
