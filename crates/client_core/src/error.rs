use std::path::PathBuf;

use shared::protocol::ProtocolError;
use thiserror::Error;

/// Anything that kept a submission from producing a decodable backend answer.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to translation backend failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("failed to read video file {path}: {source}")]
    ReadSource {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("undecodable response from translation backend (status {status}): {source}")]
    Decode {
        status: u16,
        source: serde_json::Error,
    },
    #[error("translation backend answered with status {0}")]
    UnexpectedStatus(u16),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("invalid output video name '{0}'")]
    InvalidOutputName(String),
    #[error("failed to write downloaded video: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no video source selected")]
    MissingSource,
    #[error("no target language selected")]
    MissingLanguage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("a submission is already in flight")]
    AlreadyInFlight,
}
