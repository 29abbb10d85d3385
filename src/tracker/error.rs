use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("tracker already running")]
    AlreadyRunning,
    #[error("tracker not running")]
    NotRunning,
    #[error("feed transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("feed returned HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("feed returned an empty payload")]
    EmptyPayload,
}
