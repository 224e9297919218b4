use thiserror::Error;

pub type PilotResult<T> = Result<T, PilotError>;

#[derive(Error, Debug)]
pub enum PilotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid campaign status: {0}, must be ACTIVE, PAUSED, DELETED, or ARCHIVED")]
    InvalidStatus(String),
}
