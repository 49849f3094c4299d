#[derive(Debug, thiserror::Error)]
pub enum SeedlinkError {
    #[error("invalid command: {0}")]
    InvalidCommand(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("expected ERROR, got {token:?} in {line:?}")]
    UnexpectedReply { token: String, line: String },

    #[error("unknown error type: {0:?}")]
    UnknownErrorType(String),
}

pub type Result<T> = std::result::Result<T, SeedlinkError>;
