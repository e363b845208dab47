use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReqlogError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("capture error: {0}")]
    Capture(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ReqlogError {
    /// Message suitable for a client-facing response body, without the
    /// variant prefix.
    pub fn reason(&self) -> &str {
        match self {
            Self::InvalidArgument(m)
            | Self::Config(m)
            | Self::Parse(m)
            | Self::NotFound(m)
            | Self::Io(m)
            | Self::Capture(m)
            | Self::Internal(m) => m,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReqlogError>;
