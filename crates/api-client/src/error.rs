/// Failure of one API call. Every variant is terminal for that call; nothing
/// is retried.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Connection, TLS, timeout or other transport failure.
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx status. `message` is taken from the JSON error body when one
    /// could be parsed, else a generic text.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// 2xx response whose body is not the JSON we expected.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::Malformed(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
