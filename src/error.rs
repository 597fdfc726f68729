use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures at the edges of the crate. Formula evaluation itself never fails;
/// these cover request parsing, puzzle content and stats persistence.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown calculator '{0}'")]
    UnknownCalculator(String),

    #[error("invalid {context} payload: {source}")]
    InvalidPayload {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid puzzle '{title}': {reason}")]
    InvalidPuzzle { title: String, reason: String },

    #[error("unknown difficulty '{0}'")]
    UnknownDifficulty(String),

    #[error("crossword session {0} not found")]
    SessionNotFound(u64),

    #[error("cell ({row}, {col}) is not an open cell")]
    InvalidCell { row: usize, col: usize },

    #[error("'{0}' is not a letter")]
    InvalidLetter(char),

    #[error("puzzle is already solved; start a new one to keep playing")]
    AlreadySolved,

    #[error("stats file {path}: {source}")]
    StatsIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Server(#[source] std::io::Error),

    #[error("stats file {path} is not valid JSON: {source}")]
    StatsFormat {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    pub fn invalid_payload(context: &'static str, source: serde_json::Error) -> Self {
        Error::InvalidPayload { context, source }
    }

    pub fn invalid_puzzle(title: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidPuzzle {
            title: title.into(),
            reason: reason.into(),
        }
    }

    /// True for errors caused by the caller's request rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::UnknownCalculator(_)
                | Error::InvalidPayload { .. }
                | Error::UnknownDifficulty(_)
                | Error::InvalidCell { .. }
                | Error::InvalidLetter(_)
                | Error::AlreadySolved
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::SessionNotFound(_))
    }
}
