use std::fmt;

use thiserror::Error;
use uuid::Uuid;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

// Errors surfaced to whoever drives a session (CLI, UI layer).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String), // Caller broke a precondition. Never retried.

    #[error("AI error: {0}")]
    AI(#[from] AIError), // Anything that went wrong talking to an upstream.

    #[error("No analysis has been generated for this session")]
    NoAnalysis,

    #[error("Result discarded: the session was reset while the operation was in flight")]
    Superseded,

    #[error("Unknown session: {0}")]
    UnknownSession(Uuid),

    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),

    #[error("Logger error: {0}")]
    Logger(#[from] log::SetLoggerError),
}

impl AppError {
    pub fn invalid(message: impl Into<String>) -> Self {
        AppError::InvalidInput(message.into())
    }
}

// The external service a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    TextGeneration,
    Embedding,
    GameData,
}

impl fmt::Display for Upstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Upstream::TextGeneration => "text-generation backend",
            Upstream::Embedding => "embedding backend",
            Upstream::GameData => "game-data service",
        };
        f.write_str(name)
    }
}

// Upstream failure taxonomy.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AIError {
    #[error("No credential configured for the {0}")]
    MissingCredential(Upstream),

    #[error("The {upstream} is unavailable: {reason}")]
    UpstreamUnavailable {
        upstream: Upstream,
        reason: String,
        transient: bool, // Timeouts, connection drops, 429 and 5xx.
    },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Embedding backend unavailable: no credential configured")]
    EmbeddingBackendUnavailable,
}

impl AIError {
    pub fn unavailable(upstream: Upstream, reason: impl Into<String>, transient: bool) -> Self {
        AIError::UpstreamUnavailable {
            upstream,
            reason: reason.into(),
            transient,
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        AIError::MalformedResponse(reason.into())
    }

    /// Whether a retry has a chance of succeeding.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AIError::UpstreamUnavailable {
                transient: true,
                ..
            }
        )
    }

    /// True for the "not configured" family, on either backend.
    pub fn is_missing_credential(&self) -> bool {
        matches!(
            self,
            AIError::MissingCredential(_) | AIError::EmbeddingBackendUnavailable
        )
    }
}
