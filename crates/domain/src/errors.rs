use crate::dns_message::DnsResponse;
use thiserror::Error;

/// Failure kinds observed while serving a datagram.
///
/// The set is closed: the request pipeline matches it exhaustively to decide
/// whether a failure is reported, swallowed, or answered with a fallback
/// response.
#[derive(Error, Debug, Clone)]
pub enum DomainError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed DNS message: {0}")]
    Parse(String),

    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    #[error("Socket has been released")]
    ResourceDisposed,

    #[error("Resolution failed: {reason}")]
    ResolutionFailure {
        reason: String,
        /// Reply to send despite the failure. `None` means the caller should
        /// synthesize a default response from the original request.
        response: Option<Box<DnsResponse>>,
    },
}

impl DomainError {
    pub fn resolution_failure(reason: impl Into<String>) -> Self {
        Self::ResolutionFailure {
            reason: reason.into(),
            response: None,
        }
    }

    pub fn resolution_failure_with(reason: impl Into<String>, response: DnsResponse) -> Self {
        Self::ResolutionFailure {
            reason: reason.into(),
            response: Some(Box::new(response)),
        }
    }

    /// Raised by operations on a socket that was released during shutdown.
    pub fn is_benign(&self) -> bool {
        matches!(self, Self::ResourceDisposed)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Parse(_) => "parse",
            Self::Cancelled(_) => "cancelled",
            Self::ResourceDisposed => "resource_disposed",
            Self::ResolutionFailure { .. } => "resolution_failure",
        }
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
