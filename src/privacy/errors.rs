//! Error types for consent synchronization.

use std::fmt::{Display, Formatter};

pub const NOT_AUTHENTICATED: &str = "not authenticated via expected flow";
pub const NO_CURRENT_TIER: &str = "no current tier";
pub const OPT_IN_NOT_APPLICABLE: &str = "data collection opt-in only applies to the free tier";

/// Errors returned by tier resolution and the consent store.
///
/// `Display` yields the bare message so the controller can surface it
/// verbatim in `SyncStatus::error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsentError {
    /// Missing identity or malformed response. Needs re-authentication.
    Precondition { message: String },
    /// Any remote failure. `status` is set when an HTTP response was received.
    Transport {
        message: String,
        status: Option<u16>,
    },
}

impl ConsentError {
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition {
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            status: None,
        }
    }

    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            status: Some(status),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Transport {
                status: Some(404),
                ..
            }
        )
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Precondition { message } | Self::Transport { message, .. } => message,
        }
    }
}

impl Display for ConsentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ConsentError {}
