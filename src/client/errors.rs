use thiserror::Error;

/// Errors surfaced by stores and HTTP helpers.
///
/// Every asynchronous store operation resolves to one of these rather than
/// letting a transport failure escape, so views can always render a message.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("{0}")]
    Validation(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Timeout: {0}")]
    Timeout(String),
    #[error("Request failed ({status}): {message}")]
    Http { status: u16, message: String },
    #[error("Response error: {0}")]
    Parse(String),
    #[error("Request error: {0}")]
    Serialization(String),
    #[error("{0}")]
    Busy(String),
    /// Decline or failure reported by the payment processor, shown verbatim.
    #[error("{0}")]
    Payment(String),
}

impl AppError {
    /// Expired or invalid credentials.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Http { status: 401, .. })
    }

    /// Role-gated action denied by the backend.
    #[must_use]
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Http { status: 403, .. })
    }

    /// Errors the user can act on (bad input, bad credentials, denied access).
    /// Everything else is unexpected and gets a generic message.
    #[must_use]
    pub fn is_user_facing(&self) -> bool {
        match self {
            Self::Validation(_) | Self::Busy(_) | Self::Payment(_) => true,
            Self::Http { status, .. } => (400..500).contains(status),
            _ => false,
        }
    }

    /// Text a view should display for this error.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Validation(message) | Self::Busy(message) | Self::Payment(message) => {
                message.clone()
            }
            Self::Http { message, .. } if self.is_user_facing() => message.clone(),
            Self::Timeout(_) => "Request timed out. Please try again.".to_string(),
            _ => fallback.to_string(),
        }
    }

    /// Like `user_message`, but an HTTP error shows the backend's text
    /// whatever its status.
    #[must_use]
    pub fn backend_message(&self, fallback: &str) -> String {
        match self {
            Self::Http { message, .. } => message.clone(),
            _ => self.user_message(fallback),
        }
    }
}
