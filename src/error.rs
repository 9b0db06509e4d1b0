// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client error types with consistent user-facing messages.

/// Error type shared by the request pipeline, the resource APIs and the
/// session store.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// No response was received (connection refused, DNS, timeout).
    #[error("Network error: {0}")]
    Network(String),

    /// An authentication endpoint rejected the submitted credentials.
    #[error("{0}")]
    InvalidCredentials(String),

    /// The server rejected the submitted payload.
    #[error("{0}")]
    Validation(String),

    /// The server reported success but the body is missing required data.
    #[error("Invalid response from server: {0}")]
    MalformedResponse(String),

    /// A protected endpoint answered 401; the session has been torn down.
    #[error("Session expired, please log in again")]
    SessionInvalidated,

    /// The persisted credential pair is structurally incomplete.
    #[error("Stored credentials are corrupt: {0}")]
    StorageCorrupt(String),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Session store has not been initialized")]
    NotInitialized,

    /// A login or register exchange is already in flight.
    #[error("Another authentication request is already in progress")]
    SessionBusy,

    /// Any other non-success status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Reading or writing the durable store failed.
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ClientError {
    pub const LOGIN_FAILED: &'static str = "Login failed. Please try again.";
    pub const REQUEST_FAILED: &'static str = "Request failed. Please try again.";

    /// Text a form should show for this error.
    ///
    /// Server-sourced messages are passed through; everything else collapses
    /// to a generic line so transport details never reach the user.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::InvalidCredentials(msg) | ClientError::Validation(msg) => msg.clone(),
            ClientError::Http { message, .. } if !message.is_empty() => message.clone(),
            ClientError::SessionInvalidated => self.to_string(),
            ClientError::SessionBusy => self.to_string(),
            ClientError::NotAuthenticated => "Please log in to continue.".to_string(),
            _ => Self::REQUEST_FAILED.to_string(),
        }
    }

    /// Whether this failure belongs to an auth form rather than the global
    /// session (everything except a forced logout).
    pub fn is_local(&self) -> bool {
        !matches!(self, ClientError::SessionInvalidated)
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_messages_pass_through() {
        let err = ClientError::InvalidCredentials("Invalid credentials".to_string());
        assert_eq!(err.user_message(), "Invalid credentials");
        assert_eq!(err.to_string(), "Invalid credentials");

        let err = ClientError::Http {
            status: 404,
            message: "Booking not found".to_string(),
        };
        assert_eq!(err.user_message(), "Booking not found");
    }

    #[test]
    fn transport_details_are_hidden() {
        let err = ClientError::Network("tcp connect error: 127.0.0.1:1".to_string());
        assert_eq!(err.user_message(), ClientError::REQUEST_FAILED);

        let err = ClientError::MalformedResponse("missing token".to_string());
        assert_eq!(err.user_message(), ClientError::REQUEST_FAILED);
    }

    #[test]
    fn only_session_invalidation_is_global() {
        assert!(!ClientError::SessionInvalidated.is_local());
        assert!(ClientError::Validation("bad".to_string()).is_local());
        assert!(ClientError::Network("down".to_string()).is_local());
    }
}
