//! Error types for the manager-core library

use thiserror::Error;

/// Result type for manager interface operations
pub type Result<T> = std::result::Result<T, ManagerError>;

/// Errors that can occur while talking to the manager interface
#[derive(Debug, Error)]
pub enum ManagerError {
    /// Could not reach the server
    #[error("failed to connect to {host}:{port}: {source}")]
    Connect {
        /// Server host we tried to reach
        host: String,
        /// Server port we tried to reach
        port: u16,
        /// The underlying connect failure
        #[source]
        source: std::io::Error,
    },

    /// I/O failure on an established connection
    #[error("manager connection I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The server closed the connection mid-exchange
    #[error("connection closed by the manager interface")]
    ConnectionClosed,

    /// The server sent something we could not make sense of
    #[error("protocol error: {message}")]
    Protocol {
        /// What was wrong with the incoming data
        message: String,
    },

    /// Login was rejected
    #[error("authentication failed: {reason}")]
    Authentication {
        /// Server-supplied rejection reason
        reason: String,
    },

    /// The server reported an action as failed
    #[error("{action} failed: {reason}")]
    ActionFailed {
        /// Wire name of the failed action
        action: String,
        /// Server-supplied failure reason
        reason: String,
    },

    /// A call request was constructed with invalid fields
    #[error("invalid call request: {message}")]
    InvalidRequest {
        /// Which field was rejected and why
        message: String,
    },
}

impl ManagerError {
    /// Create a connect error
    pub fn connect(host: impl Into<String>, port: u16, source: std::io::Error) -> Self {
        Self::Connect {
            host: host.into(),
            port,
            source,
        }
    }

    /// Create a protocol error
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Create an authentication error
    pub fn authentication(reason: impl Into<String>) -> Self {
        Self::Authentication {
            reason: reason.into(),
        }
    }

    /// Create an action-failed error
    pub fn action_failed(action: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ActionFailed {
            action: action.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid-request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }
}
