//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Beacon
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum BeaconError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Host editor error: {0}")]
    Host(String),

    #[error("Version control error: {0}")]
    Vcs(String),

    #[error("Sync error: {0}")]
    Sync(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Beacon operations
pub type Result<T> = std::result::Result<T, BeaconError>;

/// Classification of a failed submission.
///
/// Every outcome the sync client can observe maps onto exactly one kind; the
/// connection state machine and the notification policy both key off it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Invalid or rejected bearer token (HTTP 401)
    AuthFailed,
    /// Server reports a conflicting user record (HTTP 409)
    UserConflict,
    /// Endpoint missing outside the registration flow (HTTP 404)
    EndpointNotFound,
    /// Too many requests (HTTP 429)
    RateLimited,
    /// Server-side failure (HTTP 5xx)
    ServerError,
    /// Connection refused or DNS resolution failure
    NetworkUnreachable,
    /// Request deadline elapsed
    Timeout,
    /// TLS/certificate failure
    TlsError,
    /// The nested register-then-retry flow failed
    RegistrationFailed,
    /// Anything not otherwise classified
    Unknown,
}

impl ErrorKind {
    /// Kinds that surface an actionable choice (regenerate credentials and
    /// reconnect) rather than a plain notification.
    pub fn recoverable_by_user(self) -> bool {
        matches!(self, Self::AuthFailed | Self::UserConflict)
    }

    /// Transient kinds expected to self-heal on the next throttled attempt.
    pub fn transient(self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::ServerError | Self::Timeout | Self::NetworkUnreachable
        )
    }

    /// Whether this kind produces a plain user-visible notification.
    ///
    /// RateLimited and Timeout never notify (avoids notification storms under
    /// transient load); the recoverable-by-user kinds prompt instead.
    pub fn notifies(self) -> bool {
        !matches!(self, Self::RateLimited | Self::Timeout) && !self.recoverable_by_user()
    }

    /// Short label for the status indicator.
    pub fn label(self) -> &'static str {
        match self {
            Self::AuthFailed => "Auth failed",
            Self::UserConflict => "User conflict",
            Self::EndpointNotFound => "Endpoint not found",
            Self::RateLimited => "Rate limited",
            Self::ServerError => "Server error",
            Self::NetworkUnreachable => "Network unreachable",
            Self::Timeout => "Timed out",
            Self::TlsError => "TLS error",
            Self::RegistrationFailed => "Registration failed",
            Self::Unknown => "Error",
        }
    }

    /// Longer description for the indicator tooltip.
    pub fn description(self) -> &'static str {
        match self {
            Self::AuthFailed => "The service rejected the configured auth token",
            Self::UserConflict => "The service reported a conflicting user record",
            Self::EndpointNotFound => "The configured endpoint was not found",
            Self::RateLimited => "The service is rate limiting updates; will retry",
            Self::ServerError => "The service reported an internal error; will retry",
            Self::NetworkUnreachable => "Could not reach the service; will retry",
            Self::Timeout => "The request timed out; will retry",
            Self::TlsError => "TLS handshake with the service failed",
            Self::RegistrationFailed => "Registering this user with the service failed",
            Self::Unknown => "Presence update failed",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A classified transport failure reported by the sync client.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct SyncError {
    pub kind: ErrorKind,
    pub message: String,
}

impl SyncError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }
}

impl From<SyncError> for BeaconError {
    fn from(err: SyncError) -> Self {
        Self::Sync(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_kinds_prompt_instead_of_notifying() {
        assert!(ErrorKind::AuthFailed.recoverable_by_user());
        assert!(ErrorKind::UserConflict.recoverable_by_user());
        assert!(!ErrorKind::AuthFailed.notifies());
        assert!(!ErrorKind::UserConflict.notifies());
    }

    #[test]
    fn rate_limited_and_timeout_never_notify() {
        assert!(!ErrorKind::RateLimited.notifies());
        assert!(!ErrorKind::Timeout.notifies());
    }

    #[test]
    fn remaining_kinds_notify() {
        assert!(ErrorKind::EndpointNotFound.notifies());
        assert!(ErrorKind::ServerError.notifies());
        assert!(ErrorKind::NetworkUnreachable.notifies());
        assert!(ErrorKind::TlsError.notifies());
        assert!(ErrorKind::RegistrationFailed.notifies());
        assert!(ErrorKind::Unknown.notifies());
    }

    #[test]
    fn transient_kinds() {
        for kind in [
            ErrorKind::RateLimited,
            ErrorKind::ServerError,
            ErrorKind::Timeout,
            ErrorKind::NetworkUnreachable,
        ] {
            assert!(kind.transient(), "{kind} should be transient");
        }
        assert!(!ErrorKind::AuthFailed.transient());
        assert!(!ErrorKind::RegistrationFailed.transient());
    }
}
