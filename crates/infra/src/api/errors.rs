//! Error classification for presence service responses
//!
//! Maps HTTP status codes and network-layer failures onto the domain
//! [`ErrorKind`] taxonomy consumed by the connection state machine.

use beacon_domain::{ErrorKind, SyncError};
use reqwest::StatusCode;

/// Classify a non-success HTTP status.
///
/// 404 classifies as EndpointNotFound only outside the registration flow; the
/// client intercepts 404 on the status endpoint before calling this.
pub fn classify_status(status: StatusCode) -> ErrorKind {
    match status {
        StatusCode::UNAUTHORIZED => ErrorKind::AuthFailed,
        StatusCode::CONFLICT => ErrorKind::UserConflict,
        StatusCode::NOT_FOUND => ErrorKind::EndpointNotFound,
        StatusCode::TOO_MANY_REQUESTS => ErrorKind::RateLimited,
        s if s.is_server_error() => ErrorKind::ServerError,
        _ => ErrorKind::Unknown,
    }
}

/// Build a classified error for a non-success status.
pub fn status_error(status: StatusCode, url: &str) -> SyncError {
    SyncError::new(classify_status(status), format!("{url} returned status {status}"))
}

/// Classify a network-layer failure by inspecting the failure signal.
pub fn classify_transport(err: &reqwest::Error) -> ErrorKind {
    if err.is_timeout() {
        return ErrorKind::Timeout;
    }

    // reqwest folds TLS and DNS failures into the error chain; inspect the
    // rendered chain text to tell them apart
    let text = error_chain_text(err);
    if text.contains("certificate") || text.contains("tls") || text.contains("ssl") {
        ErrorKind::TlsError
    } else if err.is_connect()
        || text.contains("dns")
        || text.contains("resolve")
        || text.contains("connection refused")
    {
        ErrorKind::NetworkUnreachable
    } else {
        ErrorKind::Unknown
    }
}

/// Build a classified error for a network-layer failure.
pub fn transport_error(err: &reqwest::Error) -> SyncError {
    SyncError::new(classify_transport(err), err.to_string())
}

fn error_chain_text(err: &reqwest::Error) -> String {
    let mut text = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        text.push_str(": ");
        text.push_str(&inner.to_string());
        source = inner.source();
    }
    text.to_lowercase()
}
