//! Port interfaces between core logic and the host environment
//!
//! These traits define the boundaries between core business logic and
//! infrastructure implementations (HTTP client, host editor adapters, settings
//! storage, UI widgets).

use async_trait::async_trait;
use beacon_domain::{
    Credentials, EditorFacts, ErrorKind, HostEvent, PresenceConfig, PresenceSnapshot, Result,
    SubmitOutcome, SyncError, VcsFacts,
};
use tokio::sync::mpsc;

use crate::connection::IndicatorPayload;

/// Trait for capturing editor state from the host
#[async_trait]
pub trait EditorStateProvider: Send + Sync {
    /// Capture the current editor/document/session facts
    async fn capture(&self) -> Result<EditorFacts>;

    /// Root paths of all open workspace folders
    async fn workspace_roots(&self) -> Result<Vec<String>>;
}

/// Trait for resolving version-control facts for the active workspace
#[async_trait]
pub trait VcsProvider: Send + Sync {
    /// Branch and remote facts, with `None` fields when no repository is
    /// registered or selected
    async fn facts(&self) -> Result<VcsFacts>;
}

/// Trait for the externally persisted configuration surface
///
/// Configuration is read fresh on every submission cycle so settings edits
/// take effect without a restart.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Load the current configuration
    async fn load(&self) -> Result<PresenceConfig>;

    /// Persist regenerated credentials
    async fn store_credentials(&self, credentials: &Credentials) -> Result<()>;
}

/// Trait for submitting presence snapshots to the remote service
#[async_trait]
pub trait PresenceTransport: Send + Sync {
    /// Submit a snapshot, running the register-then-retry protocol when the
    /// service does not know the user yet
    async fn submit(
        &self,
        snapshot: &PresenceSnapshot,
        config: &PresenceConfig,
    ) -> std::result::Result<SubmitOutcome, SyncError>;
}

/// Trait for the host's status indicator widget
#[async_trait]
pub trait StatusIndicator: Send + Sync {
    /// Replace the indicator's label/tooltip and its reconnect binding
    async fn update(&self, payload: &IndicatorPayload);

    /// Hide the indicator entirely
    async fn clear(&self);
}

/// Severity of a plain notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// The user's answer to a recoverable-error prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryChoice {
    /// Regenerate the offending credential and reconnect
    RegenerateAndReconnect,
    /// Take no action
    Dismiss,
}

/// Trait for user-visible notifications and prompts
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Show a plain notification
    async fn notify(&self, level: NoticeLevel, message: &str);

    /// Surface the actionable choice dialog for a recoverable-by-user error
    async fn prompt_recovery(&self, kind: ErrorKind) -> RecoveryChoice;
}

/// Trait for subscribing to host editor events
///
/// A subscription is acquired at connect-time and released by dropping the
/// receiver; the scheduler guarantees release on every exit path.
pub trait HostEventSource: Send + Sync {
    /// Open a new event subscription
    fn subscribe(&self) -> mpsc::Receiver<HostEvent>;
}
