//! Common data types used throughout the application

use serde::{Deserialize, Serialize};

use crate::constants;

/// Presence reporter configuration.
///
/// Read fresh from the host settings store on every submission so edits take
/// effect without a restart; never cached across cycles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceConfig {
    /// Base URL of the presence service (no trailing slash)
    pub endpoint_base_url: String,
    /// Bearer token for the presence service
    pub auth_token: String,
    /// Numeric user id registered with the service
    pub user_id: String,
    /// Template resolved while no document is focused
    pub template_idling: String,
    /// Template resolved while a document is focused
    pub template_editing: String,
    /// Template resolved while a debug session is active
    pub template_debugging: String,
    /// Master switch for presence reporting
    pub enabled: bool,
    /// Seconds of lost window focus before presence is suspended (0 disables)
    pub idle_timeout_secs: u64,
    /// Suppress plain notifications (actionable prompts still surface)
    pub suppress_notifications: bool,
    /// Regex patterns tested against workspace root paths; a match suppresses
    /// the session for the whole activation
    pub workspace_exclude_patterns: Vec<String>,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            endpoint_base_url: String::new(),
            auth_token: String::new(),
            user_id: String::new(),
            template_idling: constants::DEFAULT_TEMPLATE_IDLING.to_string(),
            template_editing: constants::DEFAULT_TEMPLATE_EDITING.to_string(),
            template_debugging: constants::DEFAULT_TEMPLATE_DEBUGGING.to_string(),
            enabled: true,
            idle_timeout_secs: constants::DEFAULT_IDLE_TIMEOUT_SECS,
            suppress_notifications: false,
            workspace_exclude_patterns: Vec::new(),
        }
    }
}

/// Generated service credentials.
///
/// The user id is a 16-digit numeric string whose first digit is never zero;
/// the auth token is a canonical v4 GUID. Both are persisted externally and
/// regenerable on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub user_id: String,
    pub auth_token: String,
}

/// Structured summary of current editor activity sent to the remote service.
///
/// Immutable once sent. The timestamp of the previous snapshot is carried
/// forward when nothing material changed, to avoid timestamp churn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceSnapshot {
    pub details: String,
    pub file_name: Option<String>,
    pub language: Option<String>,
    pub language_icon: Option<String>,
    pub workspace_name: Option<String>,
    pub timestamp_ms: i64,
    pub is_debugging: bool,
    pub git_branch: Option<String>,
    pub git_repo_name: Option<String>,
    pub app_name: String,
}

impl PresenceSnapshot {
    /// Whether two snapshots describe the same activity, ignoring the
    /// timestamp. Used for timestamp carry-over.
    pub fn same_activity(&self, other: &Self) -> bool {
        self.details == other.details
            && self.file_name == other.file_name
            && self.language == other.language
            && self.language_icon == other.language_icon
            && self.workspace_name == other.workspace_name
            && self.is_debugging == other.is_debugging
            && self.git_branch == other.git_branch
            && self.git_repo_name == other.git_repo_name
            && self.app_name == other.app_name
    }
}

/// Editor state captured from the host at build time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditorFacts {
    pub app_name: String,
    /// `None` when no document is focused
    pub file_name: Option<String>,
    /// Directory containing the active document
    pub directory_name: Option<String>,
    /// Directory of the active document relative to the workspace root
    pub relative_directory: Option<String>,
    /// Host language identifier for the active document (e.g. "rust")
    pub language_id: Option<String>,
    pub total_lines: Option<u32>,
    /// 1-indexed cursor line
    pub cursor_line: Option<u32>,
    /// 1-indexed cursor column
    pub cursor_column: Option<u32>,
    pub file_size_bytes: Option<u64>,
    pub workspace_name: Option<String>,
    pub workspace_folder: Option<String>,
    pub is_debugging: bool,
}

/// Version-control facts resolved through the host VCS collaborator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VcsFacts {
    /// Current branch name, if a repository is registered
    pub branch: Option<String>,
    /// Fetch URL of the default remote
    pub remote_url: Option<String>,
}

/// Connection lifecycle state.
///
/// Exactly one value at any time, owned exclusively by the connection state
/// machine and mutated only by submission outcomes or explicit user commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    Connecting,
    Connected,
    Error(crate::errors::ErrorKind),
    /// Entered only via explicit user action; sticky until explicit reconnect
    ManuallyDisconnected,
}

/// Host editor events the update scheduler subscribes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    EditorFocusChanged,
    DocumentChanged,
    DebugSessionStarted,
    DebugSessionEnded,
    WindowFocusChanged(bool),
}

/// Result of a successful submission cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmitOutcome {
    /// Set when the service created the user record during this cycle; used
    /// for one-time informational feedback
    pub newly_registered: bool,
}
