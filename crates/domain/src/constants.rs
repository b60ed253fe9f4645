//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Scheduling constants
pub const THROTTLE_INTERVAL_SECS: u64 = 10;
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 300;
pub const REQUEST_TIMEOUT_SECS: u64 = 15;

// API endpoint paths
pub const UPDATE_STATUS_PATH: &str = "/update-status";
pub const REGISTER_USER_PATH: &str = "/register-user";
pub const CHECK_USER_PATH: &str = "/check-if-user-exists";

// Default presence templates
pub const DEFAULT_TEMPLATE_IDLING: &str = "Idling in {workspace}";
pub const DEFAULT_TEMPLATE_EDITING: &str = "Editing {file_name}:{current_line}";
pub const DEFAULT_TEMPLATE_DEBUGGING: &str = "Debugging {file_name}";

// Structured-field fallback when no repository is registered. Template
// substitutions use the zero-width marker instead; the two audiences differ
// on purpose (display string vs. structured field).
pub const UNKNOWN_MARKER: &str = "Unknown";

// Credential shape
pub const USER_ID_LENGTH: usize = 16;
