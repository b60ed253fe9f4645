//! # Beacon Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Template resolution for presence strings
//! - Presence snapshot assembly
//! - The connection/error state machine
//! - Port/adapter interfaces (traits)
//!
//! ## Architecture Principles
//! - Only depends on `beacon-domain`
//! - No HTTP, timer, or host-editor code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod connection;
pub mod languages;
pub mod ports;
pub mod presence;
pub mod template;

// Re-export specific items to avoid ambiguity
pub use connection::{
    ConnectionEvent, ConnectionStateMachine, IndicatorPayload, NoticeDirective, Transition,
};
pub use languages::{resolve_language, LanguageInfo};
pub use ports::{
    ConfigStore, EditorStateProvider, HostEventSource, NoticeLevel, Notifier, PresenceTransport,
    RecoveryChoice, StatusIndicator, VcsProvider,
};
pub use presence::PresenceService;
pub use template::{resolve, TemplateContext, EMPTY_MARKER};
