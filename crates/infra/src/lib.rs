//! # Beacon Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - The HTTP sync client (status submission + registration flow)
//! - The throttled, event-driven update scheduler
//! - Credential generation
//! - Session lifecycle and command dispatch
//!
//! ## Architecture
//! - Implements traits defined in `beacon-core`
//! - Depends on `beacon-domain` and `beacon-core`
//! - Contains all "impure" code (I/O, timers)

pub mod api;
pub mod credentials;
pub mod scheduling;
pub mod session;

// Re-export commonly used items
pub use api::SyncClient;
pub use scheduling::{SchedulerError, UpdateScheduler, UpdateSchedulerConfig};
pub use session::{PresenceSession, SessionCommand, SessionPorts};
