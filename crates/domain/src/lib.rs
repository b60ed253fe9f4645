//! # Beacon Domain
//!
//! Business domain types and models for Beacon.
//!
//! This crate contains:
//! - Presence data types (PresenceSnapshot, EditorFacts, etc.)
//! - Connection state and error classification
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other Beacon crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use errors::*;
pub use types::*;
