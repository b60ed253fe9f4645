//! Presence snapshot assembly

mod service;

pub use service::PresenceService;
