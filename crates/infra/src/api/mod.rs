//! HTTP protocol for the presence service

pub mod client;
pub mod errors;

pub use client::SyncClient;
