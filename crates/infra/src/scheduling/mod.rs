//! Scheduling infrastructure for presence submission
//!
//! The update scheduler converts the high-frequency host event stream into a
//! low-frequency stream of submission attempts:
//! - Explicit lifecycle management (start/stop)
//! - Join handles for spawned tasks
//! - Cancellation token support
//! - Trailing-edge throttling and idle suspension

pub mod error;
pub mod update_scheduler;

pub use error::{SchedulerError, SchedulerResult};
pub use update_scheduler::{SchedulerContext, UpdateScheduler, UpdateSchedulerConfig};
