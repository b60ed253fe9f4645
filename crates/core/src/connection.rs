//! Connection/error state machine
//!
//! Tracks whether presence reporting is Connecting, Connected, in an Error
//! state, or manually disconnected, and owns every transition. Each applied
//! event yields a [`Transition`] describing the observable side effects: the
//! indicator payload and an optional notification directive. The machine
//! itself performs no I/O.

use beacon_domain::{ConnectionState, ErrorKind};
use tracing::debug;

/// Externally observable indicator state.
///
/// When `retryable` is true the host binds the indicator to the reconnect
/// command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorPayload {
    pub label: String,
    pub tooltip: String,
    pub retryable: bool,
}

/// Inputs that may move the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// Session enabled or a connect attempt began
    ConnectStarted,
    /// A submission cycle completed successfully
    SubmitSucceeded { newly_registered: bool },
    /// A submission cycle failed with a classified error
    SubmitFailed(ErrorKind),
    /// Explicit user disconnect (in-memory only)
    ManualDisconnect,
    /// Explicit user reconnect; the only way out of ManuallyDisconnected
    Reconnect,
}

/// What, if anything, to tell the user about a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoticeDirective {
    None,
    /// One-time informational feedback (e.g. first registration)
    Info(String),
    /// Plain notification, suppressible by configuration
    Notify(ErrorKind),
    /// Actionable choice dialog for recoverable-by-user errors
    Prompt(ErrorKind),
}

/// Result of applying one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: ConnectionState,
    /// False when the event left the state untouched
    pub changed: bool,
    pub indicator: IndicatorPayload,
    pub notice: NoticeDirective,
}

/// Owns the single [`ConnectionState`] value.
///
/// Mutated only through [`apply`](Self::apply), in response to a sync-client
/// outcome or an explicit user command.
#[derive(Debug)]
pub struct ConnectionStateMachine {
    state: ConnectionState,
}

impl Default for ConnectionStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionStateMachine {
    pub fn new() -> Self {
        Self { state: ConnectionState::Connecting }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_manually_disconnected(&self) -> bool {
        self.state == ConnectionState::ManuallyDisconnected
    }

    /// Apply one event and describe the observable outcome.
    ///
    /// ManuallyDisconnected is sticky: submission outcomes never move it;
    /// only an explicit [`ConnectionEvent::Reconnect`] does.
    pub fn apply(&mut self, event: ConnectionEvent) -> Transition {
        let previous = self.state;
        let (next, notice) = match event {
            ConnectionEvent::ConnectStarted | ConnectionEvent::Reconnect => {
                (ConnectionState::Connecting, NoticeDirective::None)
            }
            ConnectionEvent::ManualDisconnect => {
                (ConnectionState::ManuallyDisconnected, NoticeDirective::None)
            }
            ConnectionEvent::SubmitSucceeded { .. } | ConnectionEvent::SubmitFailed(_)
                if previous == ConnectionState::ManuallyDisconnected =>
            {
                (previous, NoticeDirective::None)
            }
            ConnectionEvent::SubmitSucceeded { newly_registered } => {
                let notice = if newly_registered {
                    NoticeDirective::Info("Registered with the presence service".to_string())
                } else {
                    NoticeDirective::None
                };
                (ConnectionState::Connected, notice)
            }
            ConnectionEvent::SubmitFailed(kind) => {
                let notice = if kind.recoverable_by_user() {
                    NoticeDirective::Prompt(kind)
                } else if kind.notifies() {
                    NoticeDirective::Notify(kind)
                } else {
                    NoticeDirective::None
                };
                (ConnectionState::Error(kind), notice)
            }
        };

        let changed = next != previous;
        if changed {
            debug!(from = ?previous, to = ?next, "Connection state transition");
        }
        self.state = next;

        Transition { state: next, changed, indicator: indicator_for(next), notice }
    }
}

/// Indicator payload for a given state
fn indicator_for(state: ConnectionState) -> IndicatorPayload {
    match state {
        ConnectionState::Connecting => IndicatorPayload {
            label: "Connecting".to_string(),
            tooltip: "Connecting to the presence service".to_string(),
            retryable: false,
        },
        ConnectionState::Connected => IndicatorPayload {
            label: "Connected".to_string(),
            tooltip: "Presence updates are being sent".to_string(),
            retryable: false,
        },
        ConnectionState::Error(kind) => IndicatorPayload {
            label: kind.label().to_string(),
            tooltip: kind.description().to_string(),
            retryable: true,
        },
        ConnectionState::ManuallyDisconnected => IndicatorPayload {
            label: "Disconnected".to_string(),
            tooltip: "Presence reporting is disconnected; reconnect to resume".to_string(),
            retryable: true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_moves_to_connected() {
        let mut machine = ConnectionStateMachine::new();
        let t = machine.apply(ConnectionEvent::SubmitSucceeded { newly_registered: false });
        assert_eq!(t.state, ConnectionState::Connected);
        assert!(t.changed);
        assert_eq!(t.notice, NoticeDirective::None);
        assert!(!t.indicator.retryable);
    }

    #[test]
    fn repeated_success_is_idempotent() {
        let mut machine = ConnectionStateMachine::new();
        machine.apply(ConnectionEvent::SubmitSucceeded { newly_registered: false });
        let t = machine.apply(ConnectionEvent::SubmitSucceeded { newly_registered: false });
        assert_eq!(t.state, ConnectionState::Connected);
        assert!(!t.changed);
    }

    #[test]
    fn newly_registered_surfaces_one_time_info() {
        let mut machine = ConnectionStateMachine::new();
        let t = machine.apply(ConnectionEvent::SubmitSucceeded { newly_registered: true });
        assert!(matches!(t.notice, NoticeDirective::Info(_)));
    }

    #[test]
    fn failure_enters_error_and_binds_retry() {
        let mut machine = ConnectionStateMachine::new();
        let t = machine.apply(ConnectionEvent::SubmitFailed(ErrorKind::ServerError));
        assert_eq!(t.state, ConnectionState::Error(ErrorKind::ServerError));
        assert!(t.indicator.retryable);
        assert_eq!(t.notice, NoticeDirective::Notify(ErrorKind::ServerError));
    }

    #[test]
    fn error_recovers_on_next_success() {
        let mut machine = ConnectionStateMachine::new();
        machine.apply(ConnectionEvent::SubmitFailed(ErrorKind::Timeout));
        let t = machine.apply(ConnectionEvent::SubmitSucceeded { newly_registered: false });
        assert_eq!(t.state, ConnectionState::Connected);
    }

    #[test]
    fn recoverable_errors_prompt() {
        let mut machine = ConnectionStateMachine::new();
        let t = machine.apply(ConnectionEvent::SubmitFailed(ErrorKind::AuthFailed));
        assert_eq!(t.notice, NoticeDirective::Prompt(ErrorKind::AuthFailed));

        let t = machine.apply(ConnectionEvent::SubmitFailed(ErrorKind::UserConflict));
        assert_eq!(t.notice, NoticeDirective::Prompt(ErrorKind::UserConflict));
    }

    #[test]
    fn rate_limited_and_timeout_are_silent() {
        let mut machine = ConnectionStateMachine::new();
        let t = machine.apply(ConnectionEvent::SubmitFailed(ErrorKind::RateLimited));
        assert_eq!(t.notice, NoticeDirective::None);

        let t = machine.apply(ConnectionEvent::SubmitFailed(ErrorKind::Timeout));
        assert_eq!(t.notice, NoticeDirective::None);
    }

    #[test]
    fn manual_disconnect_is_sticky() {
        let mut machine = ConnectionStateMachine::new();
        machine.apply(ConnectionEvent::ManualDisconnect);

        let t = machine.apply(ConnectionEvent::SubmitSucceeded { newly_registered: false });
        assert_eq!(t.state, ConnectionState::ManuallyDisconnected);
        assert!(!t.changed);

        let t = machine.apply(ConnectionEvent::SubmitFailed(ErrorKind::ServerError));
        assert_eq!(t.state, ConnectionState::ManuallyDisconnected);
        assert!(!t.changed);
    }

    #[test]
    fn reconnect_is_the_only_way_out_of_manual_disconnect() {
        let mut machine = ConnectionStateMachine::new();
        machine.apply(ConnectionEvent::ManualDisconnect);
        let t = machine.apply(ConnectionEvent::Reconnect);
        assert_eq!(t.state, ConnectionState::Connecting);
        assert!(t.changed);
    }
}
