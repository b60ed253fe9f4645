//! Throttled, event-driven update scheduler
//!
//! Converts the high-frequency host event stream into a low-frequency stream
//! of submission attempts. Bursts coalesce into at most one submission per
//! throttle window with trailing-edge semantics: the first trigger arms the
//! window and the submission fires at expiry using state captured then, so
//! the last event in a burst wins. The window is the single serialization
//! point for submission attempts.
//!
//! Losing window focus arms a single-shot idle timer (at most one live;
//! re-arming cancels the previous one). When it elapses, in-memory presence
//! is cleared and submissions are suppressed until focus returns; regaining
//! focus cancels the timer and forces an immediate throttled submission.

use std::sync::Arc;
use std::time::Duration;

use beacon_core::connection::{
    ConnectionEvent, ConnectionStateMachine, NoticeDirective, Transition,
};
use beacon_core::ports::{
    ConfigStore, NoticeLevel, Notifier, PresenceTransport, RecoveryChoice, StatusIndicator,
};
use beacon_core::PresenceService;
use beacon_domain::constants::THROTTLE_INTERVAL_SECS;
use beacon_domain::{Credentials, ErrorKind, HostEvent, PresenceConfig, PresenceSnapshot};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::error::{SchedulerError, SchedulerResult};
use crate::credentials;

/// Type alias for task handle to avoid complexity warnings
type TaskHandle = Arc<Mutex<Option<JoinHandle<()>>>>;

/// Configuration for the update scheduler
#[derive(Debug, Clone)]
pub struct UpdateSchedulerConfig {
    /// Throttle window length
    pub throttle_interval: Duration,
    /// Force a submission right after start (enable/reconnect)
    pub kick_off: bool,
}

impl Default for UpdateSchedulerConfig {
    fn default() -> Self {
        Self {
            throttle_interval: Duration::from_secs(THROTTLE_INTERVAL_SECS),
            kick_off: true,
        }
    }
}

/// Collaborators the scheduler drives each cycle
#[derive(Clone)]
pub struct SchedulerContext {
    pub config_store: Arc<dyn ConfigStore>,
    pub presence: Arc<PresenceService>,
    pub transport: Arc<dyn PresenceTransport>,
    pub connection: Arc<Mutex<ConnectionStateMachine>>,
    pub indicator: Arc<dyn StatusIndicator>,
    pub notifier: Arc<dyn Notifier>,
}

/// Mutable state owned by the scheduler loop
#[derive(Default)]
struct LoopState {
    /// A trigger arrived inside the current window
    pending: bool,
    /// Trailing edge of the current throttle window
    window_deadline: Option<Instant>,
    /// Single outstanding idle timer
    idle_deadline: Option<Instant>,
    /// Idle timeout elapsed; no submissions until focus returns
    idle_suspended: bool,
    /// Last successfully submitted snapshot, for timestamp carry-over
    last_snapshot: Option<PresenceSnapshot>,
}

/// Throttled presence update scheduler
pub struct UpdateScheduler {
    ctx: SchedulerContext,
    config: UpdateSchedulerConfig,
    cancellation_token: CancellationToken,
    task_handle: TaskHandle,
}

impl UpdateScheduler {
    /// Create a new update scheduler
    pub fn new(ctx: SchedulerContext, config: UpdateSchedulerConfig) -> Self {
        Self {
            ctx,
            config,
            cancellation_token: CancellationToken::new(),
            task_handle: Arc::new(Mutex::new(None)),
        }
    }

    /// Start the scheduler
    ///
    /// Takes ownership of the host event subscription; the receiver is
    /// dropped (releasing the subscription) on every loop exit path.
    ///
    /// # Errors
    ///
    /// Returns error if the scheduler is already running
    #[instrument(skip(self, events))]
    pub async fn start(&mut self, events: mpsc::Receiver<HostEvent>) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        info!("Starting update scheduler");

        // Fresh token, supports restart after stop
        self.cancellation_token = CancellationToken::new();

        let ctx = self.ctx.clone();
        let config = self.config.clone();
        let cancel = self.cancellation_token.clone();

        let handle = tokio::spawn(async move {
            Self::run_loop(ctx, config, events, cancel).await;
        });

        *self.task_handle.lock().await = Some(handle);

        info!("Update scheduler started");
        Ok(())
    }

    /// Stop the scheduler
    ///
    /// Cancels the loop and joins the task before returning, so no further
    /// submissions occur after this call completes.
    ///
    /// # Errors
    ///
    /// Returns error if the scheduler is not running or the task does not
    /// stop in time
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.is_running() {
            return Err(SchedulerError::NotRunning);
        }

        info!("Stopping update scheduler");
        self.cancellation_token.cancel();

        if let Some(handle) = self.task_handle.lock().await.take() {
            let join_timeout = Duration::from_secs(5);
            match tokio::time::timeout(join_timeout, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => return Err(SchedulerError::TaskJoinFailed(err.to_string())),
                Err(_) => {
                    return Err(SchedulerError::Timeout { seconds: join_timeout.as_secs() })
                }
            }
        }

        info!("Update scheduler stopped");
        Ok(())
    }

    /// Check if the scheduler is running
    pub fn is_running(&self) -> bool {
        self.task_handle
            .try_lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|h| !h.is_finished()))
            .unwrap_or(false)
    }

    async fn run_loop(
        ctx: SchedulerContext,
        config: UpdateSchedulerConfig,
        mut events: mpsc::Receiver<HostEvent>,
        cancel: CancellationToken,
    ) {
        let mut state = LoopState::default();
        if config.kick_off {
            state.pending = true;
            state.window_deadline = Some(Instant::now());
        }

        loop {
            let window = state.window_deadline;
            let idle = state.idle_deadline;

            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Update loop cancelled");
                    break;
                }
                event = events.recv() => match event {
                    Some(event) => Self::handle_event(&ctx, &config, &mut state, event).await,
                    None => {
                        debug!("Host event source closed");
                        break;
                    }
                },
                _ = deadline(window), if window.is_some() => {
                    state.window_deadline = None;
                    if state.pending && !state.idle_suspended {
                        state.pending = false;
                        Self::submit_cycle(&ctx, &mut state).await;
                    }
                }
                _ = deadline(idle), if idle.is_some() => {
                    state.idle_deadline = None;
                    state.idle_suspended = true;
                    // Next resumed activity is treated as fresh
                    state.last_snapshot = None;
                    debug!("Idle timeout elapsed; presence suspended");
                }
            }
        }
    }

    async fn handle_event(
        ctx: &SchedulerContext,
        config: &UpdateSchedulerConfig,
        state: &mut LoopState,
        event: HostEvent,
    ) {
        match event {
            HostEvent::WindowFocusChanged(false) => {
                // Re-arming cancels any previous idle timer
                match ctx.config_store.load().await {
                    Ok(cfg) if cfg.idle_timeout_secs > 0 => {
                        state.idle_deadline =
                            Some(Instant::now() + Duration::from_secs(cfg.idle_timeout_secs));
                    }
                    Ok(_) => state.idle_deadline = None,
                    Err(err) => warn!(error = %err, "Failed to load config for idle timer"),
                }
            }
            HostEvent::WindowFocusChanged(true) => {
                state.idle_deadline = None;
                state.idle_suspended = false;
                // Forced submission, then a fresh window so the burst that
                // follows focus regain still coalesces
                state.pending = false;
                Self::submit_cycle(ctx, state).await;
                state.window_deadline = Some(Instant::now() + config.throttle_interval);
            }
            HostEvent::EditorFocusChanged
            | HostEvent::DocumentChanged
            | HostEvent::DebugSessionStarted
            | HostEvent::DebugSessionEnded => {
                if state.idle_suspended {
                    return;
                }
                state.pending = true;
                if state.window_deadline.is_none() {
                    state.window_deadline = Some(Instant::now() + config.throttle_interval);
                }
            }
        }
    }

    /// One full submission attempt: fresh config, snapshot, transport call,
    /// state transition, indicator and notification side effects.
    #[instrument(skip_all)]
    async fn submit_cycle(ctx: &SchedulerContext, state: &mut LoopState) {
        let config = match ctx.config_store.load().await {
            Ok(config) => config,
            Err(err) => {
                warn!(error = %err, "Failed to load configuration; skipping cycle");
                return;
            }
        };
        if !config.enabled {
            debug!("Presence reporting disabled; skipping cycle");
            return;
        }
        if ctx.connection.lock().await.is_manually_disconnected() {
            debug!("Manually disconnected; skipping cycle");
            return;
        }

        let snapshot =
            match ctx.presence.build_snapshot(state.last_snapshot.as_ref(), &config).await {
                Ok(snapshot) => snapshot,
                Err(err) => {
                    warn!(error = %err, "Failed to build presence snapshot");
                    return;
                }
            };

        let outcome = ctx.transport.submit(&snapshot, &config).await;
        let transition = {
            let mut machine = ctx.connection.lock().await;
            match &outcome {
                Ok(ok) => machine.apply(ConnectionEvent::SubmitSucceeded {
                    newly_registered: ok.newly_registered,
                }),
                Err(err) => {
                    warn!(kind = %err.kind, error = %err, "Presence submission failed");
                    machine.apply(ConnectionEvent::SubmitFailed(err.kind))
                }
            }
        };

        if outcome.is_ok() {
            state.last_snapshot = Some(snapshot);
        }

        Self::apply_transition(ctx, &config, state, transition).await;
    }

    async fn apply_transition(
        ctx: &SchedulerContext,
        config: &PresenceConfig,
        state: &mut LoopState,
        transition: Transition,
    ) {
        ctx.indicator.update(&transition.indicator).await;

        match transition.notice {
            NoticeDirective::None => {}
            NoticeDirective::Info(message) => {
                if !config.suppress_notifications {
                    ctx.notifier.notify(NoticeLevel::Info, &message).await;
                }
            }
            NoticeDirective::Notify(kind) => {
                if !config.suppress_notifications {
                    ctx.notifier.notify(NoticeLevel::Error, kind.description()).await;
                }
            }
            NoticeDirective::Prompt(kind) => {
                // The actionable dialog surfaces even when plain
                // notifications are suppressed
                let choice = ctx.notifier.prompt_recovery(kind).await;
                if choice == RecoveryChoice::RegenerateAndReconnect {
                    Self::regenerate_and_reconnect(ctx, config, state, kind).await;
                }
            }
        }
    }

    async fn regenerate_and_reconnect(
        ctx: &SchedulerContext,
        config: &PresenceConfig,
        state: &mut LoopState,
        kind: ErrorKind,
    ) {
        // An auth failure means a bad token; a user conflict means a bad id
        let fresh = match kind {
            ErrorKind::AuthFailed => Credentials {
                user_id: config.user_id.clone(),
                auth_token: credentials::generate_auth_token(),
            },
            _ => Credentials {
                user_id: credentials::generate_user_id(),
                auth_token: config.auth_token.clone(),
            },
        };

        if let Err(err) = ctx.config_store.store_credentials(&fresh).await {
            warn!(error = %err, "Failed to persist regenerated credentials");
            return;
        }

        let transition = ctx.connection.lock().await.apply(ConnectionEvent::Reconnect);
        ctx.indicator.update(&transition.indicator).await;
        info!("Credentials regenerated; reconnecting");

        state.pending = true;
        if state.window_deadline.is_none() {
            state.window_deadline = Some(Instant::now());
        }
    }
}

async fn deadline(at: Option<Instant>) {
    if let Some(at) = at {
        tokio::time::sleep_until(at).await;
    }
}

/// Ensure the loop is cancelled when the scheduler is dropped
impl Drop for UpdateScheduler {
    fn drop(&mut self) {
        if !self.cancellation_token.is_cancelled() {
            warn!("UpdateScheduler dropped while running; cancelling");
            self.cancellation_token.cancel();
        }
    }
}
