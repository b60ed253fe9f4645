//! Activation-level session orchestration
//!
//! Wires the host adapters, presence service, sync transport, connection
//! state machine, and update scheduler together, and exposes the user-facing
//! command surface. One session exists per host activation.
//!
//! If any workspace root matches an exclusion pattern at activation, the
//! session is suppressed for the whole activation: no scheduler, no
//! submissions, no indicator.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use beacon_core::connection::{ConnectionEvent, ConnectionStateMachine};
use beacon_core::ports::{
    ConfigStore, EditorStateProvider, HostEventSource, Notifier, PresenceTransport,
    StatusIndicator, VcsProvider,
};
use beacon_core::PresenceService;
use beacon_domain::{Credentials, PresenceConfig, Result};
use regex::Regex;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::credentials;
use crate::scheduling::{SchedulerContext, SchedulerError, UpdateScheduler, UpdateSchedulerConfig};

/// User-issued commands exposed by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// Start presence reporting
    Enable,
    /// Stop presence reporting and hide the indicator
    Disable,
    /// Stop submissions without touching persisted settings
    Disconnect,
    /// Resume after a disconnect or an error state
    Reconnect,
    /// Replace the persisted user id, then reconnect
    RegenerateUserId,
    /// Replace the persisted auth token, then reconnect
    RegenerateAuthToken,
}

/// Host collaborators the session wires together
#[derive(Clone)]
pub struct SessionPorts {
    pub editor: Arc<dyn EditorStateProvider>,
    pub vcs: Arc<dyn VcsProvider>,
    pub config_store: Arc<dyn ConfigStore>,
    pub transport: Arc<dyn PresenceTransport>,
    pub indicator: Arc<dyn StatusIndicator>,
    pub notifier: Arc<dyn Notifier>,
    pub events: Arc<dyn HostEventSource>,
}

/// One presence-reporting session
pub struct PresenceSession {
    ports: SessionPorts,
    connection: Arc<Mutex<ConnectionStateMachine>>,
    scheduler: Mutex<UpdateScheduler>,
    /// Set once at activation when the workspace is excluded; never cleared
    suppressed: AtomicBool,
}

impl PresenceSession {
    /// Create a new session from the host's port implementations
    pub fn new(ports: SessionPorts) -> Self {
        let connection = Arc::new(Mutex::new(ConnectionStateMachine::new()));
        let presence = Arc::new(PresenceService::new(ports.editor.clone(), ports.vcs.clone()));
        let ctx = SchedulerContext {
            config_store: ports.config_store.clone(),
            presence,
            transport: ports.transport.clone(),
            connection: connection.clone(),
            indicator: ports.indicator.clone(),
            notifier: ports.notifier.clone(),
        };
        let scheduler = UpdateScheduler::new(ctx, UpdateSchedulerConfig::default());

        Self {
            ports,
            connection,
            scheduler: Mutex::new(scheduler),
            suppressed: AtomicBool::new(false),
        }
    }

    /// Activate the session.
    ///
    /// Checks workspace exclusion first, generates credentials on first use,
    /// then starts the scheduler unless reporting is disabled.
    #[instrument(skip(self))]
    pub async fn activate(&self) -> Result<()> {
        if self.workspace_excluded().await? {
            self.suppressed.store(true, Ordering::SeqCst);
            info!("Workspace matches an exclusion pattern; session suppressed");
            return Ok(());
        }

        let config = self.ensure_credentials().await?;
        if !config.enabled {
            info!("Presence reporting disabled; scheduler not started");
            return Ok(());
        }

        self.start_scheduler().await
    }

    /// Deactivate the session, stopping all background work
    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<()> {
        self.stop_scheduler().await?;
        self.ports.indicator.clear().await;
        Ok(())
    }

    /// Execute a user command
    #[instrument(skip(self))]
    pub async fn dispatch(&self, command: SessionCommand) -> Result<()> {
        match command {
            SessionCommand::Enable => self.enable().await,
            SessionCommand::Disable => self.disable().await,
            SessionCommand::Disconnect => self.disconnect().await,
            SessionCommand::Reconnect => self.reconnect().await,
            SessionCommand::RegenerateUserId => self.regenerate_user_id().await,
            SessionCommand::RegenerateAuthToken => self.regenerate_auth_token().await,
        }
    }

    /// Whether the scheduler is currently running
    pub async fn is_active(&self) -> bool {
        self.scheduler.lock().await.is_running()
    }

    async fn enable(&self) -> Result<()> {
        self.ensure_credentials().await?;
        self.start_scheduler().await
    }

    async fn disable(&self) -> Result<()> {
        self.stop_scheduler().await?;
        self.ports.indicator.clear().await;
        Ok(())
    }

    /// In-memory disconnect: persisted settings are untouched, so the next
    /// activation connects normally.
    async fn disconnect(&self) -> Result<()> {
        let transition = self.connection.lock().await.apply(ConnectionEvent::ManualDisconnect);
        self.ports.indicator.update(&transition.indicator).await;
        self.stop_scheduler().await
    }

    async fn reconnect(&self) -> Result<()> {
        if self.suppressed.load(Ordering::SeqCst) {
            return Ok(());
        }
        let transition = self.connection.lock().await.apply(ConnectionEvent::Reconnect);
        self.ports.indicator.update(&transition.indicator).await;
        self.start_scheduler().await
    }

    async fn regenerate_user_id(&self) -> Result<()> {
        let config = self.ports.config_store.load().await?;
        let fresh = Credentials {
            user_id: credentials::generate_user_id(),
            auth_token: config.auth_token,
        };
        self.ports.config_store.store_credentials(&fresh).await?;
        info!("User id regenerated");
        self.reconnect().await
    }

    async fn regenerate_auth_token(&self) -> Result<()> {
        let config = self.ports.config_store.load().await?;
        let fresh = Credentials {
            user_id: config.user_id,
            auth_token: credentials::generate_auth_token(),
        };
        self.ports.config_store.store_credentials(&fresh).await?;
        info!("Auth token regenerated");
        self.reconnect().await
    }

    /// Generate and persist any missing credential, returning the effective
    /// configuration.
    async fn ensure_credentials(&self) -> Result<PresenceConfig> {
        let config = self.ports.config_store.load().await?;
        if config.user_id.is_empty() || config.auth_token.is_empty() {
            let fresh = Credentials {
                user_id: if config.user_id.is_empty() {
                    credentials::generate_user_id()
                } else {
                    config.user_id.clone()
                },
                auth_token: if config.auth_token.is_empty() {
                    credentials::generate_auth_token()
                } else {
                    config.auth_token.clone()
                },
            };
            self.ports.config_store.store_credentials(&fresh).await?;
            info!("Generated credentials on first use");
        }
        Ok(config)
    }

    /// Test every workspace root against the configured exclusion patterns.
    /// Invalid patterns are skipped, not fatal.
    async fn workspace_excluded(&self) -> Result<bool> {
        let config = self.ports.config_store.load().await?;
        if config.workspace_exclude_patterns.is_empty() {
            return Ok(false);
        }

        let roots = self.ports.editor.workspace_roots().await?;
        for pattern in &config.workspace_exclude_patterns {
            let regex = match Regex::new(pattern) {
                Ok(regex) => regex,
                Err(err) => {
                    warn!(pattern, error = %err, "Skipping invalid exclusion pattern");
                    continue;
                }
            };
            if roots.iter().any(|root| regex.is_match(root)) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn start_scheduler(&self) -> Result<()> {
        if self.suppressed.load(Ordering::SeqCst) {
            return Ok(());
        }
        let mut scheduler = self.scheduler.lock().await;
        if scheduler.is_running() {
            return Ok(());
        }
        let events = self.ports.events.subscribe();
        scheduler.start(events).await?;
        Ok(())
    }

    async fn stop_scheduler(&self) -> Result<()> {
        let mut scheduler = self.scheduler.lock().await;
        match scheduler.stop().await {
            Ok(()) | Err(SchedulerError::NotRunning) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;
    use beacon_core::connection::IndicatorPayload;
    use beacon_core::ports::{NoticeLevel, RecoveryChoice};
    use beacon_domain::{
        EditorFacts, ErrorKind, HostEvent, PresenceSnapshot, SubmitOutcome, SyncError, VcsFacts,
    };
    use tokio::sync::mpsc;

    use super::*;

    struct StubEditor;

    #[async_trait]
    impl EditorStateProvider for StubEditor {
        async fn capture(&self) -> Result<EditorFacts> {
            Ok(EditorFacts {
                app_name: "TestEditor".to_string(),
                file_name: Some("main.rs".to_string()),
                ..Default::default()
            })
        }

        async fn workspace_roots(&self) -> Result<Vec<String>> {
            Ok(vec!["/home/dev/secret-project".to_string()])
        }
    }

    struct StubVcs;

    #[async_trait]
    impl VcsProvider for StubVcs {
        async fn facts(&self) -> Result<VcsFacts> {
            Ok(VcsFacts::default())
        }
    }

    struct StubConfigStore {
        config: StdMutex<PresenceConfig>,
        stored: StdMutex<Vec<Credentials>>,
    }

    impl StubConfigStore {
        fn new(config: PresenceConfig) -> Arc<Self> {
            Arc::new(Self { config: StdMutex::new(config), stored: StdMutex::new(Vec::new()) })
        }

        fn stored(&self) -> Vec<Credentials> {
            self.stored.lock().map(|s| s.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl ConfigStore for StubConfigStore {
        async fn load(&self) -> Result<PresenceConfig> {
            Ok(self.config.lock().map(|c| c.clone()).unwrap_or_default())
        }

        async fn store_credentials(&self, credentials: &Credentials) -> Result<()> {
            if let Ok(mut stored) = self.stored.lock() {
                stored.push(credentials.clone());
            }
            Ok(())
        }
    }

    struct StubTransport {
        count: StdMutex<usize>,
    }

    impl StubTransport {
        fn new() -> Arc<Self> {
            Arc::new(Self { count: StdMutex::new(0) })
        }

        fn count(&self) -> usize {
            self.count.lock().map(|c| *c).unwrap_or(0)
        }
    }

    #[async_trait]
    impl PresenceTransport for StubTransport {
        async fn submit(
            &self,
            _snapshot: &PresenceSnapshot,
            _config: &PresenceConfig,
        ) -> std::result::Result<SubmitOutcome, SyncError> {
            if let Ok(mut count) = self.count.lock() {
                *count += 1;
            }
            Ok(SubmitOutcome::default())
        }
    }

    struct StubIndicator {
        cleared: StdMutex<bool>,
    }

    impl StubIndicator {
        fn new() -> Arc<Self> {
            Arc::new(Self { cleared: StdMutex::new(false) })
        }
    }

    #[async_trait]
    impl StatusIndicator for StubIndicator {
        async fn update(&self, _payload: &IndicatorPayload) {}

        async fn clear(&self) {
            if let Ok(mut cleared) = self.cleared.lock() {
                *cleared = true;
            }
        }
    }

    struct StubNotifier;

    #[async_trait]
    impl Notifier for StubNotifier {
        async fn notify(&self, _level: NoticeLevel, _message: &str) {}

        async fn prompt_recovery(&self, _kind: ErrorKind) -> RecoveryChoice {
            RecoveryChoice::Dismiss
        }
    }

    #[derive(Default)]
    struct StubEvents {
        senders: StdMutex<Vec<mpsc::Sender<HostEvent>>>,
    }

    impl HostEventSource for StubEvents {
        fn subscribe(&self) -> mpsc::Receiver<HostEvent> {
            let (tx, rx) = mpsc::channel(8);
            if let Ok(mut senders) = self.senders.lock() {
                senders.push(tx);
            }
            rx
        }
    }

    struct TestSession {
        session: PresenceSession,
        store: Arc<StubConfigStore>,
        transport: Arc<StubTransport>,
        indicator: Arc<StubIndicator>,
    }

    fn session(config: PresenceConfig) -> TestSession {
        let store = StubConfigStore::new(config);
        let transport = StubTransport::new();
        let indicator = StubIndicator::new();
        let ports = SessionPorts {
            editor: Arc::new(StubEditor),
            vcs: Arc::new(StubVcs),
            config_store: store.clone(),
            transport: transport.clone(),
            indicator: indicator.clone(),
            notifier: Arc::new(StubNotifier),
            events: Arc::new(StubEvents::default()),
        };
        TestSession { session: PresenceSession::new(ports), store, transport, indicator }
    }

    fn configured() -> PresenceConfig {
        PresenceConfig {
            user_id: "1234567890123456".to_string(),
            auth_token: "token".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn activate_starts_scheduler() {
        let t = session(configured());
        t.session.activate().await.unwrap();
        assert!(t.session.is_active().await);
        t.session.shutdown().await.unwrap();
        assert!(!t.session.is_active().await);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn activation_generates_missing_credentials() {
        let t = session(PresenceConfig::default());
        t.session.activate().await.unwrap();

        let stored = t.store.stored();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].user_id.len(), 16);
        assert_eq!(stored[0].auth_token.len(), 36);

        t.session.shutdown().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn excluded_workspace_suppresses_everything() {
        let config = PresenceConfig {
            workspace_exclude_patterns: vec!["secret".to_string()],
            ..configured()
        };
        let t = session(config);
        t.session.activate().await.unwrap();
        assert!(!t.session.is_active().await);

        // Suppression is sticky: even explicit commands do not start it
        t.session.dispatch(SessionCommand::Reconnect).await.unwrap();
        assert!(!t.session.is_active().await);
        assert_eq!(t.transport.count(), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn invalid_exclusion_pattern_is_skipped() {
        let config = PresenceConfig {
            workspace_exclude_patterns: vec!["[".to_string(), "no-match".to_string()],
            ..configured()
        };
        let t = session(config);
        t.session.activate().await.unwrap();
        assert!(t.session.is_active().await);
        t.session.shutdown().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn disabled_config_keeps_scheduler_stopped() {
        let config = PresenceConfig { enabled: false, ..configured() };
        let t = session(config);
        t.session.activate().await.unwrap();
        assert!(!t.session.is_active().await);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn disconnect_stops_and_reconnect_resumes() {
        let t = session(configured());
        t.session.activate().await.unwrap();

        t.session.dispatch(SessionCommand::Disconnect).await.unwrap();
        assert!(!t.session.is_active().await);

        t.session.dispatch(SessionCommand::Reconnect).await.unwrap();
        assert!(t.session.is_active().await);

        t.session.shutdown().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn disable_clears_indicator() {
        let t = session(configured());
        t.session.activate().await.unwrap();
        t.session.dispatch(SessionCommand::Disable).await.unwrap();

        assert!(!t.session.is_active().await);
        assert!(t.indicator.cleared.lock().map(|c| *c).unwrap_or(false));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn regenerate_user_id_persists_and_reconnects() {
        let t = session(configured());
        t.session.activate().await.unwrap();

        t.session.dispatch(SessionCommand::RegenerateUserId).await.unwrap();

        let stored = t.store.stored();
        assert_eq!(stored.len(), 1);
        assert_ne!(stored[0].user_id, "1234567890123456");
        assert_eq!(stored[0].auth_token, "token", "token survives a user id regen");
        assert!(t.session.is_active().await);

        t.session.shutdown().await.unwrap();
    }
}
