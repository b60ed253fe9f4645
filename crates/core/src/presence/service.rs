//! Presence builder - core business logic

use std::sync::Arc;

use beacon_domain::constants::UNKNOWN_MARKER;
use beacon_domain::{PresenceConfig, PresenceSnapshot, Result, VcsFacts};
use tracing::warn;
use url::Url;

use crate::languages::resolve_language;
use crate::ports::{EditorStateProvider, VcsProvider};
use crate::template::{self, TemplateContext};

/// Assembles presence snapshots from current editor, session, and
/// version-control facts.
pub struct PresenceService {
    editor: Arc<dyn EditorStateProvider>,
    vcs: Arc<dyn VcsProvider>,
}

impl PresenceService {
    /// Create a new presence service
    pub fn new(editor: Arc<dyn EditorStateProvider>, vcs: Arc<dyn VcsProvider>) -> Self {
        Self { editor, vcs }
    }

    /// Build a snapshot of the current activity.
    ///
    /// Template selection: debugging while a debug session is active, editing
    /// while a document is focused, idling otherwise. When nothing material
    /// changed since `previous`, its timestamp is carried forward to avoid
    /// timestamp churn.
    pub async fn build_snapshot(
        &self,
        previous: Option<&PresenceSnapshot>,
        config: &PresenceConfig,
    ) -> Result<PresenceSnapshot> {
        let facts = self.editor.capture().await?;

        // A VCS failure degrades to "no repository", it never blocks a cycle
        let vcs = match self.vcs.facts().await {
            Ok(vcs) => vcs,
            Err(err) => {
                warn!(error = %err, "Failed to resolve version-control facts");
                VcsFacts::default()
            }
        };

        let has_document = facts.file_name.is_some();
        let language = has_document
            .then(|| resolve_language(facts.file_name.as_deref(), facts.language_id.as_deref()));
        let repo_name = vcs.remote_url.as_deref().and_then(repo_name_from_remote);

        let ctx = TemplateContext {
            app_name: facts.app_name.clone(),
            file_name: facts.file_name.clone(),
            directory_name: facts.directory_name.clone(),
            full_directory_name: facts.relative_directory.clone(),
            language_label: language.map(|info| info.label.to_string()),
            total_lines: facts.total_lines,
            current_line: facts.cursor_line,
            current_column: facts.cursor_column,
            file_size_bytes: facts.file_size_bytes,
            workspace: facts.workspace_name.clone(),
            workspace_folder: facts.workspace_folder.clone(),
            git_branch: vcs.branch.clone(),
            git_repo_name: repo_name.clone(),
        };

        let chosen = if facts.is_debugging {
            &config.template_debugging
        } else if has_document {
            &config.template_editing
        } else {
            &config.template_idling
        };

        let mut snapshot = PresenceSnapshot {
            details: template::resolve(chosen, &ctx),
            file_name: facts.file_name,
            language: language.map(|info| info.label.to_string()),
            language_icon: language.map(|info| info.icon.to_string()),
            workspace_name: facts.workspace_name,
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
            is_debugging: facts.is_debugging,
            // Structured fields fall back to the literal marker, unlike the
            // zero-width marker used inside resolved templates
            git_branch: Some(vcs.branch.unwrap_or_else(|| UNKNOWN_MARKER.to_string())),
            git_repo_name: Some(repo_name.unwrap_or_else(|| UNKNOWN_MARKER.to_string())),
            app_name: facts.app_name,
        };

        if let Some(prev) = previous {
            if prev.same_activity(&snapshot) {
                snapshot.timestamp_ms = prev.timestamp_ms;
            }
        }

        Ok(snapshot)
    }
}

/// Derive the repository name from a remote fetch URL: the first path segment
/// after the host, with a trailing `.git` stripped.
fn repo_name_from_remote(remote: &str) -> Option<String> {
    let path = match Url::parse(remote) {
        Ok(url) => url.path().trim_start_matches('/').to_string(),
        // scp-like syntax: git@host:path
        Err(_) => remote.rsplit_once(':')?.1.trim_start_matches('/').to_string(),
    };
    let first = path.split('/').next()?;
    let name = first.strip_suffix(".git").unwrap_or(first);
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use beacon_domain::{EditorFacts, Result};

    use super::*;
    use crate::template::EMPTY_MARKER;

    struct StubEditor {
        facts: Mutex<EditorFacts>,
    }

    #[async_trait]
    impl EditorStateProvider for StubEditor {
        async fn capture(&self) -> Result<EditorFacts> {
            Ok(self.facts.lock().map(|f| f.clone()).unwrap_or_default())
        }

        async fn workspace_roots(&self) -> Result<Vec<String>> {
            Ok(vec!["/home/dev/beacon".to_string()])
        }
    }

    struct StubVcs {
        facts: VcsFacts,
    }

    #[async_trait]
    impl VcsProvider for StubVcs {
        async fn facts(&self) -> Result<VcsFacts> {
            Ok(self.facts.clone())
        }
    }

    fn editing_facts() -> EditorFacts {
        EditorFacts {
            app_name: "TestEditor".to_string(),
            file_name: Some("main.rs".to_string()),
            directory_name: Some("src".to_string()),
            relative_directory: Some("crates/core/src".to_string()),
            language_id: Some("rust".to_string()),
            total_lines: Some(100),
            cursor_line: Some(10),
            cursor_column: Some(4),
            file_size_bytes: Some(640),
            workspace_name: Some("beacon".to_string()),
            workspace_folder: Some("core".to_string()),
            is_debugging: false,
        }
    }

    fn service(facts: EditorFacts, vcs: VcsFacts) -> PresenceService {
        PresenceService::new(
            Arc::new(StubEditor { facts: Mutex::new(facts) }),
            Arc::new(StubVcs { facts: vcs }),
        )
    }

    fn config() -> PresenceConfig {
        PresenceConfig {
            template_idling: "Idling".to_string(),
            template_editing: "Editing {file_name} on {git_branch}".to_string(),
            template_debugging: "Debugging {file_name}".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn editing_template_selected_when_document_focused() {
        let vcs = VcsFacts {
            branch: Some("main".to_string()),
            remote_url: Some("https://github.com/beacon.git".to_string()),
        };
        let svc = service(editing_facts(), vcs);

        let snapshot = svc.build_snapshot(None, &config()).await.unwrap();
        assert_eq!(snapshot.details, "Editing main.rs on main");
        assert_eq!(snapshot.language.as_deref(), Some("Rust"));
        assert_eq!(snapshot.language_icon.as_deref(), Some("rust"));
        assert_eq!(snapshot.git_repo_name.as_deref(), Some("beacon"));
    }

    #[tokio::test]
    async fn idling_template_selected_without_document() {
        let svc = service(
            EditorFacts { app_name: "TestEditor".to_string(), ..Default::default() },
            VcsFacts::default(),
        );

        let snapshot = svc.build_snapshot(None, &config()).await.unwrap();
        assert_eq!(snapshot.details, "Idling");
        assert!(snapshot.language.is_none());
    }

    #[tokio::test]
    async fn debugging_template_wins_over_editing() {
        let mut facts = editing_facts();
        facts.is_debugging = true;
        let svc = service(facts, VcsFacts::default());

        let snapshot = svc.build_snapshot(None, &config()).await.unwrap();
        assert_eq!(snapshot.details, "Debugging main.rs");
        assert!(snapshot.is_debugging);
    }

    #[tokio::test]
    async fn missing_repository_uses_two_distinct_markers() {
        let svc = service(editing_facts(), VcsFacts::default());

        let snapshot = svc.build_snapshot(None, &config()).await.unwrap();
        // Structured fields: literal marker
        assert_eq!(snapshot.git_branch.as_deref(), Some(UNKNOWN_MARKER));
        assert_eq!(snapshot.git_repo_name.as_deref(), Some(UNKNOWN_MARKER));
        // Template substitution: zero-width marker
        assert_eq!(snapshot.details, format!("Editing main.rs on {EMPTY_MARKER}"));
    }

    #[tokio::test]
    async fn timestamp_carried_forward_when_unchanged() {
        let svc = service(editing_facts(), VcsFacts::default());
        let cfg = config();

        let first = svc.build_snapshot(None, &cfg).await.unwrap();
        let second = svc.build_snapshot(Some(&first), &cfg).await.unwrap();
        assert_eq!(first.timestamp_ms, second.timestamp_ms);
    }

    #[tokio::test]
    async fn timestamp_refreshed_on_material_change() {
        let editor = Arc::new(StubEditor { facts: Mutex::new(editing_facts()) });
        let svc = PresenceService::new(
            editor.clone(),
            Arc::new(StubVcs { facts: VcsFacts::default() }),
        );
        let cfg = config();

        let first = svc.build_snapshot(None, &cfg).await.unwrap();
        if let Ok(mut facts) = editor.facts.lock() {
            facts.file_name = Some("lib.rs".to_string());
        }
        let second = svc.build_snapshot(Some(&first), &cfg).await.unwrap();
        assert!(!first.same_activity(&second));
        assert!(second.timestamp_ms >= first.timestamp_ms);
    }

    #[test]
    fn repo_name_from_https_remote() {
        assert_eq!(
            repo_name_from_remote("https://github.com/beacon.git"),
            Some("beacon".to_string())
        );
        assert_eq!(
            repo_name_from_remote("https://git.example.com/tools/presence"),
            Some("tools".to_string())
        );
    }

    #[test]
    fn repo_name_from_scp_remote() {
        assert_eq!(
            repo_name_from_remote("git@github.com:beacon.git"),
            Some("beacon".to_string())
        );
    }

    #[test]
    fn repo_name_rejects_empty() {
        assert_eq!(repo_name_from_remote("https://github.com/"), None);
        assert_eq!(repo_name_from_remote("not a url"), None);
    }
}
