//! Commit source trait and lookup outcome

use async_trait::async_trait;
use mrsnap_core::TimeWindow;

/// Outcome of asking a history provider for a project's latest commit
///
/// Lookups never raise: soft provider failures are reported as values so
/// the orchestrator decides whether the run continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitLookup {
    /// Newest commit inside the window
    Found(String),
    /// The provider returned an empty history for the window
    Empty,
    /// The provider answered with something other than a commit list
    Unexpected(String),
}

/// Remote provider of per-project commit history
#[async_trait]
pub trait CommitSource: Send + Sync {
    /// Most recent commit of `project` within `window`
    async fn latest_commit(&self, project: &str, window: &TimeWindow) -> CommitLookup;
}

/// Source that refuses every lookup
///
/// Used for runs that must be served from the cache alone, e.g. replaying a
/// named snapshot without an access token.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineSource;

#[async_trait]
impl CommitSource for OfflineSource {
    async fn latest_commit(&self, project: &str, _window: &TimeWindow) -> CommitLookup {
        tracing::warn!(project, "remote lookup requested while offline");
        CommitLookup::Unexpected("remote lookups are disabled (no access token)".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_source_never_finds_a_commit() {
        let lookup = OfflineSource
            .latest_commit("build", &TimeWindow::latest())
            .await;
        assert!(matches!(lookup, CommitLookup::Unexpected(ref d) if d.contains("disabled")));
    }
}
