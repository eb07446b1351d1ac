//! Checkout driver: reset, fetch once, reset again

use crate::git::Vcs;
use mrsnap_core::{log_op_end, log_op_start};
use std::path::Path;
use std::time::Instant;

/// Moves working trees to pinned commits
pub struct CheckoutDriver<'a> {
    vcs: &'a dyn Vcs,
}

impl<'a> CheckoutDriver<'a> {
    pub fn new(vcs: &'a dyn Vcs) -> Self {
        Self { vcs }
    }

    /// Check out `commit` in `working_tree`
    ///
    /// Tries `reset --hard` first. If that fails the tree is fetched once and
    /// the reset retried; the retry decides the outcome. Never raises, every
    /// failure is logged and reported as `false`.
    pub fn apply(&self, working_tree: &Path, commit: &str) -> bool {
        let start = Instant::now();
        log_op_start!("checkout", path = %working_tree.display(), commit);

        if !working_tree.is_dir() {
            tracing::warn!(
                path = %working_tree.display(),
                commit,
                "working tree does not exist"
            );
            return false;
        }

        if let Err(first) = self.vcs.reset_hard(working_tree, commit) {
            tracing::info!(
                path = %working_tree.display(),
                commit,
                error = %first,
                "commit not present locally, fetching"
            );

            if let Err(err) = self.vcs.fetch(working_tree) {
                tracing::warn!(
                    path = %working_tree.display(),
                    commit,
                    command = err.command().unwrap_or("fetch"),
                    error = %err,
                    "fetch failed"
                );
                return false;
            }

            if let Err(err) = self.vcs.reset_hard(working_tree, commit) {
                tracing::warn!(
                    path = %working_tree.display(),
                    commit,
                    command = err.command().unwrap_or("reset"),
                    error = %err,
                    "reset failed after fetch"
                );
                return false;
            }
        }

        log_op_end!(
            "checkout",
            duration_ms = start.elapsed().as_millis() as u64,
            path = %working_tree.display(),
            commit
        );
        true
    }
}
