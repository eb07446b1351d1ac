//! mrsnap Remote - commit history lookups
//!
//! Provides:
//! - `CommitSource`, the seam the orchestrator resolves commits through
//! - `GiteeClient`, an HTTP implementation against the Gitee v5 commits API
//! - `OfflineSource`, used when no remote may be contacted

pub mod gitee;
pub mod source;

pub use gitee::{ClientError, GiteeClient, DEFAULT_API_BASE, DEFAULT_ORGANIZATION};
pub use source::{CommitLookup, CommitSource, OfflineSource};
