//! Domain model: projects, time windows, snapshot keys and commit records

pub mod key;
pub mod project;
pub mod window;

pub use key::SnapshotKey;
pub use project::{dedup_last_wins, index_by_name, CommitRecord, Project};
pub use window::TimeWindow;
