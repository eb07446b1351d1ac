pub mod download;
pub mod snapshot;
