//! Workspace layout

use mrsnap_core::errors::{io_error, Result, SnapError};
use mrsnap_store::SnapshotCache;
use std::fs;
use std::path::{Path, PathBuf};

/// Super-repo metadata directory
pub const REPO_DIR: &str = ".repo";

/// A super-repo workspace root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Open `root`, creating the directory when it does not exist yet
    pub fn prepare(root: &Path) -> Result<Self> {
        if !root.exists() {
            fs::create_dir_all(root)
                .map_err(|e| io_error("workspace_create", root.display().to_string(), e))?;
            tracing::info!(workspace = %root.display(), "created workspace directory");
        }
        Self::open(root)
    }

    /// Open an existing workspace directory
    pub fn open(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(SnapError::WorkspaceNotDirectory {
                path: root.display().to_string(),
            }
            .into());
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn repo_dir(&self) -> PathBuf {
        self.root.join(REPO_DIR)
    }

    /// Whether the bulk sync tool has been initialised here
    pub fn is_initialized(&self) -> bool {
        self.repo_dir().is_dir()
    }

    pub fn require_initialized(&self) -> Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(SnapError::WorkspaceUninitialized {
                path: self.root.display().to_string(),
            }
            .into())
        }
    }

    pub fn cache_path(&self) -> PathBuf {
        SnapshotCache::path_in(&self.root)
    }

    /// Working tree of a project, given its workspace-relative path
    pub fn project_dir(&self, relative_path: &str) -> PathBuf {
        self.root.join(relative_path)
    }
}
