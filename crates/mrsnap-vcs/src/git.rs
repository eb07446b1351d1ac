//! Version-control operations on a single working tree

use crate::process::{capture, ExternalCommand};
use mrsnap_core::errors::{Result, SnapError};
use std::path::Path;
use std::process::Output;

/// Per-project version-control operations
///
/// All operations are synchronous and run with `dir` as their working
/// directory.
pub trait Vcs: Send + Sync {
    /// Commit checked out in `dir`, or `None` when `dir` is not a working tree
    fn head(&self, dir: &Path) -> Result<Option<String>>;

    /// Move `dir` to `commit`, discarding local changes
    fn reset_hard(&self, dir: &Path, commit: &str) -> Result<()>;

    /// Fetch from the default remote
    fn fetch(&self, dir: &Path) -> Result<()>;
}

/// `Vcs` backed by the `git` executable
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
}

impl Default for GitCli {
    fn default() -> Self {
        Self {
            program: "git".to_string(),
        }
    }
}

impl GitCli {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific git executable
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, args: &[&str]) -> ExternalCommand {
        ExternalCommand::new(self.program.as_str(), args.iter().copied())
    }

    fn run_checked(&self, dir: &Path, args: &[&str]) -> Result<Output> {
        let command = self.command(args);
        let output = capture(&command, dir)?;
        if output.status.success() {
            Ok(output)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::debug!(command = %command, stderr = %stderr.trim(), "git failed");
            Err(SnapError::CommandFailed {
                command: command.to_string(),
                cwd: dir.display().to_string(),
                status: output.status.to_string(),
            }
            .into())
        }
    }
}

impl Vcs for GitCli {
    fn head(&self, dir: &Path) -> Result<Option<String>> {
        // Without its own .git, git would walk up and report an enclosing repository
        if !dir.is_dir() || !dir.join(".git").exists() {
            return Ok(None);
        }

        let command = self.command(&["rev-parse", "HEAD"]);
        let output = capture(&command, dir)?;
        if output.status.success() {
            let sha = String::from_utf8_lossy(&output.stdout).trim().to_string();
            return Ok(if sha.is_empty() { None } else { Some(sha) });
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.contains("not a git repository") {
            Ok(None)
        } else {
            Err(SnapError::CommandFailed {
                command: command.to_string(),
                cwd: dir.display().to_string(),
                status: format!("{} ({})", output.status, stderr.trim()),
            }
            .into())
        }
    }

    fn reset_hard(&self, dir: &Path, commit: &str) -> Result<()> {
        self.run_checked(dir, &["reset", "--hard", commit]).map(|_| ())
    }

    fn fetch(&self, dir: &Path) -> Result<()> {
        self.run_checked(dir, &["fetch"]).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_head_of_missing_dir_is_none() {
        let git = GitCli::with_program("mrsnap-no-such-git");
        let head = git
            .head(Path::new("/definitely/not/a/working/tree"))
            .unwrap();
        assert_eq!(head, None);
    }

    #[test]
    fn test_command_uses_configured_program() {
        let git = GitCli::with_program("/opt/git/bin/git");
        assert_eq!(
            git.command(&["reset", "--hard", "abc"]).to_string(),
            "/opt/git/bin/git reset --hard abc"
        );
    }
}
