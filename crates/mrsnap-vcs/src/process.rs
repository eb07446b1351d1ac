//! External command invocation

use mrsnap_core::errors::{ExError, ExErrorKind, Result, SnapError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::process::{Command, Output};

/// A program plus its arguments, run without a shell
///
/// Configured as a TOML string array, e.g. `["repo", "sync", "-c"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ExternalCommand {
    program: String,
    args: Vec<String>,
}

impl ExternalCommand {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl TryFrom<Vec<String>> for ExternalCommand {
    type Error = String;

    fn try_from(mut parts: Vec<String>) -> std::result::Result<Self, Self::Error> {
        if parts.is_empty() || parts[0].trim().is_empty() {
            return Err("command must name a program".to_string());
        }
        let program = parts.remove(0);
        Ok(Self {
            program,
            args: parts,
        })
    }
}

impl From<ExternalCommand> for Vec<String> {
    fn from(cmd: ExternalCommand) -> Self {
        let mut parts = Vec::with_capacity(cmd.args.len() + 1);
        parts.push(cmd.program);
        parts.extend(cmd.args);
        parts
    }
}

impl fmt::Display for ExternalCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_word(f, &self.program)?;
        for arg in &self.args {
            f.write_str(" ")?;
            write_word(f, arg)?;
        }
        Ok(())
    }
}

/// Write `word` so a POSIX shell would read it back unchanged
fn write_word(f: &mut fmt::Formatter<'_>, word: &str) -> fmt::Result {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:@,+%".contains(c));
    if plain {
        f.write_str(word)
    } else {
        write!(f, "'{}'", word.replace('\'', r"'\''"))
    }
}

/// Runs external tools to completion
pub trait ToolRunner: Send + Sync {
    /// Run `command` inside `cwd`; any nonzero exit is an `ExternalToolFailure`
    fn run(&self, command: &ExternalCommand, cwd: &Path) -> Result<()>;
}

/// Runs commands as child processes, inheriting stdout and stderr
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run(&self, command: &ExternalCommand, cwd: &Path) -> Result<()> {
        announce(command, cwd);
        let status = Command::new(command.program())
            .args(command.args())
            .current_dir(cwd)
            .status()
            .map_err(|e| spawn_error(command, cwd, e))?;

        if status.success() {
            Ok(())
        } else {
            Err(SnapError::CommandFailed {
                command: command.to_string(),
                cwd: cwd.display().to_string(),
                status: status.to_string(),
            }
            .into())
        }
    }
}

/// Run `command` in `cwd` capturing its output; the exit status is left to the caller
///
/// Runs under the C locale so callers can match on diagnostic text.
pub(crate) fn capture(command: &ExternalCommand, cwd: &Path) -> Result<Output> {
    announce(command, cwd);
    Command::new(command.program())
        .args(command.args())
        .current_dir(cwd)
        .env("LC_ALL", "C")
        .output()
        .map_err(|e| spawn_error(command, cwd, e))
}

fn announce(command: &ExternalCommand, cwd: &Path) {
    tracing::info!(command = %command, cwd = %cwd.display(), "running external command");
}

fn spawn_error(command: &ExternalCommand, cwd: &Path, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::ExternalToolFailure)
        .with_op("spawn")
        .with_command(command.to_string())
        .with_path(cwd.display().to_string())
        .with_message(format!("could not start {}: {}", command.program(), err))
}
