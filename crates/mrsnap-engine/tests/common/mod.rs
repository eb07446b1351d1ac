use async_trait::async_trait;
use chrono::NaiveDate;
use mrsnap_core::errors::{ExError, ExErrorKind, Result, SnapError};
use mrsnap_core::{SnapshotKey, TimeWindow};
use mrsnap_engine::Settings;
use mrsnap_remote::{CommitLookup, CommitSource};
use mrsnap_vcs::{ExternalCommand, ToolRunner, Vcs};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

/// Commit source answering from a fixed table; unknown projects are `Empty`
#[derive(Default)]
pub struct FakeSource {
    answers: HashMap<String, CommitLookup>,
    calls: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl FakeSource {
    pub fn new(answers: &[(&str, CommitLookup)]) -> Self {
        Self {
            answers: answers
                .iter()
                .map(|(name, lookup)| (name.to_string(), lookup.clone()))
                .collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn found(answers: &[(&str, &str)]) -> Self {
        let table: Vec<(&str, CommitLookup)> = answers
            .iter()
            .map(|(name, sha)| (*name, CommitLookup::Found(sha.to_string())))
            .collect();
        Self::new(&table)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommitSource for FakeSource {
    async fn latest_commit(&self, project: &str, _window: &TimeWindow) -> CommitLookup {
        self.calls.lock().unwrap().push(project.to_string());
        self.answers
            .get(project)
            .cloned()
            .unwrap_or(CommitLookup::Empty)
    }
}

/// In-memory VCS: every reset succeeds unless its tree is marked broken
#[derive(Default)]
pub struct FakeVcs {
    heads: HashMap<PathBuf, String>,
    broken: HashSet<PathBuf>,
    resets: Mutex<Vec<(PathBuf, String)>>,
}

#[allow(dead_code)]
impl FakeVcs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_head(mut self, dir: PathBuf, commit: &str) -> Self {
        self.heads.insert(dir, commit.to_string());
        self
    }

    pub fn with_broken(mut self, dir: PathBuf) -> Self {
        self.broken.insert(dir);
        self
    }

    pub fn resets(&self) -> Vec<(PathBuf, String)> {
        self.resets.lock().unwrap().clone()
    }

    pub fn reset_dirs(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = self.resets().into_iter().map(|(dir, _)| dir).collect();
        dirs.dedup();
        dirs
    }
}

fn vcs_failure(dir: &Path) -> ExError {
    ExError::new(ExErrorKind::ExternalToolFailure)
        .with_command("git")
        .with_path(dir.display().to_string())
}

impl Vcs for FakeVcs {
    fn head(&self, dir: &Path) -> Result<Option<String>> {
        Ok(self.heads.get(dir).cloned())
    }

    fn reset_hard(&self, dir: &Path, commit: &str) -> Result<()> {
        self.resets
            .lock()
            .unwrap()
            .push((dir.to_path_buf(), commit.to_string()));
        if self.broken.contains(dir) {
            Err(vcs_failure(dir))
        } else {
            Ok(())
        }
    }

    fn fetch(&self, dir: &Path) -> Result<()> {
        if self.broken.contains(dir) {
            Err(vcs_failure(dir))
        } else {
            Ok(())
        }
    }
}

/// Records commands instead of running them
#[derive(Default)]
pub struct FakeRunner {
    fail_on: Option<String>,
    ran: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail any command whose display form starts with `prefix`
    pub fn failing_on(prefix: &str) -> Self {
        Self {
            fail_on: Some(prefix.to_string()),
            ran: Mutex::new(Vec::new()),
        }
    }

    pub fn ran(&self) -> Vec<String> {
        self.ran.lock().unwrap().clone()
    }
}

impl ToolRunner for FakeRunner {
    fn run(&self, command: &ExternalCommand, cwd: &Path) -> Result<()> {
        let line = command.to_string();
        self.ran.lock().unwrap().push(line.clone());
        match &self.fail_on {
            Some(prefix) if line.starts_with(prefix.as_str()) => Err(SnapError::CommandFailed {
                command: line,
                cwd: cwd.display().to_string(),
                status: "exit status: 1".to_string(),
            }
            .into()),
            _ => Ok(()),
        }
    }
}

/// Workspace with `.repo`, a default.xml listing `projects` and a working
/// tree directory per project
#[allow(dead_code)]
pub fn workspace_with(projects: &[&str]) -> TempDir {
    let dir = TempDir::new().unwrap();
    let manifests = dir.path().join(".repo").join("manifests");
    fs::create_dir_all(&manifests).unwrap();

    let mut xml = String::from("<manifest>\n");
    for name in projects {
        xml.push_str(&format!("  <project name=\"{}\" path=\"src/{}\"/>\n", name, name));
        fs::create_dir_all(dir.path().join("src").join(name)).unwrap();
    }
    xml.push_str("</manifest>\n");
    fs::write(manifests.join("default.xml"), xml).unwrap();
    dir
}

#[allow(dead_code)]
pub fn project_dir(ws: &TempDir, name: &str) -> PathBuf {
    ws.path().join("src").join(name)
}

#[allow(dead_code)]
pub fn manifest_dir(ws: &TempDir) -> PathBuf {
    ws.path().join(".repo/manifests")
}

#[allow(dead_code)]
pub fn range_key() -> SnapshotKey {
    SnapshotKey::range(
        TimeWindow::new(
            Some(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
            Some(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()),
        )
        .unwrap(),
    )
}

/// Defaults, with post steps that are easy to spot
#[allow(dead_code)]
pub fn settings() -> Settings {
    Settings {
        post_steps: vec![
            ExternalCommand::new("post", ["one"]),
            ExternalCommand::new("post", ["two"]),
        ],
        ..Settings::default()
    }
}
