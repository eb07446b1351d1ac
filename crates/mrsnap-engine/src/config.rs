//! Run configuration
//!
//! Every field has a built-in default matching the public OpenHarmony
//! layout, so a config file only needs to name what differs.
//!
//! ```toml
//! organization = "openharmony"
//! jobs = 8
//! post_steps = [["repo", "forall", "-c", "git lfs pull"]]
//! ```

use mrsnap_core::errors::{io_error, ExError, ExErrorKind, Result};
use mrsnap_remote::{DEFAULT_API_BASE, DEFAULT_ORGANIZATION};
use mrsnap_vcs::ExternalCommand;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Config file looked up in the workspace root when none is given
pub const CONFIG_FILE_NAME: &str = "mrsnap.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Owner of every remote repository
    pub organization: String,
    pub api_base_url: String,
    /// Remote repository holding the manifest, also its cache entry name
    pub manifest_project: String,
    /// Manifest working tree, relative to the workspace root
    pub manifest_dir: String,
    /// Root manifest file inside `manifest_dir`
    pub manifest_file: String,
    pub init_command: ExternalCommand,
    pub sync_command: ExternalCommand,
    pub post_steps: Vec<ExternalCommand>,
    /// Concurrent remote lookups
    pub jobs: usize,
    pub http_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            organization: DEFAULT_ORGANIZATION.to_string(),
            api_base_url: DEFAULT_API_BASE.to_string(),
            manifest_project: "manifest".to_string(),
            manifest_dir: ".repo/manifests".to_string(),
            manifest_file: "default.xml".to_string(),
            init_command: ExternalCommand::new(
                "repo",
                [
                    "init",
                    "-u",
                    "https://gitee.com/openharmony/manifest.git",
                    "-b",
                    "master",
                    "-m",
                    "default.xml",
                    "--no-clone-bundle",
                    "--no-repo-verify",
                ],
            ),
            sync_command: ExternalCommand::new(
                "repo",
                ["sync", "-c", "--no-manifest-update", "--force-sync"],
            ),
            post_steps: vec![
                ExternalCommand::new("repo", ["forall", "-c", "git lfs pull"]),
                ExternalCommand::new("bash", ["build/prebuilts_download.sh"]),
            ],
            jobs: 4,
            http_timeout_secs: 30,
        }
    }
}

impl Settings {
    /// Resolve settings for a run against `workspace_root`
    ///
    /// An explicit file must exist. Otherwise `<workspace>/mrsnap.toml` is
    /// used when present, and the defaults when not.
    pub fn load(explicit: Option<&Path>, workspace_root: &Path) -> Result<Self> {
        match explicit {
            Some(path) => {
                if !path.is_file() {
                    return Err(config_error(
                        path,
                        "config file does not exist or is not a file",
                    ));
                }
                Self::from_file(path)
            }
            None => {
                let candidate = workspace_root.join(CONFIG_FILE_NAME);
                if candidate.is_file() {
                    Self::from_file(&candidate)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| io_error("config_read", path.display().to_string(), e))?;
        Self::from_toml_str(&text).map_err(|e| e.with_path(path.display().to_string()))
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(text).map_err(|e| {
            ExError::new(ExErrorKind::Config)
                .with_op("config_load")
                .with_message(format!("invalid config: {}", e))
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check invariants a TOML schema cannot express
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| {
            Err(ExError::new(ExErrorKind::Config)
                .with_op("config_validate")
                .with_message(msg))
        };
        if self.jobs == 0 {
            return invalid("jobs must be at least 1");
        }
        if self.http_timeout_secs == 0 {
            return invalid("http_timeout_secs must be at least 1");
        }
        if self.organization.trim().is_empty() {
            return invalid("organization must not be empty");
        }
        if self.manifest_project.trim().is_empty() {
            return invalid("manifest_project must not be empty");
        }
        if self.manifest_file.trim().is_empty() {
            return invalid("manifest_file must not be empty");
        }
        if Path::new(&self.manifest_dir).is_absolute() {
            return invalid("manifest_dir must be relative to the workspace");
        }
        Ok(())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

fn config_error(path: &Path, msg: &str) -> ExError {
    ExError::new(ExErrorKind::Config)
        .with_op("config_load")
        .with_path(path.display().to_string())
        .with_message(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        settings.validate().unwrap();
        assert_eq!(settings.jobs, 4);
        assert_eq!(settings.manifest_dir, ".repo/manifests");
        assert_eq!(
            settings.sync_command.to_string(),
            "repo sync -c --no-manifest-update --force-sync"
        );
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let settings = Settings::from_toml_str("jobs = 8\norganization = \"mirror\"\n").unwrap();
        assert_eq!(settings.jobs, 8);
        assert_eq!(settings.organization, "mirror");
        assert_eq!(settings.manifest_file, "default.xml");
    }

    #[test]
    fn test_zero_jobs_is_config_error() {
        let err = Settings::from_toml_str("jobs = 0").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Config);
    }

    #[test]
    fn test_unknown_field_is_config_error() {
        let err = Settings::from_toml_str("jbos = 2").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Config);
    }

    #[test]
    fn test_workspace_file_is_picked_up() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "jobs = 2\n").unwrap();
        assert_eq!(Settings::load(None, dir.path()).unwrap().jobs, 2);
    }

    #[test]
    fn test_missing_explicit_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let err = Settings::load(Some(&dir.path().join("nope.toml")), dir.path()).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Config);
    }

    #[test]
    fn test_no_file_means_defaults() {
        let dir = TempDir::new().unwrap();
        assert_eq!(Settings::load(None, dir.path()).unwrap(), Settings::default());
    }
}
