use thiserror::Error;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code used for programmatic handling,
/// log fields (`err_code`) and test assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Caller input
    InvalidInput,
    Config,

    // Run phases
    /// Workspace path missing, not a directory, or not initialised
    Workspace,
    /// Manifest file missing or malformed, or an include cycle
    Manifest,
    /// The commit provider answered with something other than a commit list
    ProviderSoftError,
    /// No commit exists for a project in the requested window or name
    ResolutionNotFound,
    /// An external command (repo, git, post-step) exited nonzero
    ExternalToolFailure,

    // Cache
    /// The persisted cache file exists but cannot be read as a snapshot cache
    CacheCorrupt,
    /// An existing cache entry would be overwritten with a different commit
    CacheConflict,

    // Integration/IO
    Io,
    Serialization,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Workspace => "ERR_WORKSPACE",
            ExErrorKind::Manifest => "ERR_MANIFEST",
            ExErrorKind::ProviderSoftError => "ERR_PROVIDER_SOFT",
            ExErrorKind::ResolutionNotFound => "ERR_RESOLUTION_NOT_FOUND",
            ExErrorKind::ExternalToolFailure => "ERR_EXTERNAL_TOOL",
            ExErrorKind::CacheCorrupt => "ERR_CACHE_CORRUPT",
            ExErrorKind::CacheConflict => "ERR_CACHE_CONFLICT",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification kind plus optional context fields that tell the
/// user which project, path or command was involved.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    project: Option<String>,
    path: Option<String>,
    command: Option<String>,
    snapshot_key: Option<String>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            project: None,
            path: None,
            command: None,
            snapshot_key: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add project name context
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Add filesystem path context
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add external command context
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Add snapshot key context
    pub fn with_snapshot_key(mut self, key: impl Into<String>) -> Self {
        self.snapshot_key = Some(key.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }

    pub fn snapshot_key(&self) -> Option<&str> {
        self.snapshot_key.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(project) = &self.project {
            write!(f, " (project: {})", project)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path)?;
        }
        if let Some(command) = &self.command {
            write!(f, " (command: {})", command)?;
        }
        if let Some(key) = &self.snapshot_key {
            write!(f, " (snapshot: {})", key)?;
        }
        if let Some(source) = &self.source {
            write!(f, "; caused by {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain failures raised across the resolution pipeline
///
/// Each variant converts into an `ExError` with the matching kind and
/// context, so call sites can stay terse and still produce structured errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SnapError {
    // ===== Workspace =====
    #[error("Workspace path is not a directory: {path}")]
    WorkspaceNotDirectory { path: String },

    #[error("Workspace has no super-repo metadata: {path}")]
    WorkspaceUninitialized { path: String },

    // ===== Manifest =====
    #[error("Failed to read manifest {path}: {reason}")]
    ManifestRead { path: String, reason: String },

    #[error("Malformed manifest {path}: {reason}")]
    ManifestParse { path: String, reason: String },

    #[error("Manifest {path}: <{element}> is missing the '{attribute}' attribute")]
    ManifestMissingAttribute {
        path: String,
        element: String,
        attribute: String,
    },

    #[error("Manifest include cycle through {path}")]
    IncludeCycle { path: String },

    // ===== Input =====
    #[error("Invalid time window: since {since} is after until {until}")]
    InvalidWindow { since: String, until: String },

    #[error("Invalid snapshot name: {reason}")]
    InvalidSnapshotName { reason: String },

    #[error("Invalid snapshot key '{key}': {reason}")]
    InvalidSnapshotKey { key: String, reason: String },

    // ===== Resolution =====
    #[error("No commit found for {project} in {key}")]
    NoCommitInWindow { project: String, key: String },

    #[error("Snapshot {key} has no entry for {project}")]
    NamedEntryMissing { project: String, key: String },

    #[error("Unexpected provider response for {project}: {detail}")]
    ProviderUnexpected { project: String, detail: String },

    // ===== External tools =====
    #[error("Command `{command}` failed in {cwd}: {status}")]
    CommandFailed {
        command: String,
        cwd: String,
        status: String,
    },

    #[error("Could not check out {commit} in {path}")]
    CheckoutFailed { path: String, commit: String },

    // ===== Cache =====
    #[error("Snapshot {key} already maps {project} to {existing}, refusing {attempted}")]
    CacheConflict {
        key: String,
        project: String,
        existing: String,
        attempted: String,
    },
}

impl From<SnapError> for ExError {
    fn from(err: SnapError) -> Self {
        let message = err.to_string();
        match err {
            SnapError::WorkspaceNotDirectory { path }
            | SnapError::WorkspaceUninitialized { path } => ExError::new(ExErrorKind::Workspace)
                .with_path(path)
                .with_message(message),

            SnapError::ManifestRead { path, .. }
            | SnapError::ManifestParse { path, .. }
            | SnapError::ManifestMissingAttribute { path, .. }
            | SnapError::IncludeCycle { path } => ExError::new(ExErrorKind::Manifest)
                .with_op("parse_manifest")
                .with_path(path)
                .with_message(message),

            SnapError::InvalidWindow { .. }
            | SnapError::InvalidSnapshotName { .. }
            | SnapError::InvalidSnapshotKey { .. } => {
                ExError::new(ExErrorKind::InvalidInput).with_message(message)
            }

            SnapError::NoCommitInWindow { project, key }
            | SnapError::NamedEntryMissing { project, key } => {
                ExError::new(ExErrorKind::ResolutionNotFound)
                    .with_op("resolve_commit")
                    .with_project(project)
                    .with_snapshot_key(key)
                    .with_message(message)
            }

            SnapError::ProviderUnexpected { project, .. } => {
                ExError::new(ExErrorKind::ProviderSoftError)
                    .with_op("resolve_commit")
                    .with_project(project)
                    .with_message(message)
            }

            SnapError::CommandFailed { command, cwd, .. } => {
                ExError::new(ExErrorKind::ExternalToolFailure)
                    .with_command(command)
                    .with_path(cwd)
                    .with_message(message)
            }

            SnapError::CheckoutFailed { path, .. } => {
                ExError::new(ExErrorKind::ExternalToolFailure)
                    .with_op("checkout")
                    .with_path(path)
                    .with_message(message)
            }

            SnapError::CacheConflict { key, project, .. } => {
                ExError::new(ExErrorKind::CacheConflict)
                    .with_op("cache_add")
                    .with_project(project)
                    .with_snapshot_key(key)
                    .with_message(message)
            }
        }
    }
}

/// Create an IO error
pub fn io_error(operation: &str, path: impl Into<String>, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_path(path)
        .with_message(err.to_string())
}
