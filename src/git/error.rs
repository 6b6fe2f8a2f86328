//! Error types for ref and status operations
//!
//! Uses anyhow for error propagation. GitError carries the semantic class of a
//! failure so callers can recover it with [`error_kind`] after `?` has turned it
//! into an `anyhow::Error`.

use std::path::PathBuf;

/// Broad class of a [`GitError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ErrorKind {
    /// A ref, remote, config key or repository lookup found nothing
    NotFound,
    /// The operation is not allowed for this ref's classification
    InvalidOperation,
    /// Ref creation collided with an existing name
    AlreadyExists,
    /// git exited non-zero
    ExternalToolFailure,
    /// Output or filesystem state that cannot be explained; callers should abort
    InternalConsistency,
}

#[derive(Debug)]
pub enum GitError {
    /// No ref, and no revision git could verify, for this name
    RefNotFound { name: String },
    /// A local branch has no `branch.<name>.remote` config
    NotTracking { branch: String },
    /// No `refs/remotes/<remote>/<branch>` in the loaded refs
    NoRemoteBranch { branch: String, remote: String },
    /// No repository in `path` or any of its parents
    RepositoryNotFound { path: PathBuf },
    /// The operation is disallowed for this ref
    InvalidOperation { path: String, reason: String },
    /// Ref creation collided with an existing ref
    RefAlreadyExists { name: String },
    /// git exited non-zero
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },
    /// Output or filesystem state that cannot be explained
    Internal { message: String },
}

impl GitError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GitError::RefNotFound { .. }
            | GitError::NotTracking { .. }
            | GitError::NoRemoteBranch { .. }
            | GitError::RepositoryNotFound { .. } => ErrorKind::NotFound,
            GitError::InvalidOperation { .. } => ErrorKind::InvalidOperation,
            GitError::RefAlreadyExists { .. } => ErrorKind::AlreadyExists,
            GitError::CommandFailed { .. } => ErrorKind::ExternalToolFailure,
            GitError::Internal { .. } => ErrorKind::InternalConsistency,
        }
    }

    /// True for errors the caller should treat as unrecoverable.
    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::InternalConsistency
    }

    pub(crate) fn invalid_operation(path: &str, reason: impl Into<String>) -> Self {
        GitError::InvalidOperation {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        GitError::Internal {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for GitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GitError::RefNotFound { name } => write!(f, "No ref for {name}"),
            GitError::NotTracking { branch } => {
                write!(f, "Branch {branch} does not track a remote")
            }
            GitError::NoRemoteBranch { branch, remote } => {
                write!(f, "Branch {branch} has no remote branch at {remote}")
            }
            GitError::RepositoryNotFound { path } => write!(
                f,
                "Could not find a git repository in {} or any of its parents",
                path.display()
            ),
            GitError::InvalidOperation { path, reason } => write!(f, "{path}: {reason}"),
            GitError::RefAlreadyExists { name } => write!(f, "{name} already exists"),
            GitError::CommandFailed {
                command,
                exit_code,
                stderr,
            } => {
                match exit_code {
                    Some(code) => write!(f, "`{command}` failed with exit code {code}")?,
                    None => write!(f, "`{command}` was terminated by a signal")?,
                }
                if !stderr.is_empty() {
                    write!(f, ": {stderr}")?;
                }
                Ok(())
            }
            GitError::Internal { message } => write!(f, "Internal error: {message}"),
        }
    }
}

impl std::error::Error for GitError {}

/// Extract the error class, if the error originated as a [`GitError`]
pub fn error_kind(err: &anyhow::Error) -> Option<ErrorKind> {
    err.downcast_ref::<GitError>().map(GitError::kind)
}

/// Check if the error is an internal-consistency failure
pub fn is_fatal(err: &anyhow::Error) -> bool {
    err.downcast_ref::<GitError>().is_some_and(GitError::is_fatal)
}
