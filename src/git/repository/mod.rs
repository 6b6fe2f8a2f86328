//! Repository - the aggregate root for ref and status queries.
//!
//! A [`Repository`] owns two lazily loaded caches: the ref map (see `refs.rs`)
//! and the config map (see `config.rs`). Both live in `RefCell`s, so a
//! `Repository` can be moved to another thread but not shared between threads.
//! Callers that need shared access serialize it themselves.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::process::Output;

use anyhow::Context;

use super::status::{StatusLines, parse_status};
use super::GitError;
use crate::settings::Settings;
use crate::shell_exec::Cmd;

mod config;
mod refs;

pub use config::ConfigMap;
pub use refs::{RefBase, RefMap, RefType};

/// A git repository located on disk.
///
/// # Examples
///
/// ```no_run
/// use gitrefs::Repository;
///
/// let repo = Repository::open(".")?;
/// let main = repo.find_ref("main")?;
/// let (clean, lines) = repo.is_clean()?;
/// if !clean {
///     for line in &lines {
///         println!("{line}");
///     }
/// }
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug)]
pub struct Repository {
    git_dir: PathBuf,
    work_dir: Option<PathBuf>,
    settings: Settings,
    /// `None` until first use, and again after invalidation.
    refs: RefCell<Option<RefMap>>,
    config: RefCell<Option<ConfigMap>>,
}

impl Repository {
    /// Create a repository handle without discovery.
    ///
    /// A `work_dir` of `None` makes this a raw (bare) repository.
    pub fn at(git_dir: impl Into<PathBuf>, work_dir: Option<PathBuf>, settings: Settings) -> Self {
        Self {
            git_dir: git_dir.into(),
            work_dir,
            settings,
            refs: RefCell::new(None),
            config: RefCell::new(None),
        }
    }

    /// Open the first git repository that owns `path`, walking up parent directories.
    ///
    /// An empty path means the current directory.
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let settings = Settings::load().context("Failed to load settings")?;
        Self::open_with(path, settings)
    }

    /// Like [`Repository::open`], running git as configured by `settings`.
    pub fn open_with(path: impl AsRef<Path>, settings: Settings) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let path = if path.as_os_str().is_empty() {
            Path::new(".")
        } else {
            path
        };
        let start = dunce::canonicalize(path).map_err(|e| {
            GitError::internal(format!("Could not stat {}: {}", path.display(), e))
        })?;

        for candidate in start.ancestors() {
            if let Some((git_dir, work_dir)) = find_repo(candidate)? {
                log::debug!(
                    "Found repository at {} (work dir: {:?})",
                    git_dir.display(),
                    work_dir
                );
                return Ok(Self::at(git_dir, work_dir, settings));
            }
        }

        Err(GitError::RepositoryNotFound { path: start }.into())
    }

    /// The directory holding git metadata.
    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    /// The working tree, or `None` for a raw repository.
    pub fn work_dir(&self) -> Option<&Path> {
        self.work_dir.as_deref()
    }

    /// Check if this is a raw (bare) repository.
    pub fn is_raw(&self) -> bool {
        self.work_dir.is_none()
    }

    /// The directory git commands run in: the working tree if there is one,
    /// the metadata directory otherwise.
    pub fn path(&self) -> &Path {
        self.work_dir.as_deref().unwrap_or(&self.git_dir)
    }

    fn git_cmd(&self, args: &[&str]) -> Cmd {
        let context = self
            .path()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path().display().to_string());
        Cmd::new(&self.settings.git)
            .args(args.iter().copied())
            .current_dir(self.path())
            .context(context)
    }

    /// Run git and return its raw output, whatever the exit status.
    fn git_output(&self, args: &[&str]) -> anyhow::Result<(String, Output)> {
        let cmd = self.git_cmd(args);
        let command = cmd.command_line();
        let output = cmd
            .run()
            .with_context(|| format!("Failed to execute {}", self.settings.git.display()))?;
        Ok((command, output))
    }

    /// Run a git command in this repository's context.
    ///
    /// Returns stdout on success. A non-zero exit becomes
    /// [`GitError::CommandFailed`] carrying git's stderr.
    pub fn run_command(&self, args: &[&str]) -> anyhow::Result<String> {
        let (command, output) = self.git_output(args)?;
        if !output.status.success() {
            return Err(command_failed(command, &output).into());
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Run a git command and report only whether it exited successfully.
    pub fn run_command_check(&self, args: &[&str]) -> anyhow::Result<bool> {
        let (_, output) = self.git_output(args)?;
        Ok(output.status.success())
    }

    /// Check out a branch, tag or revision.
    ///
    /// HEAD moves, so the ref cache is invalidated.
    pub fn checkout(&self, rev: &str) -> anyhow::Result<()> {
        self.run_command(&["checkout", "-q", rev])?;
        self.reload_refs();
        Ok(())
    }

    /// Parse `git status --porcelain -z` into per-path records.
    pub fn status(&self) -> anyhow::Result<StatusLines> {
        let output = self.run_command(&["status", "--porcelain", "-z"])?;
        Ok(parse_status(&output)?)
    }

    /// Check for uncommitted or untracked changes.
    ///
    /// Returns whether the working tree is clean, along with every changed path
    /// so callers can report specifics.
    pub fn is_clean(&self) -> anyhow::Result<(bool, StatusLines)> {
        let lines = self.status()?;
        Ok((lines.is_empty(), lines))
    }
}

/// Reject a caller-supplied name that git would parse as an option.
pub(crate) fn reject_option_like(name: &str) -> Result<(), GitError> {
    if name.is_empty() || name.starts_with('-') {
        return Err(GitError::invalid_operation(
            name,
            "Names must be non-empty and must not start with '-'",
        ));
    }
    Ok(())
}

fn command_failed(command: String, output: &Output) -> GitError {
    GitError::CommandFailed {
        command,
        exit_code: output.status.code(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
}

/// Check whether `path` is a repository.
///
/// Returns the metadata directory and, for non-bare repositories, the working tree.
fn find_repo(path: &Path) -> anyhow::Result<Option<(PathBuf, Option<PathBuf>)>> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| GitError::internal(format!("Could not stat {}: {}", path.display(), e)))?;
    if !metadata.is_dir() {
        return Err(GitError::internal(format!("{} is not a directory", path.display())).into());
    }

    let is_bare_name = path
        .file_name()
        .is_some_and(|name| name.to_string_lossy().ends_with(".git"));
    if is_bare_name && path.join("config").is_file() {
        return Ok(Some((path.to_path_buf(), None)));
    }

    let dot_git = path.join(".git");
    if dot_git.join("config").is_file() {
        return Ok(Some((dot_git, Some(path.to_path_buf()))));
    }

    // Linked worktrees and submodules have a `.git` file pointing at the real metadata
    if dot_git.is_file() {
        let contents = std::fs::read_to_string(&dot_git)
            .with_context(|| format!("Failed to read {}", dot_git.display()))?;
        if let Some(target) = contents.trim().strip_prefix("gitdir:") {
            return Ok(Some((path.join(target.trim()), Some(path.to_path_buf()))));
        }
    }

    Ok(None)
}
