//! Ref - a handle for ref-specific git operations.

use super::{GitError, Repository};

/// Classification of a ref, derived from its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum RefKind {
    /// `refs/heads/*`
    Local,
    /// `refs/remotes/*`
    Remote,
    /// `refs/tags/*`
    Tag,
    /// `HEAD`
    Head,
    /// A revision with no symbolic path
    Raw,
    /// Anything else under `refs/` (notes, stash, ...)
    Other,
}

/// A resolved pointer to a commit: a path such as `refs/heads/main` and the
/// SHA it pointed at when the ref cache was loaded.
///
/// The SHA and path never change. Mutating operations update git and the
/// repository's cache; the handle itself goes stale and should be looked up
/// again.
///
/// # Examples
///
/// ```no_run
/// use gitrefs::Repository;
///
/// let repo = Repository::open(".")?;
/// let main = repo.find_ref("main")?;
/// let topic = repo.find_ref("topic")?;
///
/// if main.contains(&topic)? {
///     topic.delete()?;
/// }
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct Ref<'a> {
    repo: &'a Repository,
    sha: String,
    path: String,
}

impl PartialEq for Ref<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.repo, other.repo) && self.sha == other.sha && self.path == other.path
    }
}

impl Eq for Ref<'_> {}

impl<'a> Ref<'a> {
    pub(crate) fn new(repo: &'a Repository, sha: &str, path: &str) -> Self {
        Self {
            repo,
            sha: sha.to_string(),
            path: path.to_string(),
        }
    }

    /// The commit SHA, or for a raw ref the revision it was resolved from.
    pub fn sha(&self) -> &str {
        &self.sha
    }

    /// The fully-qualified path (`refs/heads/main`, `HEAD`, ...).
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn repository(&self) -> &'a Repository {
        self.repo
    }

    pub fn kind(&self) -> RefKind {
        if self.is_head() {
            RefKind::Head
        } else if self.is_local() {
            RefKind::Local
        } else if self.is_remote() {
            RefKind::Remote
        } else if self.is_tag() {
            RefKind::Tag
        } else if self.is_raw() {
            RefKind::Raw
        } else {
            RefKind::Other
        }
    }

    /// Local branches are the only refs we mutate in place.
    pub fn is_local(&self) -> bool {
        self.path.starts_with("refs/heads/")
    }

    /// Remote-tracking refs only move on fetch or push.
    pub fn is_remote(&self) -> bool {
        self.path.starts_with("refs/remotes/")
    }

    pub fn is_tag(&self) -> bool {
        self.path.starts_with("refs/tags/")
    }

    pub fn is_head(&self) -> bool {
        self.path == "HEAD"
    }

    /// No symbolic path was found for this ref.
    pub fn is_raw(&self) -> bool {
        self.sha == self.path
    }

    /// The short name.
    ///
    /// The namespace is stripped (`refs/heads/feature/login` is
    /// `feature/login`). For remote-tracking refs the remote is stripped as
    /// well (`refs/remotes/origin/main` is `main`); see [`Ref::remote`].
    pub fn name(&self) -> &str {
        let Some(rest) = self.path.strip_prefix("refs/") else {
            return &self.path;
        };
        let short = rest.split_once('/').map_or(rest, |(_, short)| short);
        if self.is_remote() {
            short.split_once('/').map_or(short, |(_, branch)| branch)
        } else {
            short
        }
    }

    /// The remote a remote-tracking ref belongs to.
    pub fn remote(&self) -> anyhow::Result<&str> {
        self.path
            .strip_prefix("refs/remotes/")
            .and_then(|rest| rest.split_once('/'))
            .map(|(remote, _)| remote)
            .ok_or_else(|| {
                GitError::invalid_operation(&self.path, "Not a remote-tracking ref").into()
            })
    }

    fn require_local(&self, reason: &str) -> Result<(), GitError> {
        if self.is_local() {
            Ok(())
        } else {
            Err(GitError::invalid_operation(&self.path, reason))
        }
    }

    /// Delete this branch or tag.
    ///
    /// Branches are deleted with `git branch -d`, so git refuses unmerged
    /// branches and that failure is returned. HEAD and remote-tracking refs
    /// are rejected without running git.
    pub fn delete(&self) -> anyhow::Result<()> {
        let subcommand = match self.kind() {
            RefKind::Local => "branch",
            RefKind::Tag => "tag",
            RefKind::Head => {
                return Err(GitError::invalid_operation(&self.path, "Cannot delete HEAD").into());
            }
            RefKind::Remote => {
                return Err(
                    GitError::invalid_operation(&self.path, "Cannot delete a remote ref").into(),
                );
            }
            RefKind::Raw | RefKind::Other => {
                return Err(GitError::invalid_operation(
                    &self.path,
                    "Only branches and tags can be deleted",
                )
                .into());
            }
        };

        self.repo.run_command(&[subcommand, "-d", self.name()])?;
        self.repo.forget_ref(&self.path);
        Ok(())
    }

    /// Check out this ref.
    ///
    /// Branches and tags are checked out by name; anything else detaches HEAD
    /// at the SHA.
    pub fn checkout(&self) -> anyhow::Result<()> {
        let rev = if self.is_local() || self.is_tag() {
            self.name()
        } else {
            self.sha.as_str()
        };
        self.repo.checkout(rev)
    }

    /// Check if every commit reachable from `other` is reachable from this ref.
    pub fn contains(&self, other: &Ref<'_>) -> anyhow::Result<bool> {
        if !std::ptr::eq(self.repo, other.repo) {
            return Err(GitError::invalid_operation(
                &other.path,
                "Cannot compare refs from different repositories",
            )
            .into());
        }
        // A ref always contains itself
        if self.sha == other.sha {
            return Ok(true);
        }
        // Commits in other's history that are not in ours
        let output =
            self.repo
                .run_command(&["rev-list", &other.sha, &format!("^{}", self.sha), "--"])?;
        Ok(output.trim().is_empty())
    }

    /// The remote this branch tracks (`branch.<name>.remote`).
    pub fn tracks(&self) -> anyhow::Result<String> {
        self.require_local("Not a branch, it does not track anything")?;
        self.repo
            .config_get(&format!("branch.{}.remote", self.name()))?
            .ok_or_else(|| {
                GitError::NotTracking {
                    branch: self.name().to_string(),
                }
                .into()
            })
    }

    /// The remote-tracking ref for this branch on `remote`.
    ///
    /// Only consults refs already loaded; it never triggers a reload.
    pub fn remote_branch(&self, remote: &str) -> anyhow::Result<Ref<'a>> {
        self.require_local("Not a branch, it has no remote-tracking branch")?;
        self.repo
            .cached_ref(&format!("refs/remotes/{}/{}", remote, self.name()))
            .ok_or_else(|| {
                GitError::NoRemoteBranch {
                    branch: self.name().to_string(),
                    remote: remote.to_string(),
                }
                .into()
            })
    }

    /// Check if `remote` has a remote-tracking ref for this branch.
    ///
    /// Always false for anything but a local branch.
    pub fn has_remote_ref(&self, remote: &str) -> anyhow::Result<bool> {
        if !self.is_local() {
            return Ok(false);
        }
        self.repo
            .has_ref(&format!("refs/remotes/{}/{}", remote, self.name()))
    }

    /// Make this branch track the same-named branch on `remote`.
    ///
    /// No-op when `branch.<name>.remote` and `branch.<name>.merge` already say
    /// so. Otherwise any existing `branch.<name>` section is removed before
    /// both keys are written, which also repairs a half-configured branch.
    pub fn track_remote(&self, remote: &str) -> anyhow::Result<()> {
        self.require_local("Not a branch, it cannot track a remote")?;
        super::repository::reject_option_like(remote)?;

        let section = format!("branch.{}", self.name());
        let remote_key = format!("{section}.remote");
        let merge_key = format!("{section}.merge");

        let current_remote = self.repo.config_get(&remote_key)?;
        let current_merge = self.repo.config_get(&merge_key)?;
        if current_remote.as_deref() == Some(remote)
            && current_merge.as_deref() == Some(self.path.as_str())
        {
            log::debug!("{} already tracks {}", self.name(), remote);
            return Ok(());
        }

        if self.repo.config_has_section(&section)? {
            self.repo.config_remove_section(&section)?;
        }
        self.repo.config_set(&remote_key, remote)?;
        self.repo.config_set(&merge_key, &self.path)?;
        Ok(())
    }
}
