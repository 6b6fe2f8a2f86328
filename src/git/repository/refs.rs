//! Ref cache, resolution and creation for Repository.

use indexmap::IndexMap;

use super::Repository;
use crate::git::{GitError, Ref};

/// Namespaces tried, in order, when resolving a short name.
const RESOLVE_PREFIXES: [&str; 4] = ["", "refs/heads/", "refs/tags/", "refs/remotes/"];

/// Refs keyed by fully-qualified path, in the order git listed them.
///
/// Keying by path keeps a branch and a tag with the same short name apart;
/// [`RefMap::lookup`] is the short-name index with a fixed tie-break order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefMap {
    /// path -> sha
    refs: IndexMap<String, String>,
}

impl RefMap {
    /// Parse `<sha> <path>` lines, as printed by `git show-ref`.
    ///
    /// Only the first space separates the fields; the rest of the line is the path.
    pub fn parse(output: &str) -> Result<Self, GitError> {
        let mut refs = IndexMap::new();
        for line in output.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (sha, path) = line
                .split_once(' ')
                .ok_or_else(|| GitError::internal(format!("malformed ref line {line:?}")))?;
            refs.insert(path.to_string(), sha.to_string());
        }
        Ok(Self { refs })
    }

    /// Exact lookup by fully-qualified path. Returns `(path, sha)`.
    pub fn get(&self, path: &str) -> Option<(&str, &str)> {
        self.refs
            .get_key_value(path)
            .map(|(path, sha)| (path.as_str(), sha.as_str()))
    }

    /// Resolve a name: exact path first, then as a branch, tag and remote-tracking ref.
    pub fn lookup(&self, name: &str) -> Option<(&str, &str)> {
        RESOLVE_PREFIXES
            .iter()
            .find_map(|prefix| self.get(&format!("{prefix}{name}")))
    }

    pub fn remove(&mut self, path: &str) -> Option<String> {
        self.refs.shift_remove(path)
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    /// `(path, sha)` pairs in listing order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.refs
            .iter()
            .map(|(path, sha)| (path.as_str(), sha.as_str()))
    }
}

/// The kind of ref [`Repository::make_ref`] creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum RefType {
    Branch,
    Tag,
}

impl RefType {
    /// The fully-qualified path a ref of this type named `name` gets.
    pub fn qualified(self, name: &str) -> String {
        match self {
            RefType::Branch => format!("refs/heads/{name}"),
            RefType::Tag => format!("refs/tags/{name}"),
        }
    }
}

/// Start point for a new branch or tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefBase<'b> {
    /// An existing ref, named by its fully-qualified path
    Ref { path: &'b str },
    /// Any revision git understands (`HEAD~2`, a SHA, ...)
    Rev(&'b str),
}

impl RefBase<'_> {
    fn rev(&self) -> &str {
        match self {
            RefBase::Ref { path } => path,
            RefBase::Rev(rev) => rev,
        }
    }
}

impl<'b> From<&'b Ref<'_>> for RefBase<'b> {
    fn from(r: &'b Ref<'_>) -> Self {
        RefBase::Ref { path: r.path() }
    }
}

impl<'b> From<&'b str> for RefBase<'b> {
    fn from(rev: &'b str) -> Self {
        RefBase::Rev(rev)
    }
}

impl<'b> From<&'b String> for RefBase<'b> {
    fn from(rev: &'b String) -> Self {
        RefBase::Rev(rev)
    }
}

impl Repository {
    /// Populate the ref cache unless it is already loaded.
    ///
    /// The new map is only stored once fully parsed, so a failed load leaves
    /// the cache unloaded rather than partially filled.
    fn load_refs(&self) -> anyhow::Result<()> {
        if self.refs.borrow().is_some() {
            return Ok(());
        }

        let (command, output) = self.git_output(&["show-ref", "--head"])?;
        // show-ref exits 1 when there is nothing to list (a repository with no commits)
        let no_refs = output.status.code() == Some(1) && output.stdout.is_empty();
        if !output.status.success() && !no_refs {
            return Err(super::command_failed(command, &output).into());
        }

        let map = RefMap::parse(&String::from_utf8_lossy(&output.stdout))?;
        log::debug!("Loaded {} refs from {}", map.len(), self.path().display());
        *self.refs.borrow_mut() = Some(map);
        Ok(())
    }

    /// Load the ref cache if needed and run `f` over it.
    fn with_refs<T>(&self, f: impl FnOnce(&RefMap) -> T) -> anyhow::Result<T> {
        self.load_refs()?;
        let refs = self.refs.borrow();
        let map = refs
            .as_ref()
            .ok_or_else(|| GitError::internal("ref cache missing after load"))?;
        Ok(f(map))
    }

    /// Drop the ref cache. The next ref query reloads it.
    pub fn reload_refs(&self) {
        if self.refs.borrow_mut().take().is_some() {
            log::debug!("Invalidated ref cache for {}", self.path().display());
        }
    }

    /// Look up a fully-qualified path in the loaded cache without loading it.
    pub(crate) fn cached_ref(&self, path: &str) -> Option<Ref<'_>> {
        self.refs
            .borrow()
            .as_ref()
            .and_then(|map| map.get(path))
            .map(|(path, sha)| Ref::new(self, sha, path))
    }

    /// Remove one ref from the loaded cache after git deleted it.
    pub(crate) fn forget_ref(&self, path: &str) {
        if let Some(map) = self.refs.borrow_mut().as_mut()
            && map.remove(path).is_some()
        {
            log::debug!("Removed {} from ref cache", path);
        }
    }

    /// Resolve a name to a ref.
    ///
    /// Tries, in order, the name as a fully-qualified path, then under
    /// `refs/heads/`, `refs/tags/` and `refs/remotes/`. Anything else git can
    /// verify as a revision comes back as a raw ref whose SHA is the name itself.
    pub fn find_ref(&self, name: &str) -> anyhow::Result<Ref<'_>> {
        let found = self.with_refs(|map| {
            map.lookup(name)
                .map(|(path, sha)| (path.to_string(), sha.to_string()))
        })?;
        if let Some((path, sha)) = found {
            return Ok(Ref::new(self, &sha, &path));
        }

        // Not a symbolic ref; see if git understands it as a revision.
        // A leading dash would be read as a rev-parse option.
        if !name.starts_with('-')
            && self.run_command_check(&["rev-parse", "-q", "--verify", name])?
        {
            return Ok(Ref::new(self, name, name));
        }

        Err(GitError::RefNotFound {
            name: name.to_string(),
        }
        .into())
    }

    /// Check if a name resolves to a cached ref (see [`Repository::find_ref`] for the order).
    pub fn has_ref(&self, name: &str) -> anyhow::Result<bool> {
        self.with_refs(|map| map.lookup(name).is_some())
    }

    /// Every cached ref, in the order git listed them.
    pub fn refs(&self) -> anyhow::Result<Vec<Ref<'_>>> {
        self.with_refs(|map| {
            map.iter()
                .map(|(path, sha)| Ref::new(self, sha, path))
                .collect()
        })
    }

    /// Local branches.
    pub fn branches(&self) -> anyhow::Result<Vec<Ref<'_>>> {
        Ok(self.refs()?.into_iter().filter(Ref::is_local).collect())
    }

    /// Tags.
    pub fn tags(&self) -> anyhow::Result<Vec<Ref<'_>>> {
        Ok(self.refs()?.into_iter().filter(Ref::is_tag).collect())
    }

    /// Create a branch or tag named `name` at `base` and return it.
    ///
    /// Fails without running git if `name` is `HEAD`, starts with `-`, or
    /// already resolves to a ref.
    pub fn make_ref<'b>(
        &self,
        ref_type: RefType,
        name: &str,
        base: impl Into<RefBase<'b>>,
    ) -> anyhow::Result<Ref<'_>> {
        if name == "HEAD" {
            return Err(
                GitError::invalid_operation(name, format!("Cannot create a {ref_type} named HEAD"))
                    .into(),
            );
        }
        super::reject_option_like(name)?;
        if self.has_ref(name)? {
            return Err(GitError::RefAlreadyExists {
                name: name.to_string(),
            }
            .into());
        }

        let base = base.into();
        self.run_command(&[ref_type.as_ref(), "--end-of-options", name, base.rev()])?;
        log::debug!("Created {} {} at {}", ref_type, name, base.rev());

        self.reload_refs();
        self.load_refs()?;
        let path = ref_type.qualified(name);
        self.cached_ref(&path)
            .ok_or_else(|| GitError::RefNotFound { name: path }.into())
    }

    /// Create a branch.
    pub fn branch<'b>(&self, name: &str, base: impl Into<RefBase<'b>>) -> anyhow::Result<Ref<'_>> {
        self.make_ref(RefType::Branch, name, base)
    }

    /// Create a tag.
    pub fn tag<'b>(&self, name: &str, base: impl Into<RefBase<'b>>) -> anyhow::Result<Ref<'_>> {
        self.make_ref(RefType::Tag, name, base)
    }
}
