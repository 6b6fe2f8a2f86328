//! Config key/value access for Repository.
//!
//! All values are read once with `git config --list --null` and served from
//! memory afterwards. Key writes go through `git config` and update the cached
//! map in place; removing a section drops the cache instead.

use indexmap::IndexMap;

use super::Repository;
use crate::git::GitError;

/// Config values keyed by normalized name (see [`normalize_key`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigMap {
    values: IndexMap<String, String>,
}

impl ConfigMap {
    /// Parse the output of `git config --list --null`.
    ///
    /// Each record is `key\nvalue`; a key with no value (`[core] bare`) is a
    /// record without a newline. Later records override earlier ones, matching
    /// git's system < global < local precedence.
    pub fn parse(output: &str) -> Self {
        let mut values = IndexMap::new();
        for record in output.split('\0').filter(|r| !r.is_empty()) {
            let (key, value) = record.split_once('\n').unwrap_or((record, ""));
            values.insert(normalize_key(key), value.to_string());
        }
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(&normalize_key(key)).map(String::as_str)
    }

    fn insert(&mut self, key: &str, value: &str) {
        self.values.insert(normalize_key(key), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.values.shift_remove(&normalize_key(key));
    }

    fn has_section(&self, section: &str) -> bool {
        let prefix = format!("{}.", normalize_section(section));
        self.values.keys().any(|key| key.starts_with(&prefix))
    }
}

/// Normalize a config key the way git does: section and variable names are
/// case-insensitive, the subsection in between is not.
///
/// `Branch.Feature.Remote` becomes `branch.Feature.remote`.
pub fn normalize_key(key: &str) -> String {
    match (key.find('.'), key.rfind('.')) {
        (Some(first), Some(last)) if first != last => format!(
            "{}{}{}",
            key[..first].to_ascii_lowercase(),
            &key[first..last],
            key[last..].to_ascii_lowercase()
        ),
        _ => key.to_ascii_lowercase(),
    }
}

/// Normalize a section name (`branch.Feature`): the part before the first dot is lowercased.
fn normalize_section(section: &str) -> String {
    match section.split_once('.') {
        Some((name, subsection)) => format!("{}.{}", name.to_ascii_lowercase(), subsection),
        None => section.to_ascii_lowercase(),
    }
}

impl Repository {
    fn load_config(&self) -> anyhow::Result<()> {
        if self.config.borrow().is_some() {
            return Ok(());
        }
        let output = self.run_command(&["config", "--list", "--null"])?;
        let map = ConfigMap::parse(&output);
        log::debug!("Loaded {} config values", map.values.len());
        *self.config.borrow_mut() = Some(map);
        Ok(())
    }

    fn with_config<T>(&self, f: impl FnOnce(&mut ConfigMap) -> T) -> anyhow::Result<T> {
        self.load_config()?;
        let mut config = self.config.borrow_mut();
        let map = config
            .as_mut()
            .ok_or_else(|| GitError::internal("config cache missing after load"))?;
        Ok(f(map))
    }

    /// Get a config value.
    pub fn config_get(&self, key: &str) -> anyhow::Result<Option<String>> {
        self.with_config(|map| map.get(key).map(str::to_owned))
    }

    /// Set a config value in the repository's local config.
    pub fn config_set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.run_command(&["config", "--end-of-options", key, value])?;
        if let Some(map) = self.config.borrow_mut().as_mut() {
            map.insert(key, value);
        }
        Ok(())
    }

    /// Remove a config value. Removing a key that is not set is not an error.
    pub fn config_unset(&self, key: &str) -> anyhow::Result<()> {
        let (command, output) = self.git_output(&["config", "--unset", key])?;
        // Exit code 5: the key was not set
        if !output.status.success() && output.status.code() != Some(5) {
            return Err(super::command_failed(command, &output).into());
        }
        if let Some(map) = self.config.borrow_mut().as_mut() {
            map.remove(key);
        }
        Ok(())
    }

    /// Check if any key in `section` (e.g. `branch.main`) is set.
    pub fn config_has_section(&self, section: &str) -> anyhow::Result<bool> {
        self.with_config(|map| map.has_section(section))
    }

    /// Remove a whole section from the repository's local config.
    ///
    /// A section that is missing locally (absent, or only set in global or
    /// system config) is left alone. If one was removed, the config cache is
    /// dropped so values still inherited from other scopes show through.
    pub fn config_remove_section(&self, section: &str) -> anyhow::Result<()> {
        let local = self.run_command(&["config", "--local", "--list", "--null"])?;
        let local = ConfigMap::parse(&local);
        if !local.has_section(section) {
            log::debug!("No local config section {section}");
            return Ok(());
        }
        self.run_command(&["config", "--remove-section", "--end-of-options", section])?;
        self.reload_config();
        Ok(())
    }

    /// Drop the config cache. The next read reloads it.
    pub fn reload_config(&self) {
        self.config.borrow_mut().take();
    }
}
