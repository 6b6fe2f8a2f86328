//! Parsing of `git status --porcelain -z`.
//!
//! Each changed path is one NUL-terminated record `XY <path>`, where `X` is the
//! index state and `Y` the working-tree state. Renames and copies take two
//! records: the status record carries the new path and the record after it is
//! the bare source path.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use super::GitError;

static STATUS_RE: LazyLock<Regex> = LazyLock::new(|| {
    // `-z` leaves paths unquoted, so a path may contain newlines
    Regex::new(r"(?s)^([ MADRCU!?])([ MADRCU!?]) (.*)$").expect("status pattern is valid")
});

/// State of a path in the index or the working tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum StatusCode {
    Unmodified,
    Modified,
    Added,
    Deleted,
    Renamed,
    Copied,
    Unmerged,
    Untracked,
    Ignored,
}

impl StatusCode {
    pub fn from_code(code: char) -> Option<Self> {
        Some(match code {
            ' ' => StatusCode::Unmodified,
            'M' => StatusCode::Modified,
            'A' => StatusCode::Added,
            'D' => StatusCode::Deleted,
            'R' => StatusCode::Renamed,
            'C' => StatusCode::Copied,
            'U' => StatusCode::Unmerged,
            '?' => StatusCode::Untracked,
            '!' => StatusCode::Ignored,
            _ => return None,
        })
    }

    /// The one-character porcelain code.
    pub fn code(self) -> char {
        match self {
            StatusCode::Unmodified => ' ',
            StatusCode::Modified => 'M',
            StatusCode::Added => 'A',
            StatusCode::Deleted => 'D',
            StatusCode::Renamed => 'R',
            StatusCode::Copied => 'C',
            StatusCode::Unmerged => 'U',
            StatusCode::Untracked => '?',
            StatusCode::Ignored => '!',
        }
    }

    fn has_source_path(self) -> bool {
        matches!(self, StatusCode::Renamed | StatusCode::Copied)
    }
}

/// One changed path from a status query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatLine {
    index_stat: StatusCode,
    work_stat: StatusCode,
    old_path: String,
    new_path: String,
}

/// Status records in the order git reported them.
pub type StatusLines = Vec<StatLine>;

impl StatLine {
    pub fn index_status(&self) -> StatusCode {
        self.index_stat
    }

    pub fn work_status(&self) -> StatusCode {
        self.work_stat
    }

    /// Path before a rename or copy; the same as `new_path` otherwise.
    pub fn old_path(&self) -> &str {
        &self.old_path
    }

    pub fn new_path(&self) -> &str {
        &self.new_path
    }

    pub fn is_rename(&self) -> bool {
        self.index_stat == StatusCode::Renamed || self.work_stat == StatusCode::Renamed
    }

    fn is_copy(&self) -> bool {
        self.index_stat == StatusCode::Copied || self.work_stat == StatusCode::Copied
    }

    fn expects_source_path(&self) -> bool {
        self.index_stat.has_source_path() || self.work_stat.has_source_path()
    }

    /// Human-readable rendering of this record.
    pub fn describe(&self) -> String {
        let mut res = String::new();
        if self.is_rename() {
            res.push_str(&format!(
                "{} was renamed to {}\n",
                self.old_path, self.new_path
            ));
        } else if self.is_copy() {
            res.push_str(&format!(
                "{} was copied to {}\n",
                self.old_path, self.new_path
            ));
        }
        res.push_str(&format!(
            "{} is {} in the index and {} in the working tree.",
            self.new_path, self.index_stat, self.work_stat
        ));
        res
    }
}

impl fmt::Display for StatLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Parse the output of `git status --porcelain -z`.
///
/// Returns an internal-consistency error for a bare path record that does not
/// follow a rename or copy, or an empty status record.
pub fn parse_status(output: &str) -> Result<StatusLines, GitError> {
    let mut lines = StatusLines::new();
    // A rename/copy record still waiting for its source path.
    let mut pending: Option<StatLine> = None;

    for record in output.split('\0').filter(|r| !r.is_empty()) {
        if let Some(mut stat) = pending.take() {
            stat.old_path = record.to_string();
            lines.push(stat);
            continue;
        }

        let Some(caps) = STATUS_RE.captures(record) else {
            return Err(GitError::internal(format!(
                "status record {record:?} does not follow a rename"
            )));
        };
        let code = |i: usize| {
            caps[i]
                .chars()
                .next()
                .and_then(StatusCode::from_code)
                .ok_or_else(|| GitError::internal(format!("bad status code in {record:?}")))
        };
        let path = caps[3].to_string();
        let stat = StatLine {
            index_stat: code(1)?,
            work_stat: code(2)?,
            old_path: path.clone(),
            new_path: path,
        };

        if stat.expects_source_path() {
            pending = Some(stat);
        } else {
            lines.push(stat);
        }
    }

    if let Some(stat) = pending {
        return Err(GitError::internal(format!(
            "status record for {} is missing its source path",
            stat.new_path
        )));
    }

    Ok(lines)
}
