//! Git ref graph and working-tree status.
//!
//! Everything here shells out to git and parses its output:
//! - [`Repository`] owns a lazily loaded ref cache and config cache
//! - [`Ref`] borrows its repository for relationship queries
//!   (containment, remote tracking) and mutations (delete, checkout)
//! - [`parse_status`] turns `git status --porcelain -z` into [`StatLine`]s

mod error;
mod reference;
mod repository;
mod status;

pub use error::{ErrorKind, GitError, error_kind, is_fatal};
pub use reference::{Ref, RefKind};
pub use repository::{ConfigMap, RefBase, RefMap, RefType, Repository};
pub use status::{StatLine, StatusCode, StatusLines, parse_status};
