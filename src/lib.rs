pub mod git;
pub mod settings;
pub mod shell_exec;
pub mod styling;

pub use git::{Ref, Repository};
pub use settings::Settings;
