// Mock executables for tests.
//
// Mocks are shell scripts (#!/bin/sh). Repository code runs whatever program
// Settings names, so a mock path stands in for git without touching PATH.

use std::fs;
use std::path::{Path, PathBuf};

/// Write an executable shell script to `bin_dir/name`.
pub fn write_mock_script(bin_dir: &Path, name: &str, script: &str) {
    let script_path = bin_dir.join(name);
    fs::write(&script_path, script).unwrap();

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&script_path, fs::Permissions::from_mode(0o755)).unwrap();
    }
}

/// Create a mock command that prints fixed stdout and stderr, then exits.
pub fn create_simple_mock(
    bin_dir: &Path,
    name: &str,
    stdout: &str,
    stderr: &str,
    exit_code: i32,
) -> PathBuf {
    let mut script = String::from("#!/bin/sh\n");
    if !stdout.is_empty() {
        script.push_str(&format!("printf '%s' '{}'\n", escape_shell_string(stdout)));
    }
    if !stderr.is_empty() {
        script.push_str(&format!(
            "printf '%s\\n' '{}' >&2\n",
            escape_shell_string(stderr)
        ));
    }
    script.push_str(&format!("exit {exit_code}\n"));

    write_mock_script(bin_dir, name, &script);
    bin_dir.join(name)
}

/// Escape single quotes in shell strings.
fn escape_shell_string(s: &str) -> String {
    s.replace('\'', "'\"'\"'")
}
