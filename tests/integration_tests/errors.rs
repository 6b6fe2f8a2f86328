use gitrefs::Repository;
use gitrefs::Settings;
use gitrefs::git::{ErrorKind, error_kind, is_fatal};

use crate::common::TestRepo;
use crate::common::mock_commands::create_simple_mock;

fn repo_with_git(test: &TestRepo, stdout: &str, stderr: &str, exit_code: i32) -> Repository {
    let bin_dir = test.temp_path().join("mock-bin");
    std::fs::create_dir_all(&bin_dir).unwrap();
    let git = create_simple_mock(&bin_dir, "git", stdout, stderr, exit_code);
    Repository::open_with(test.root_path(), Settings::with_git(git)).unwrap()
}

#[test]
fn test_git_failure_carries_stderr() {
    let test = TestRepo::new();
    let repo = repo_with_git(&test, "", "fatal: something broke", 128);

    let err = repo.find_ref("main").unwrap_err();
    assert_eq!(error_kind(&err), Some(ErrorKind::ExternalToolFailure));
    assert!(!is_fatal(&err));
    insta::assert_snapshot!(err.to_string(), @"`git show-ref --head` failed with exit code 128: fatal: something broke");
}

#[test]
fn test_failed_load_leaves_cache_unloaded() {
    let test = TestRepo::new();
    let repo = repo_with_git(&test, "", "fatal: something broke", 128);

    assert!(repo.refs().is_err());
    // Nothing was cached, so every query retries
    assert!(repo.refs().is_err());
}

#[test]
fn test_malformed_show_ref_is_fatal() {
    let test = TestRepo::new();
    let repo = repo_with_git(&test, "not-a-ref-line", "", 0);

    let err = repo.refs().unwrap_err();
    assert_eq!(error_kind(&err), Some(ErrorKind::InternalConsistency));
    assert!(is_fatal(&err));
}

#[test]
fn test_malformed_status_is_fatal() {
    let test = TestRepo::new();
    let repo = repo_with_git(&test, "garbage", "", 0);

    let err = repo.is_clean().unwrap_err();
    assert_eq!(error_kind(&err), Some(ErrorKind::InternalConsistency));
}

#[test]
fn test_missing_git_binary() {
    let test = TestRepo::new();
    let settings = Settings::with_git(test.temp_path().join("no-such-git"));
    let repo = Repository::open_with(test.root_path(), settings).unwrap();

    let err = repo.refs().unwrap_err();
    // The spawn itself failed; there is no GitError to classify
    assert_eq!(error_kind(&err), None);
    assert!(err.to_string().starts_with("Failed to execute"));
}
