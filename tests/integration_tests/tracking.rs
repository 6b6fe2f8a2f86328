use gitrefs::git::{ErrorKind, error_kind};

use crate::common::TestRepo;

#[test]
fn test_track_remote_writes_config() {
    let test = TestRepo::new();
    test.git(&["branch", "feature"]);
    let repo = test.open();
    let feature = repo.find_ref("feature").unwrap();

    feature.track_remote("origin").unwrap();

    assert_eq!(test.git(&["config", "branch.feature.remote"]), "origin");
    assert_eq!(
        test.git(&["config", "branch.feature.merge"]),
        "refs/heads/feature"
    );
    assert_eq!(feature.tracks().unwrap(), "origin");
}

#[test]
fn test_track_remote_twice_is_a_no_op() {
    let test = TestRepo::new();
    let repo = test.open();
    let main = repo.find_ref("main").unwrap();

    main.track_remote("origin").unwrap();
    test.clear_git_calls();
    main.track_remote("origin").unwrap();

    assert!(test.git_calls().is_empty());
}

#[test]
fn test_track_remote_replaces_section() {
    let test = TestRepo::new();
    test.git(&["config", "branch.main.remote", "upstream"]);
    test.git(&["config", "branch.main.rebase", "true"]);
    let repo = test.open();

    repo.find_ref("main").unwrap().track_remote("origin").unwrap();

    assert_eq!(test.git(&["config", "branch.main.remote"]), "origin");
    assert_eq!(test.git(&["config", "branch.main.merge"]), "refs/heads/main");
    // The old section went away wholesale
    assert_eq!(
        test.git(&["config", "--get-regexp", "^branch\\.main\\."]),
        "branch.main.remote origin\nbranch.main.merge refs/heads/main"
    );
}

#[test]
fn test_track_remote_with_section_outside_local_config() {
    let test = TestRepo::new();
    let included = test.temp_path().join("included.cfg");
    std::fs::write(&included, "[branch \"main\"]\n\tremote = upstream\n").unwrap();
    test.git(&["config", "include.path", included.to_str().unwrap()]);
    let repo = test.open();
    let main = repo.find_ref("main").unwrap();
    assert_eq!(main.tracks().unwrap(), "upstream");

    main.track_remote("origin").unwrap();

    // Only local config can be edited; the included section is left alone
    assert!(!test.git_calls().iter().any(|c| c.contains("--remove-section")));
    assert_eq!(test.git(&["config", "branch.main.remote"]), "origin");
    assert_eq!(test.git(&["config", "branch.main.merge"]), "refs/heads/main");
    assert_eq!(main.tracks().unwrap(), "origin");
}

#[test]
fn test_track_remote_rejects_option_like_remote() {
    let test = TestRepo::new();
    let repo = test.open();
    let main = repo.find_ref("main").unwrap();
    test.clear_git_calls();

    for remote in ["--global", "-f", ""] {
        let err = main.track_remote(remote).unwrap_err();
        assert_eq!(error_kind(&err), Some(ErrorKind::InvalidOperation), "{remote:?}");
    }
    assert!(test.git_calls().is_empty());
}

#[test]
fn test_config_set_value_that_looks_like_an_option() {
    let test = TestRepo::new();
    let repo = test.open();

    repo.config_set("grf.flag", "--global").unwrap();
    assert_eq!(test.git(&["config", "grf.flag"]), "--global");
    assert_eq!(repo.config_get("grf.flag").unwrap().as_deref(), Some("--global"));
}

#[test]
fn test_tracks_without_config() {
    let test = TestRepo::new();
    let repo = test.open();

    let err = repo.find_ref("main").unwrap().tracks().unwrap_err();
    assert_eq!(error_kind(&err), Some(ErrorKind::NotFound));
    assert_eq!(err.to_string(), "Branch main does not track a remote");
}

#[test]
fn test_tracking_rejects_tags() {
    let test = TestRepo::new();
    test.git(&["tag", "v1.0"]);
    let repo = test.open();
    let tag = repo.find_ref("v1.0").unwrap();
    test.clear_git_calls();

    for err in [
        tag.tracks().unwrap_err(),
        tag.track_remote("origin").unwrap_err(),
        tag.remote_branch("origin").unwrap_err(),
    ] {
        assert_eq!(error_kind(&err), Some(ErrorKind::InvalidOperation));
    }
    assert!(!tag.has_remote_ref("origin").unwrap());
    assert!(test.git_calls().is_empty());
}

#[test]
fn test_remote_branch() {
    let test = TestRepo::new();
    let head = test.rev_parse("HEAD");
    test.add_remote_ref("origin", "main", &head);
    let repo = test.open();
    let main = repo.find_ref("main").unwrap();

    assert!(main.has_remote_ref("origin").unwrap());
    assert!(!main.has_remote_ref("upstream").unwrap());

    let remote = main.remote_branch("origin").unwrap();
    assert_eq!(remote.path(), "refs/remotes/origin/main");
    assert_eq!(remote.sha(), head);

    let err = main.remote_branch("upstream").unwrap_err();
    assert_eq!(error_kind(&err), Some(ErrorKind::NotFound));
}

#[test]
fn test_remote_branch_sees_only_loaded_refs() {
    let test = TestRepo::new();
    let repo = test.open();
    let main = repo.find_ref("main").unwrap();

    let head = test.rev_parse("HEAD");
    test.add_remote_ref("origin", "main", &head);
    test.clear_git_calls();

    let err = main.remote_branch("origin").unwrap_err();
    assert_eq!(error_kind(&err), Some(ErrorKind::NotFound));
    assert!(test.git_calls().is_empty());

    repo.reload_refs();
    assert!(main.has_remote_ref("origin").unwrap());
    assert!(main.remote_branch("origin").is_ok());
}

#[test]
fn test_config_roundtrip_through_cache() {
    let test = TestRepo::new();
    let repo = test.open();

    assert_eq!(repo.config_get("grf.test").unwrap(), None);
    repo.config_set("grf.test", "value").unwrap();
    assert_eq!(repo.config_get("GRF.test").unwrap().as_deref(), Some("value"));

    repo.config_unset("grf.test").unwrap();
    repo.config_unset("grf.test").unwrap();
    assert_eq!(repo.config_get("grf.test").unwrap(), None);

    let loads = test
        .git_calls()
        .iter()
        .filter(|c| c.as_str() == "config --list --null")
        .count();
    assert_eq!(loads, 1);
}
