use gitrefs::git::StatusCode;

use crate::common::TestRepo;

#[test]
fn test_clean_repository() {
    let test = TestRepo::new();
    let repo = test.open();

    let (clean, lines) = repo.is_clean().unwrap();
    assert!(clean);
    assert!(lines.is_empty());
    assert!(test.git_calls().iter().any(|c| c == "status --porcelain -z"));
}

#[test]
fn test_untracked_and_modified() {
    let test = TestRepo::new();
    std::fs::write(test.root_path().join("file.txt"), "changed").unwrap();
    std::fs::write(test.root_path().join("new file.txt"), "new").unwrap();
    let repo = test.open();

    let (clean, lines) = repo.is_clean().unwrap();
    assert!(!clean);
    assert_eq!(lines.len(), 2);

    assert_eq!(lines[0].new_path(), "file.txt");
    assert_eq!(lines[0].index_status(), StatusCode::Unmodified);
    assert_eq!(lines[0].work_status(), StatusCode::Modified);

    assert_eq!(lines[1].new_path(), "new file.txt");
    assert_eq!(lines[1].old_path(), "new file.txt");
    assert_eq!(lines[1].index_status(), StatusCode::Untracked);
    assert_eq!(lines[1].work_status(), StatusCode::Untracked);
}

// Newlines in file names are not allowed on Windows
#[cfg(unix)]
#[test]
fn test_path_with_newline() {
    let test = TestRepo::new();
    std::fs::write(test.root_path().join("line1\nline2.txt"), "x").unwrap();
    let repo = test.open();

    let (clean, lines) = repo.is_clean().unwrap();
    assert!(!clean);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].new_path(), "line1\nline2.txt");
    assert_eq!(lines[0].index_status(), StatusCode::Untracked);
}

#[test]
fn test_staged_rename() {
    let test = TestRepo::new();
    test.git(&["mv", "file.txt", "renamed.txt"]);
    let repo = test.open();

    let (clean, lines) = repo.is_clean().unwrap();
    assert!(!clean);
    assert_eq!(lines.len(), 1);

    let line = &lines[0];
    assert!(line.is_rename());
    assert_eq!(line.old_path(), "file.txt");
    assert_eq!(line.new_path(), "renamed.txt");
    assert_eq!(line.index_status(), StatusCode::Renamed);
    insta::assert_snapshot!(line.describe(), @r"
    file.txt was renamed to renamed.txt
    renamed.txt is renamed in the index and unmodified in the working tree.
    ");
}

#[test]
fn test_staged_addition_and_deletion() {
    let test = TestRepo::new();
    test.commit_file("other.txt", "other");
    std::fs::write(test.root_path().join("added.txt"), "added").unwrap();
    test.git(&["add", "added.txt"]);
    test.git(&["rm", "-q", "other.txt"]);
    let repo = test.open();

    let lines = repo.status().unwrap();
    let summary: Vec<_> = lines
        .iter()
        .map(|l| (l.new_path(), l.index_status().code(), l.work_status().code()))
        .collect();
    assert_eq!(summary, [("added.txt", 'A', ' '), ("other.txt", 'D', ' ')]);
}
