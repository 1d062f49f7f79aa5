use assert_fs::fixture::{FileWriteStr, PathChild};
use predicates::prelude::*;
use pretty_assertions::assert_eq;

mod common;

fn sorted_paths(set: &std::collections::BTreeSet<std::path::PathBuf>) -> Vec<String> {
    set.iter().map(|p| p.display().to_string()).collect()
}

#[test]
fn classifies_edited_staged_and_deleted_paths() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let mut repository = common::open_repository(dir.path());
    repository.init()?;

    dir.child("a.txt").write_str("hello")?;
    dir.child("c.txt").write_str("soon gone")?;
    repository.add(&["a.txt".into(), "c.txt".into()])?;
    repository.commit("first", Some(common::test_author()))?;

    // a.txt edited but not re-added, b.txt created and added, c.txt
    // deleted from disk
    dir.child("a.txt").write_str("hello!")?;
    dir.child("b.txt").write_str("world")?;
    repository.add(&["b.txt".into()])?;
    std::fs::remove_file(dir.path().join("c.txt"))?;

    let report = repository.status()?;

    assert_eq!(sorted_paths(&report.modified_unstaged), vec!["a.txt"]);
    assert_eq!(sorted_paths(&report.new_staged), vec!["b.txt"]);
    assert_eq!(sorted_paths(&report.deleted), vec!["c.txt"]);
    assert!(report.modified_staged.is_empty());
    assert!(report.new_unstaged.is_empty());

    Ok(())
}

#[test]
fn a_staged_edit_is_ready_to_commit() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let mut repository = common::open_repository(dir.path());
    repository.init()?;

    dir.child("a.txt").write_str("one")?;
    repository.add(&["a.txt".into()])?;
    repository.commit("first", Some(common::test_author()))?;

    dir.child("a.txt").write_str("two")?;
    repository.add(&["a.txt".into()])?;

    let report = repository.status()?;

    assert_eq!(sorted_paths(&report.modified_staged), vec!["a.txt"]);
    assert!(report.modified_unstaged.is_empty());
    assert!(report.new_staged.is_empty());
    assert!(report.deleted.is_empty());
    assert!(report.new_unstaged.is_empty());

    Ok(())
}

#[test]
fn untracked_files_are_reported_and_nothing_else() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let mut repository = common::open_repository(dir.path());
    repository.init()?;

    dir.child("loose.txt").write_str("never staged")?;

    let report = repository.status()?;

    assert_eq!(sorted_paths(&report.new_unstaged), vec!["loose.txt"]);
    assert!(report.modified_unstaged.is_empty());
    assert!(report.modified_staged.is_empty());
    assert!(report.new_staged.is_empty());
    assert!(report.deleted.is_empty());

    Ok(())
}

#[test]
fn a_touched_but_unchanged_file_is_clean() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let mut repository = common::open_repository(dir.path());
    repository.init()?;

    dir.child("a.txt").write_str("same content")?;
    repository.add(&["a.txt".into()])?;
    repository.commit("first", Some(common::test_author()))?;

    // push the modification time into the future without changing the
    // content: the stat fast path misses, the hash comparison settles it
    let file_path = dir.path().join("a.txt");
    let mtime = filetime::FileTime::from_unix_time(
        filetime::FileTime::now().unix_seconds() + 42,
        0,
    );
    filetime::set_file_mtime(&file_path, mtime)?;

    let report = repository.status()?;

    assert!(report.is_clean());

    Ok(())
}

#[test]
fn restaging_committed_content_reads_as_clean() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let mut repository = common::open_repository(dir.path());
    repository.init()?;

    dir.child("a.txt").write_str("stable")?;
    repository.add(&["a.txt".into()])?;
    repository.commit("first", Some(common::test_author()))?;

    // staged content identical to the last commit is not a pending change
    repository.add(&["a.txt".into()])?;

    let report = repository.status()?;
    assert!(report.is_clean());

    Ok(())
}

#[test]
fn the_report_prints_grouped_sections() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    common::init_repository(dir.path());

    dir.child("a.txt").write_str("hello")?;
    common::kit(dir.path()).arg("add").arg("a.txt").assert().success();
    common::kit(dir.path())
        .arg("commit")
        .arg("-m")
        .arg("first")
        .assert()
        .success();

    dir.child("a.txt").write_str("hello!")?;
    dir.child("b.txt").write_str("world")?;

    common::kit(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Changes not staged for commit:")
                .and(predicate::str::contains("modified:"))
                .and(predicate::str::contains("a.txt"))
                .and(predicate::str::contains("Untracked files:"))
                .and(predicate::str::contains("b.txt")),
        )
        .stdout(predicate::str::contains("Changes to be committed:").not());

    Ok(())
}

#[test]
fn a_clean_tree_says_so() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    common::init_repository(dir.path());

    dir.child("a.txt").write_str("hello")?;
    common::kit(dir.path()).arg("add").arg("a.txt").assert().success();
    common::kit(dir.path())
        .arg("commit")
        .arg("-m")
        .arg("first")
        .assert()
        .success();

    common::kit(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "nothing to commit, working tree clean",
        ));

    Ok(())
}
