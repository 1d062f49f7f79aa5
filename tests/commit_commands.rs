use assert_fs::fixture::{FileWriteStr, PathChild};
use assert_fs::prelude::PathCreateDir;
use predicates::prelude::predicate;

mod common;

#[test]
fn the_first_commit_is_a_root_commit() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    common::init_repository(dir.path());

    dir.child("a.txt").write_str("alpha")?;
    common::kit(dir.path()).arg("add").arg("a.txt").assert().success();

    common::kit(dir.path())
        .arg("commit")
        .arg("-m")
        .arg("initial snapshot")
        .assert()
        .success()
        .stdout(predicate::str::is_match(
            r"^\[\(root-commit\) [0-9a-f]{7}\] initial snapshot\n$",
        )?);

    // the default branch now points at a commit object
    let oid = common::master_oid(dir.path());
    common::kit(dir.path())
        .arg("cat-file")
        .arg("type")
        .arg(&oid)
        .assert()
        .success()
        .stdout(predicate::eq("commit\n"));

    Ok(())
}

#[test]
fn a_second_commit_links_to_its_parent() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    common::init_repository(dir.path());

    dir.child("a.txt").write_str("one")?;
    common::kit(dir.path()).arg("add").arg("a.txt").assert().success();
    common::kit(dir.path())
        .arg("commit")
        .arg("-m")
        .arg("first")
        .assert()
        .success();
    let first_oid = common::master_oid(dir.path());

    dir.child("a.txt").write_str("two")?;
    common::kit(dir.path()).arg("add").arg("a.txt").assert().success();
    common::kit(dir.path())
        .arg("commit")
        .arg("-m")
        .arg("second")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^\[[0-9a-f]{7}\] second\n$")?);

    let second_oid = common::master_oid(dir.path());
    assert_ne!(first_oid, second_oid);

    common::kit(dir.path())
        .arg("cat-file")
        .arg("pretty")
        .arg(&second_oid)
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("parent {first_oid}")));

    Ok(())
}

#[test]
fn committing_an_empty_index_fails() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    common::init_repository(dir.path());

    common::kit(dir.path())
        .arg("commit")
        .arg("-m")
        .arg("nothing staged")
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to commit"));

    Ok(())
}

#[test]
fn commit_author_falls_back_to_the_configured_identity() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    common::init_repository(dir.path());

    common::kit(dir.path())
        .arg("config")
        .arg("user.name")
        .arg("Config Author")
        .assert()
        .success();
    common::kit(dir.path())
        .arg("config")
        .arg("user.email")
        .arg("config@example.com")
        .assert()
        .success();

    dir.child("a.txt").write_str("alpha")?;
    common::kit(dir.path()).arg("add").arg("a.txt").assert().success();

    // no author in the environment, the configured identity is used
    let mut commit = assert_cmd::Command::cargo_bin("kit")?;
    commit
        .current_dir(dir.path())
        .env_remove("KIT_AUTHOR_NAME")
        .env_remove("KIT_AUTHOR_EMAIL")
        .arg("commit")
        .arg("-m")
        .arg("configured author")
        .assert()
        .success();

    let oid = common::master_oid(dir.path());
    common::kit(dir.path())
        .arg("cat-file")
        .arg("pretty")
        .arg(&oid)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "author Config Author <config@example.com>",
        ));

    Ok(())
}

#[test]
fn identical_content_is_stored_once_across_commits() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    common::init_repository(dir.path());

    dir.child("a.txt").write_str("shared content")?;
    common::kit(dir.path()).arg("add").arg("a.txt").assert().success();
    common::kit(dir.path())
        .arg("commit")
        .arg("-m")
        .arg("first")
        .assert()
        .success();

    // the same bytes under another path hash to the same blob
    dir.child("copies").create_dir_all()?;
    dir.child("copies/b.txt").write_str("shared content")?;
    common::kit(dir.path()).arg("add").arg("copies/b.txt").assert().success();
    common::kit(dir.path())
        .arg("commit")
        .arg("-m")
        .arg("second")
        .assert()
        .success();

    let output = common::kit(dir.path())
        .arg("ls-tree")
        .arg(&common::master_oid(dir.path()))
        .output()?;
    let listing = String::from_utf8(output.stdout)?;

    let ids = listing
        .lines()
        .filter_map(|line| line.split_whitespace().nth(2))
        .collect::<Vec<_>>();
    assert_eq!(ids.len(), 2);
    assert_eq!(ids[0], ids[1]);

    Ok(())
}
