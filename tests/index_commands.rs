use assert_fs::fixture::{FileWriteStr, PathChild};
use assert_fs::prelude::PathCreateDir;
use fake::Fake;
use fake::faker::lorem::en::{Word, Words};
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;

mod common;

#[test]
fn add_single_file_to_index_successfully() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    common::init_repository(dir.path());

    let file_name = format!("{}.txt", Word().fake::<String>());
    let file_content = Words(5..10).fake::<Vec<String>>().join(" ");
    dir.child(&file_name).write_str(&file_content)?;

    common::kit(dir.path())
        .arg("add")
        .arg(&file_name)
        .assert()
        .success();

    common::kit(dir.path())
        .arg("ls-files")
        .assert()
        .success()
        .stdout(predicate::eq(format!("{file_name}\n")));

    Ok(())
}

#[test]
fn add_files_from_nested_directories_in_sorted_order() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    common::init_repository(dir.path());

    dir.child("zeta.txt").write_str("z")?;
    dir.child("lib").create_dir_all()?;
    dir.child("lib/beta.txt").write_str("b")?;
    dir.child("lib/alpha.txt").write_str("a")?;

    common::kit(dir.path()).arg("add").arg(".").assert().success();

    let output = common::kit(dir.path()).arg("ls-files").output()?;
    let listed = String::from_utf8(output.stdout)?;

    assert_eq!(listed, "lib/alpha.txt\nlib/beta.txt\nzeta.txt\n");

    Ok(())
}

#[test]
fn restaging_a_file_keeps_a_single_entry() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    common::init_repository(dir.path());

    dir.child("note.txt").write_str("first draft")?;
    common::kit(dir.path()).arg("add").arg("note.txt").assert().success();

    dir.child("note.txt").write_str("second draft")?;
    common::kit(dir.path()).arg("add").arg("note.txt").assert().success();

    common::kit(dir.path())
        .arg("ls-files")
        .assert()
        .success()
        .stdout(predicate::eq("note.txt\n"));

    Ok(())
}

#[test]
fn ls_files_stage_shows_mode_id_and_stage_number() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    common::init_repository(dir.path());

    dir.child("note.txt").write_str("detailed listing")?;
    common::kit(dir.path()).arg("add").arg("note.txt").assert().success();

    common::kit(dir.path())
        .arg("ls-files")
        .arg("--stage")
        .assert()
        .success()
        .stdout(predicate::str::is_match(
            r"^100644 [0-9a-f]{40} 0\tnote\.txt\n$",
        )?);

    Ok(())
}

#[test]
fn adding_a_non_existent_file_is_ignored() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    common::init_repository(dir.path());

    dir.child("real.txt").write_str("present")?;

    common::kit(dir.path())
        .arg("add")
        .arg("real.txt")
        .arg("missing.txt")
        .assert()
        .success();

    common::kit(dir.path())
        .arg("ls-files")
        .assert()
        .success()
        .stdout(predicate::eq("real.txt\n"));

    Ok(())
}

#[test]
fn excluded_paths_are_never_staged() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    dir.child(".kitignore").write_str("scratch\n")?;
    common::init_repository(dir.path());

    dir.child("kept.txt").write_str("kept")?;
    dir.child("scratch").create_dir_all()?;
    dir.child("scratch/junk.txt").write_str("junk")?;

    common::kit(dir.path()).arg("add").arg(".").assert().success();

    let output = common::kit(dir.path()).arg("ls-files").output()?;
    let listed = String::from_utf8(output.stdout)?;

    assert_eq!(listed, ".kitignore\nkept.txt\n");

    Ok(())
}
