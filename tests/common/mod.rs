#![allow(dead_code)]

use assert_cmd::Command;
use kit::areas::repository::Repository;
use kit::artifacts::objects::commit::Author;
use predicates::prelude::predicate;
use std::path::Path;

/// Build a `kit` command running inside the given directory, with a
/// deterministic author identity in the environment.
pub fn kit(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("kit").expect("Failed to find kit binary");
    cmd.current_dir(dir)
        .env("KIT_AUTHOR_NAME", "Test Author")
        .env("KIT_AUTHOR_EMAIL", "test@example.com");
    cmd
}

pub fn init_repository(dir: &Path) {
    kit(dir).arg("init").assert().success().stdout(predicate::str::contains(
        "Initialized empty Kit repository in",
    ));
}

/// Object id the default branch currently points at
pub fn master_oid(dir: &Path) -> String {
    std::fs::read_to_string(dir.join(".kit/refs/heads/master"))
        .expect("master ref file")
        .trim()
        .to_string()
}

pub fn head_contents(dir: &Path) -> String {
    std::fs::read_to_string(dir.join(".kit/HEAD"))
        .expect("HEAD file")
        .trim()
        .to_string()
}

/// Open a repository handle for driving the engine through the library,
/// with output discarded
pub fn open_repository(dir: &Path) -> Repository {
    Repository::new(&dir.to_string_lossy(), Box::new(std::io::sink()))
        .expect("Failed to open repository")
}

pub fn test_author() -> Author {
    Author::new("Test Author".into(), "test@example.com".into())
}
