use crate::areas::repository::Repository;
use anyhow::Context;
use std::fs;
use std::io::Write;

const DEFAULT_BRANCH: &str = "master";

impl Repository {
    pub fn init(&mut self) -> anyhow::Result<()> {
        fs::create_dir_all(self.database().objects_path())
            .context("Failed to create the objects directory")?;

        fs::create_dir_all(self.refs().heads_path())
            .context("Failed to create the refs/heads directory")?;

        fs::create_dir_all(self.refs().tags_path())
            .context("Failed to create the refs/tags directory")?;

        self.refs()
            .set_head(
                DEFAULT_BRANCH,
                format!("ref: refs/heads/{}", DEFAULT_BRANCH),
            )
            .context("Failed to create initial HEAD reference")?;

        // make sure the default branch file exists so the first commit
        // has a concrete reference to advance
        let head_ref_path = self.refs().heads_path().join(DEFAULT_BRANCH);
        if !head_ref_path.exists() {
            fs::write(&head_ref_path, b"").context("Failed to create default branch file")?;
        }

        writeln!(
            self.writer(),
            "Initialized empty Kit repository in {}",
            self.path().display()
        )?;

        Ok(())
    }
}
