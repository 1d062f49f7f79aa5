use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::{Author, Commit};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Tree;
use std::io::Write;

impl Repository {
    /// Record the staged set as a new commit and advance the current
    /// branch (or HEAD itself when detached).
    ///
    /// The author defaults to the configured identity when not supplied.
    pub fn commit(&mut self, message: &str, author: Option<Author>) -> anyhow::Result<ObjectId> {
        let mut index = self.index();

        // Load the index file from the disk
        index.rehydrate()?;

        if index.is_empty() {
            anyhow::bail!("nothing to commit (staging area is empty)");
        }

        let tree = Tree::from_index(index.entries());
        let tree_oid = self.database().store(tree)?;

        let parent = self.refs().read_head()?;
        let is_root = match parent {
            Some(_) => "",
            None => "(root-commit) ",
        };

        let author = match author {
            Some(author) => author,
            None => Author::load(&self.config())?,
        };
        let message = message.trim().to_string();

        let commit = Commit::new(parent, tree_oid, author, message);
        let commit_oid = self.database().store(commit.clone())?;
        self.refs().update_head(commit_oid.clone())?;

        writeln!(
            self.writer(),
            "[{}{}] {}",
            is_root,
            commit_oid.to_short_oid(),
            commit.short_message()
        )?;

        Ok(commit_oid)
    }
}
