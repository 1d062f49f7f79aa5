use crate::areas::repository::Repository;
use crate::artifacts::checkout::restoration::Restoration;
use std::io::Write;

impl Repository {
    /// Restore the working tree and index to the snapshot a reference
    /// (or object id) resolves to, then move HEAD there.
    ///
    /// A branch name leaves HEAD attached to that branch; anything else
    /// detaches it at the resolved commit. Each step fails fast with no
    /// rollback of whatever was already restored.
    pub fn checkout(&mut self, target: &str) -> anyhow::Result<()> {
        let target_oid = self.resolve_ref(target)?;
        let commit = self.database().load_commit(&target_oid)?;
        let entries = self.database().read_tree(commit.tree_oid(), true)?;

        let mut index = self.index();
        index.rehydrate()?;

        let restoration = Restoration::new(self, entries);
        restoration.apply()?;
        restoration.rebuild_index(&mut index)?;
        index.write_updates()?;

        self.refs().set_head(target, target_oid.as_ref().into())?;

        let new_ref = self.refs().current_ref(None)?;
        if new_ref.is_detached_head() {
            writeln!(
                self.writer(),
                "HEAD is now at {} {}",
                target_oid.to_short_oid(),
                commit.short_message()
            )?;
        } else {
            writeln!(self.writer(), "Switched to branch '{}'", target)?;
        }

        Ok(())
    }
}
