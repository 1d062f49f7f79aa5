use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    /// List the staged paths, optionally with mode, id and stage number
    pub fn ls_files(&mut self, details: bool) -> anyhow::Result<()> {
        let mut index = self.index();
        index.rehydrate()?;

        for entry in index.entries() {
            if details {
                writeln!(
                    self.writer(),
                    "{:06o} {} {}\t{}",
                    entry.metadata.mode.as_u32(),
                    entry.oid,
                    entry.stage(),
                    entry.name.display()
                )?;
            } else {
                writeln!(self.writer(), "{}", entry.name.display())?;
            }
        }

        Ok(())
    }
}
