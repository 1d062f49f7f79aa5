use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use std::io::Write;

impl Repository {
    /// Create a lightweight tag at the current HEAD commit, or list the
    /// existing tags when no name is given.
    pub fn tag(&mut self, name: Option<&str>) -> anyhow::Result<()> {
        match name {
            Some(name) => {
                // tag names follow the same refname rules as branches
                let tag_name = BranchName::try_parse(name.to_string())?;

                let source_oid = self
                    .refs()
                    .read_head()?
                    .ok_or_else(|| anyhow::anyhow!("no current HEAD to tag"))?;

                self.refs().create_tag(&tag_name, source_oid)
            }
            None => {
                for tag in self.refs().list_tags()? {
                    writeln!(self.writer(), "{}", tag)?;
                }

                Ok(())
            }
        }
    }
}
