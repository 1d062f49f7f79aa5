use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use std::io::Write;

impl Repository {
    /// Create a branch at the current HEAD commit, or list the existing
    /// branches when no name is given.
    pub fn branch(&mut self, name: Option<&str>) -> anyhow::Result<()> {
        match name {
            Some(name) => {
                let branch_name = BranchName::try_parse(name.to_string())?;

                let source_oid = self
                    .refs()
                    .read_head()?
                    .ok_or_else(|| anyhow::anyhow!("no current HEAD to branch from"))?;

                self.refs().create_branch(&branch_name, source_oid)
            }
            None => {
                let current_ref = self.refs().current_ref(None)?;
                let current_branch = BranchName::try_parse_sym_ref_name(&current_ref).ok();

                for branch in self.refs().list_branches()? {
                    let marker = match &current_branch {
                        Some(current) if current.as_ref() == branch => "* ",
                        _ => "  ",
                    };
                    writeln!(self.writer(), "{}{}", marker, branch)?;
                }

                Ok(())
            }
        }
    }
}
