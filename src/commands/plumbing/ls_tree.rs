use crate::areas::repository::Repository;
use crate::artifacts::objects::object_type::ObjectType;
use std::io::Write;

impl Repository {
    /// List the entries of a tree object. A commit target lists its
    /// root tree; `recursive` expands nested trees into their leaves.
    pub fn ls_tree(&mut self, target: &str, recursive: bool) -> anyhow::Result<()> {
        let object_id = self.resolve_ref(target)?;

        let (object_type, _) = self.database().read_object_by_id(&object_id)?;
        let tree_oid = match object_type {
            ObjectType::Commit => self.database().load_commit(&object_id)?.tree_oid().clone(),
            _ => object_id,
        };

        for entry in self.database().read_tree(&tree_oid, recursive)? {
            writeln!(
                self.writer(),
                "{:06o} {} {}\t{}",
                entry.mode.as_u32(),
                entry.object_type(),
                entry.oid,
                entry.path.display()
            )?;
        }

        Ok(())
    }
}
