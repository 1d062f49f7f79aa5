use crate::areas::repository::Repository;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use derive_new::new;
use std::path::Path;

/// Content comparisons between the working tree and the staged set
#[derive(new)]
pub struct Inspector<'r> {
    repository: &'r Repository,
}

impl Inspector<'_> {
    /// Content id the working copy of a path would hash to
    pub fn workspace_oid(&self, path: &Path) -> anyhow::Result<ObjectId> {
        let data = self.repository.workspace().read_file(path)?;
        Blob::new(data).object_id()
    }

    /// Whether the working copy of a staged path diverges from the
    /// staged content.
    ///
    /// Matching size, mode and timestamps mean the file has not been
    /// touched since staging, which settles the question without
    /// hashing. Anything else falls through to a content hash
    /// comparison, so a touched-but-unchanged file still reads as clean.
    pub fn is_workspace_modified(&self, entry: &IndexEntry) -> anyhow::Result<bool> {
        let stat = self.repository.workspace().stat_file(&entry.name)?;

        if !entry.stat_match(&stat) {
            return Ok(true);
        }
        if entry.times_match(&stat) {
            return Ok(false);
        }

        Ok(self.workspace_oid(&entry.name)? != entry.oid)
    }
}
