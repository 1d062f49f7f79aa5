use crate::areas::repository::Repository;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::blob::Blob;
use std::path::Path;

impl Repository {
    /// Stage the given paths for the next commit.
    ///
    /// Directories are expanded to the non-ignored files beneath them.
    /// Each file's content is stored as a blob; the resulting entry
    /// replaces any prior entry for the same path and the index is
    /// persisted sorted by path. Paths that do not exist are skipped.
    pub fn add(&mut self, paths: &[String]) -> anyhow::Result<()> {
        let mut index = self.index();

        // Load the index file from the disk
        index.rehydrate()?;

        // Expand each provided path to the files beneath it
        let paths = paths
            .iter()
            .map(Path::new)
            .filter(|path| self.workspace().path().join(path).exists())
            .map(|path| self.workspace().list_files(Some(path)))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .flatten();

        for path in paths {
            let data = self.workspace().read_file(&path)?;
            let stat = self.workspace().stat_file(&path)?;

            let blob_oid = self.database().store(Blob::new(data))?;
            index.add(IndexEntry::new(path, blob_oid, stat));
        }

        index.write_updates()?;

        Ok(())
    }
}
