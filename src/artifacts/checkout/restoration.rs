//! Checkout restoration planner
//!
//! Reconciles the working directory with a target tree in two passes:
//!
//! 1. Prune: walk the working tree bottom-up; delete every non-ignored
//!    file that is absent from the target or whose content hash differs
//!    from the target's recorded hash, then try to remove now-empty
//!    directories the target does not imply. Directory removal failures
//!    are swallowed: a directory still holding ignored files is an
//!    expected outcome, not an error.
//! 2. Restore: write every target entry that is not on disk after the
//!    prune, creating directories as needed.
//!
//! Afterwards the index is rebuilt from the target tree directly, with
//! metadata captured from the freshly restored files, so the staged
//! state matches the restored snapshot exactly.
//!
//! Each step fails fast; a missing or corrupt object aborts the whole
//! checkout with no guarantees about partial on-disk state.

use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::tree::TreeEntry;
use crate::artifacts::status::inspector::Inspector;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

pub struct Restoration<'r> {
    repository: &'r Repository,
    /// Target snapshot, path to entry
    target: BTreeMap<PathBuf, TreeEntry>,
    /// Directories the target snapshot implies
    target_dirs: BTreeSet<PathBuf>,
}

impl<'r> Restoration<'r> {
    pub fn new(repository: &'r Repository, entries: Vec<TreeEntry>) -> Self {
        let mut target = BTreeMap::new();
        let mut target_dirs = BTreeSet::new();

        for entry in entries {
            for ancestor in ancestors_of(&entry.path) {
                target_dirs.insert(ancestor);
            }
            target.insert(entry.path.clone(), entry);
        }

        Restoration {
            repository,
            target,
            target_dirs,
        }
    }

    /// Bring the working tree in line with the target snapshot
    pub fn apply(&self) -> anyhow::Result<()> {
        self.prune()?;
        self.restore()
    }

    fn prune(&self) -> anyhow::Result<()> {
        let inspector = Inspector::new(self.repository);

        for (path, is_dir) in self.repository.workspace().walk_bottom_up()? {
            if is_dir {
                if !self.target_dirs.contains(&path) {
                    let _ = self.repository.workspace().remove_dir(&path);
                }
                continue;
            }

            match self.target.get(&path) {
                None => self.repository.workspace().remove_file(&path)?,
                Some(entry) => {
                    if inspector.workspace_oid(&path)? != entry.oid {
                        self.repository.workspace().remove_file(&path)?;
                    }
                }
            }
        }

        Ok(())
    }

    fn restore(&self) -> anyhow::Result<()> {
        for (path, entry) in &self.target {
            if self.repository.workspace().file_exists(path) {
                continue;
            }

            let blob = self.repository.database().load_blob(&entry.oid)?;
            self.repository
                .workspace()
                .write_file(path, blob.content(), &entry.mode)?;
        }

        Ok(())
    }

    /// Rebuild the staged set from the target snapshot, capturing live
    /// filesystem metadata from the restored files
    pub fn rebuild_index(&self, index: &mut Index) -> anyhow::Result<()> {
        index.reset();

        for (path, entry) in &self.target {
            let stat = self.repository.workspace().stat_file(path)?;
            index.add(IndexEntry::new(path.clone(), entry.oid.clone(), stat));
        }

        Ok(())
    }
}

/// Proper ancestor directories of a relative path, nearest the root
/// first
fn ancestors_of(path: &Path) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    let mut parent = path.parent();

    while let Some(dir) = parent {
        if !dir.as_os_str().is_empty() {
            dirs.push(dir.to_path_buf());
        }
        parent = dir.parent();
    }

    dirs.reverse();
    dirs
}
