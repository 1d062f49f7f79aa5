//! Three-way status classification
//!
//! Given the set of on-disk non-ignored paths `W`, the staged path set
//! `I` and the last commit's flattened tree `C`, every path is
//! classified into five sorted sets:
//!
//! - `new_unstaged = W - I`: present on disk, never staged
//! - `deleted = I - W`: staged but missing from disk
//! - `modified_unstaged`: in `W ∩ I`, working copy diverges from the
//!   staged content
//! - `new_staged = (W ∩ I) - C`: staged content with no counterpart in
//!   the last commit
//! - `modified_staged`: in `W ∩ I ∩ C`, working copy matches the staged
//!   content and the staged content differs from the committed one (a
//!   change ready to be committed)
//!
//! The sets are not mutually exclusive; each is an independent signal.

use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::status::inspector::Inspector;
use colored::Colorize;
use derive_new::new;
use std::collections::BTreeSet;
use std::path::PathBuf;

pub type FileSet = BTreeSet<PathBuf>;

const LABEL_WIDTH: usize = 8;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusReport {
    pub new_unstaged: FileSet,
    pub deleted: FileSet,
    pub modified_unstaged: FileSet,
    pub new_staged: FileSet,
    pub modified_staged: FileSet,
}

impl StatusReport {
    pub fn is_clean(&self) -> bool {
        self.new_unstaged.is_empty()
            && self.deleted.is_empty()
            && self.modified_unstaged.is_empty()
            && self.new_staged.is_empty()
            && self.modified_staged.is_empty()
    }
}

impl std::fmt::Display for StatusReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_clean() {
            return writeln!(f, "nothing to commit, working tree clean");
        }

        if !self.new_staged.is_empty() || !self.modified_staged.is_empty() {
            writeln!(f, "Changes to be committed:")?;
            for path in &self.new_staged {
                writeln!(
                    f,
                    "{:>width$}{}{}",
                    "",
                    "new file:   ".green(),
                    path.display(),
                    width = LABEL_WIDTH
                )?;
            }
            for path in &self.modified_staged {
                writeln!(
                    f,
                    "{:>width$}{}{}",
                    "",
                    "modified:   ".green(),
                    path.display(),
                    width = LABEL_WIDTH
                )?;
            }
            writeln!(f)?;
        }

        if !self.modified_unstaged.is_empty() || !self.deleted.is_empty() {
            writeln!(f, "Changes not staged for commit:")?;
            for path in &self.modified_unstaged {
                writeln!(
                    f,
                    "{:>width$}{}{}",
                    "",
                    "modified:   ".red(),
                    path.display(),
                    width = LABEL_WIDTH
                )?;
            }
            for path in &self.deleted {
                writeln!(
                    f,
                    "{:>width$}{}{}",
                    "",
                    "deleted:    ".red(),
                    path.display(),
                    width = LABEL_WIDTH
                )?;
            }
            writeln!(f)?;
        }

        if !self.new_unstaged.is_empty() {
            writeln!(f, "Untracked files:")?;
            for path in &self.new_unstaged {
                writeln!(
                    f,
                    "{:>width$}{}",
                    "",
                    path.display().to_string().red(),
                    width = LABEL_WIDTH
                )?;
            }
        }

        Ok(())
    }
}

/// Status computation over a repository
#[derive(new)]
pub struct Status<'r> {
    repository: &'r Repository,
}

impl Status<'_> {
    /// Classify every relevant path. The index must already be
    /// rehydrated by the caller.
    pub fn report(&self, index: &Index) -> anyhow::Result<StatusReport> {
        let inspector = Inspector::new(self.repository);

        let workspace_files = self
            .repository
            .workspace()
            .list_files(None)?
            .into_iter()
            .collect::<FileSet>();
        let head_tree = self.repository.head_tree()?;

        let mut report = StatusReport::default();

        for path in &workspace_files {
            if index.entry_by_path(path).is_none() {
                report.new_unstaged.insert(path.clone());
            }
        }

        for entry in index.entries() {
            if !workspace_files.contains(&entry.name) {
                report.deleted.insert(entry.name.clone());
                continue;
            }

            let staged_matches_disk = !inspector.is_workspace_modified(entry)?;
            if !staged_matches_disk {
                report.modified_unstaged.insert(entry.name.clone());
            }

            match head_tree.get(&entry.name) {
                None => {
                    report.new_staged.insert(entry.name.clone());
                }
                Some(head_entry) if staged_matches_disk && head_entry.oid != entry.oid => {
                    report.modified_staged.insert(entry.name.clone());
                }
                Some(_) => {}
            }
        }

        Ok(report)
    }
}
