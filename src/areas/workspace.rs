//! Working directory file system operations
//!
//! All paths exchanged with the rest of the engine are relative to the
//! repository root; the workspace joins them onto its root for the
//! actual filesystem calls and strips the root again on the way out.

use crate::areas::ignores::Ignores;
use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::index::index_entry::EntryMetadata;
use anyhow::Context;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
    ignores: Ignores,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        let ignores = Ignores::load(&path);
        Workspace { path, ignores }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_ignored(&self, path: &Path) -> bool {
        self.ignores.is_ignored(path)
    }

    /// List the non-ignored files under a path, relative to the
    /// repository root and sorted.
    ///
    /// `root_file_path` may name a single file, a directory, or nothing
    /// (the whole working tree).
    pub fn list_files(&self, root_file_path: Option<&Path>) -> anyhow::Result<Vec<PathBuf>> {
        let root_file_path = match root_file_path {
            Some(p) => self.path.join(p),
            None => self.path.clone().into(),
        };

        if !root_file_path.exists() {
            anyhow::bail!("The specified path does not exist: {:?}", root_file_path);
        }

        if root_file_path.is_dir() {
            let mut files = WalkDir::new(&root_file_path)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter_map(|entry| self.check_if_not_ignored_file_path(entry.path()))
                .collect::<Vec<_>>();
            files.sort();
            Ok(files)
        } else {
            Ok(self
                .check_if_not_ignored_file_path(&root_file_path)
                .into_iter()
                .collect())
        }
    }

    /// Walk every non-ignored entry bottom-up, children before their
    /// directories. Directories are flagged so callers can treat them
    /// separately.
    pub fn walk_bottom_up(&self) -> anyhow::Result<Vec<(PathBuf, bool)>> {
        Ok(WalkDir::new(self.path.as_ref())
            .contents_first(true)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let relative = entry.path().strip_prefix(self.path.as_ref()).ok()?;
                if relative.as_os_str().is_empty() || self.is_ignored(relative) {
                    return None;
                }
                Some((relative.to_path_buf(), entry.path().is_dir()))
            })
            .collect())
    }

    fn check_if_not_ignored_file_path(&self, path: &Path) -> Option<PathBuf> {
        if !path.is_file() {
            return None;
        }
        let relative = path.strip_prefix(self.path.as_ref()).ok()?;
        if self.is_ignored(relative) {
            return None;
        }
        Some(relative.to_path_buf())
    }

    pub fn read_file(&self, file_path: &Path) -> anyhow::Result<Bytes> {
        let file_path = self.path.join(file_path);

        let content = std::fs::read(&file_path)
            .with_context(|| format!("Failed to read file: {:?}", file_path))?;

        Ok(Bytes::from(content))
    }

    pub fn stat_file(&self, file_path: &Path) -> anyhow::Result<EntryMetadata> {
        let metadata = std::fs::metadata(self.path.join(file_path))?;

        (file_path, metadata).try_into()
    }

    pub fn file_exists(&self, file_path: &Path) -> bool {
        self.path.join(file_path).is_file()
    }

    /// Write a file, creating parent directories as needed and applying
    /// the given mode bits.
    pub fn write_file(&self, file_path: &Path, data: &[u8], mode: &EntryMode) -> anyhow::Result<()> {
        let full_path = self.path.join(file_path);

        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }

        std::fs::write(&full_path, data)
            .with_context(|| format!("Failed to write file: {:?}", file_path))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(mode.as_u32() & 0o7777);
            std::fs::set_permissions(&full_path, permissions)
                .with_context(|| format!("Failed to set permissions for file: {:?}", file_path))?;
        }
        #[cfg(not(unix))]
        let _ = mode;

        Ok(())
    }

    pub fn remove_file(&self, file_path: &Path) -> anyhow::Result<()> {
        let full_path = self.path.join(file_path);

        std::fs::remove_file(&full_path)
            .with_context(|| format!("Failed to remove file: {:?}", file_path))?;

        Ok(())
    }

    /// Remove a directory if it is empty. Failures are the caller's
    /// call to swallow; a directory still holding ignored files is an
    /// expected, non-erroneous outcome during checkout pruning.
    pub fn remove_dir(&self, dir_path: &Path) -> anyhow::Result<()> {
        let full_path = self.path.join(dir_path);

        std::fs::remove_dir(&full_path)
            .with_context(|| format!("Failed to remove directory: {:?}", dir_path))?;

        Ok(())
    }
}
