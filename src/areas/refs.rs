//! References (branches, HEAD, tags)
//!
//! References are human-readable names pointing at commits. They can be:
//! - Direct: containing an object id
//! - Symbolic: pointing to another reference (e.g., HEAD -> refs/heads/master)
//!
//! ## Reference Types
//!
//! - HEAD: special reference pointing to the current branch or commit
//! - Branches: refs/heads/* pointing to branch tip commits
//! - Tags: refs/tags/* pointing to tagged commits
//!
//! ## File Format
//!
//! References are stored as text files containing either a 40-character
//! hex id (direct) or `ref: <path>` (symbolic). Symbolic indirection may
//! be several levels deep and is always followed to the end.

use crate::artifacts::branch::branch_name::{BranchName, SymRefName};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::Error;
use anyhow::Context;
use derive_new::new;
use file_guard::Lock;
use std::io::Write;
use std::ops::DerefMut;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// References manager
///
/// Handles reading and writing references under the metadata directory.
/// Reference updates take exclusive file locks.
#[derive(Debug, new)]
pub struct Refs {
    /// Path to the metadata directory (typically `.kit`)
    path: Box<Path>,
}

/// Regex pattern for parsing symbolic references
const SYMREF_REGEX: &str = r"^ref: (.+)$";

/// Name of the HEAD reference
pub const HEAD_REF_NAME: &str = "HEAD";

/// Internal representation of a reference value
#[derive(Debug, Clone)]
enum SymRefOrOid {
    /// Symbolic reference pointing to another ref
    SymRef { sym_ref_name: SymRefName },
    /// Direct object id
    Oid(ObjectId),
}

impl SymRefOrOid {
    fn read_symref_or_oid(path: &Path) -> anyhow::Result<Option<SymRefOrOid>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)?;
        let content = content.trim();

        if content.is_empty() {
            return Ok(None);
        }

        let symref_match = regex::Regex::new(SYMREF_REGEX)?.captures(content);
        if let Some(symref_match) = symref_match {
            Ok(Some(SymRefOrOid::SymRef {
                sym_ref_name: SymRefName::new(symref_match[1].to_string()),
            }))
        } else {
            Ok(Some(SymRefOrOid::Oid(ObjectId::try_parse(
                content.to_string(),
            )?)))
        }
    }
}

impl Refs {
    /// Resolve a reference name to the object id it points at.
    ///
    /// Tries, in order, the name itself, `refs/tags/<name>` and
    /// `refs/heads/<name>` as paths under the metadata directory; the
    /// first file that exists is dereferenced through any symbolic
    /// indirection. Returns `Ok(None)` when no reference file matches
    /// (the caller may then treat the name as a literal object id) or
    /// when the matched file is empty.
    pub fn resolve(&self, ref_name: &str) -> anyhow::Result<Option<ObjectId>> {
        match self.find_ref_path(ref_name) {
            Some(ref_path) => self.read_symref(&ref_path),
            None => Ok(None),
        }
    }

    fn find_ref_path(&self, ref_name: &str) -> Option<PathBuf> {
        [
            self.path.join(ref_name),
            self.tags_path().join(ref_name),
            self.heads_path().join(ref_name),
        ]
        .into_iter()
        .find(|path| path.is_file())
    }

    /// Update a reference to a new value.
    ///
    /// With `deref`, symbolic indirection is followed first so the final
    /// concrete reference file is the one written; otherwise the named
    /// file itself is overwritten. An empty value is never valid.
    pub fn update_ref(&self, ref_name: &str, value: &str, deref: bool) -> anyhow::Result<()> {
        if value.is_empty() {
            return Err(Error::InvalidObjectId(String::new()).into());
        }

        let ref_path = self.path.join(ref_name);

        if deref && ref_path.exists() {
            let oid = ObjectId::try_parse(value.to_string())?;
            self.update_symref(&ref_path, oid)
        } else {
            self.update_ref_file(ref_path.into_boxed_path(), value.to_string())
        }
    }

    /// Get the current symbolic reference
    ///
    /// Follows symbolic references recursively to find the final direct
    /// reference. For example, if HEAD points to refs/heads/master,
    /// returns refs/heads/master.
    pub fn current_ref(&self, source: Option<SymRefName>) -> anyhow::Result<SymRefName> {
        let source = source.unwrap_or_else(|| SymRefName::new(HEAD_REF_NAME.to_string()));

        let ref_content =
            SymRefOrOid::read_symref_or_oid(self.path.join(source.as_ref_path()).as_path())?;

        match ref_content {
            Some(SymRefOrOid::SymRef { sym_ref_name }) => Ok(self.current_ref(Some(sym_ref_name))?),
            Some(_) | None => Ok(source),
        }
    }

    /// Read a reference file, following symbolic indirection down to an
    /// object id
    fn read_symref(&self, path: &Path) -> anyhow::Result<Option<ObjectId>> {
        let ref_content = SymRefOrOid::read_symref_or_oid(path)?;

        match ref_content {
            Some(SymRefOrOid::SymRef { sym_ref_name }) => {
                self.read_symref(self.path.join(sym_ref_name.as_ref_path()).as_path())
            }
            Some(SymRefOrOid::Oid(oid)) => Ok(Some(oid)),
            None => Ok(None),
        }
    }

    /// Update a reference to point to a new commit, following symbolic
    /// indirection so the concrete reference at the end of the chain is
    /// the file written.
    ///
    /// # Locking
    ///
    /// Holds an exclusive lock on the reference file during the update.
    fn update_symref(&self, path: &Path, oid: ObjectId) -> anyhow::Result<()> {
        let mut ref_file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .with_context(|| format!("failed to open ref file at {:?}", path))?;
        let mut lock = file_guard::lock(&mut ref_file, Lock::Exclusive, 0, 1)?;

        let ref_content = SymRefOrOid::read_symref_or_oid(path)?;

        match ref_content {
            Some(SymRefOrOid::SymRef { sym_ref_name }) => {
                let target_path = self.path.join(sym_ref_name.as_ref_path());
                if !target_path.exists() {
                    return self
                        .update_ref_file(target_path.into_boxed_path(), oid.as_ref().to_string());
                }
                self.update_symref(target_path.as_path(), oid)
            }
            Some(SymRefOrOid::Oid(_)) | None => {
                lock.deref_mut().write_all(oid.as_ref().as_bytes())?;
                Ok(())
            }
        }
    }

    /// Point HEAD at a checkout target.
    ///
    /// An existing branch name attaches HEAD symbolically; anything else
    /// is written raw, leaving HEAD detached at an object id.
    pub fn set_head(&self, target: &str, raw_ref: String) -> anyhow::Result<()> {
        let target_path = self.heads_path().join(target);

        if target_path.exists() {
            self.update_ref_file(self.head_path(), format!("ref: refs/heads/{}", target))
        } else {
            self.update_ref_file(self.head_path(), raw_ref)
        }
    }

    /// Advance the reference HEAD points at (the branch tip, or HEAD
    /// itself when detached)
    pub fn update_head(&self, oid: ObjectId) -> anyhow::Result<()> {
        self.update_symref(self.head_path().as_ref(), oid)
    }

    pub fn read_head(&self) -> anyhow::Result<Option<ObjectId>> {
        self.read_symref(&self.head_path())
    }

    fn update_ref_file(&self, path: Box<Path>, raw_ref: String) -> anyhow::Result<()> {
        std::fs::create_dir_all(path.parent().with_context(|| {
            format!(
                "failed to create parent directories for ref file at {:?}",
                path
            )
        })?)?;

        let mut ref_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path.clone())
            .with_context(|| format!("failed to open ref file at {:?}", path))?;
        let mut lock = file_guard::lock(&mut ref_file, Lock::Exclusive, 0, 1)?;
        lock.deref_mut().write_all(raw_ref.as_bytes())?;

        Ok(())
    }

    pub fn create_branch(&self, name: &BranchName, source_oid: ObjectId) -> anyhow::Result<()> {
        let branch_path = self.heads_path().join(name.as_ref()).into_boxed_path();

        if branch_path.exists() {
            anyhow::bail!("branch {} already exists", name);
        }

        self.update_ref_file(branch_path, source_oid.as_ref().into())
    }

    pub fn create_tag(&self, name: &BranchName, source_oid: ObjectId) -> anyhow::Result<()> {
        let tag_path = self.tags_path().join(name.as_ref()).into_boxed_path();

        if tag_path.exists() {
            anyhow::bail!("tag {} already exists", name);
        }

        self.update_ref_file(tag_path, source_oid.as_ref().into())
    }

    pub fn list_branches(&self) -> anyhow::Result<Vec<String>> {
        self.list_refs(self.heads_path().as_ref())
    }

    pub fn list_tags(&self) -> anyhow::Result<Vec<String>> {
        self.list_refs(self.tags_path().as_ref())
    }

    /// List reference names under one of the refs directories, relative
    /// to that directory
    fn list_refs(&self, path: &Path) -> anyhow::Result<Vec<String>> {
        let mut names = WalkDir::new(path)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| {
                let relative_path = entry.path().strip_prefix(path).ok()?;
                Some(relative_path.to_string_lossy().to_string())
            })
            .collect::<Vec<_>>();
        names.sort();

        Ok(names)
    }

    pub fn head_path(&self) -> Box<Path> {
        self.path.join(HEAD_REF_NAME).into_boxed_path()
    }

    pub fn refs_path(&self) -> Box<Path> {
        self.path.join("refs").into_boxed_path()
    }

    pub fn heads_path(&self) -> Box<Path> {
        self.refs_path().join("heads").into_boxed_path()
    }

    pub fn tags_path(&self) -> Box<Path> {
        self.refs_path().join("tags").into_boxed_path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use sha1::Digest;

    fn oid_of(data: &str) -> ObjectId {
        let mut hasher = sha1::Sha1::new();
        hasher.update(data);
        ObjectId::try_parse(format!("{:x}", hasher.finalize())).unwrap()
    }

    fn temp_refs() -> (assert_fs::TempDir, Refs) {
        let dir = assert_fs::TempDir::new().unwrap();
        let metadata = dir.path().join(".kit");
        std::fs::create_dir_all(metadata.join("refs/heads")).unwrap();
        std::fs::create_dir_all(metadata.join("refs/tags")).unwrap();
        let refs = Refs::new(metadata.into_boxed_path());
        (dir, refs)
    }

    #[test]
    fn an_unknown_name_resolves_to_nothing() {
        let (_dir, refs) = temp_refs();

        assert!(refs.resolve("nope").unwrap().is_none());
    }

    #[test]
    fn tags_shadow_branches_of_the_same_name() {
        let (_dir, refs) = temp_refs();

        let branch_oid = oid_of("branch");
        let tag_oid = oid_of("tag");
        refs.update_ref("refs/heads/release", branch_oid.as_ref(), false)
            .unwrap();
        refs.update_ref("refs/tags/release", tag_oid.as_ref(), false)
            .unwrap();

        pretty_assertions::assert_eq!(refs.resolve("release").unwrap(), Some(tag_oid));
    }

    #[test]
    fn symbolic_chains_are_followed_to_the_end() {
        let (_dir, refs) = temp_refs();

        let oid = oid_of("tip");
        refs.update_ref("refs/heads/master", oid.as_ref(), false)
            .unwrap();
        refs.update_ref("HEAD", "ref: refs/heads/alias", false).unwrap();
        refs.update_ref("refs/heads/alias", "ref: refs/heads/master", false)
            .unwrap();

        pretty_assertions::assert_eq!(refs.resolve("HEAD").unwrap(), Some(oid.clone()));
        pretty_assertions::assert_eq!(refs.read_head().unwrap(), Some(oid));
    }

    #[test]
    fn dereferencing_updates_write_the_end_of_the_chain() {
        let (_dir, refs) = temp_refs();

        refs.update_ref("refs/heads/master", oid_of("old").as_ref(), false)
            .unwrap();
        refs.update_ref("HEAD", "ref: refs/heads/master", false).unwrap();

        let new_oid = oid_of("new");
        refs.update_ref("HEAD", new_oid.as_ref(), true).unwrap();

        // HEAD itself still points at the branch, the branch moved
        let head = std::fs::read_to_string(refs.head_path()).unwrap();
        pretty_assertions::assert_eq!(head.trim(), "ref: refs/heads/master");
        pretty_assertions::assert_eq!(
            refs.resolve("refs/heads/master").unwrap(),
            Some(new_oid)
        );
    }

    #[test]
    fn empty_values_are_rejected() {
        let (_dir, refs) = temp_refs();

        let err = refs.update_ref("refs/heads/master", "", false).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::InvalidObjectId(_))
        ));
    }
}
