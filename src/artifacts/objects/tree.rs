//! Tree object
//!
//! A tree records a snapshot of the tracked files: one entry per path,
//! holding the POSIX mode, the path itself and the content id.
//!
//! ## Format
//!
//! On disk: `tree <size>\0<entries>`
//! Each entry: `<mode-octal> <path>\0<20-byte-sha1>`
//!
//! The encoding is deliberately flat: trees built from the index carry
//! one record per staged file with its full relative path, rather than
//! nesting a sub-tree per directory. Entries whose mode marks a
//! directory still reference nested trees and are expanded on read (see
//! `Database::read_tree`), so hand-assembled nested trees remain
//! readable.

use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::Error;
use anyhow::Context;
use bytes::Bytes;
use derive_new::new;
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// One record of a tree object
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct TreeEntry {
    /// Path relative to the repository root (or to the parent tree for
    /// nested trees)
    pub path: PathBuf,
    /// Content id of the blob (or nested tree) at this path
    pub oid: ObjectId,
    /// POSIX mode bits
    pub mode: EntryMode,
}

impl TreeEntry {
    pub fn is_tree(&self) -> bool {
        self.mode.is_tree()
    }

    pub fn object_type(&self) -> ObjectType {
        if self.is_tree() {
            ObjectType::Tree
        } else {
            ObjectType::Blob
        }
    }
}

/// Tree object representing a snapshot of tracked files
///
/// Entries are kept sorted by path, which makes the serialization
/// deterministic: the same staged set always hashes to the same tree id.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    entries: BTreeMap<PathBuf, TreeEntry>,
}

impl Tree {
    /// Build a tree from the staged entries.
    ///
    /// One record per index entry, full relative path, sorted by path.
    pub fn from_index<'e>(entries: impl Iterator<Item = &'e IndexEntry>) -> Self {
        let entries = entries
            .map(|entry| {
                (
                    entry.name.clone(),
                    TreeEntry::new(
                        entry.name.clone(),
                        entry.oid.clone(),
                        entry.metadata.mode.clone(),
                    ),
                )
            })
            .collect();

        Tree { entries }
    }

    pub fn entries(&self) -> impl Iterator<Item = &TreeEntry> {
        self.entries.values()
    }

    pub fn into_entries(self) -> impl Iterator<Item = TreeEntry> {
        self.entries.into_values()
    }

}

impl Packable for Tree {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut content_bytes = Vec::new();

        for entry in self.entries.values() {
            let path = entry
                .path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("non-utf8 path in tree entry"))?;

            let header = format!("{:o} {}", entry.mode.as_u32(), path);
            content_bytes.write_all(header.as_bytes())?;
            content_bytes.push(0);
            entry.oid.write_h40_to(&mut content_bytes)?;
        }

        let mut tree_bytes = Vec::new();
        let header = format!("{} {}\0", self.object_type().as_str(), content_bytes.len());
        tree_bytes.write_all(header.as_bytes())?;
        tree_bytes.write_all(&content_bytes)?;

        Ok(Bytes::from(tree_bytes))
    }
}

impl Unpackable for Tree {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let mut entries = BTreeMap::new();
        let mut reader = reader;

        // Reuse scratch buffers to reduce allocs
        let mut mode_bytes = Vec::new();
        let mut path_bytes = Vec::new();

        loop {
            mode_bytes.clear();
            let n = reader.read_until(b' ', &mut mode_bytes)?;
            if n == 0 {
                break; // clean EOF: no more entries
            }
            if *mode_bytes.last().unwrap() != b' ' {
                return Err(Error::CorruptObject("truncated tree record in mode".into()).into());
            }
            mode_bytes.pop(); // drop the space

            let mode_str = std::str::from_utf8(&mode_bytes)
                .map_err(|_| Error::CorruptObject("non-utf8 mode in tree record".into()))?;
            let mode = EntryMode::from_octal_str(mode_str)?;

            path_bytes.clear();
            let n = reader.read_until(b'\0', &mut path_bytes)?;
            if n == 0 || *path_bytes.last().unwrap() != b'\0' {
                return Err(Error::CorruptObject("truncated tree record in path".into()).into());
            }
            path_bytes.pop(); // drop NUL
            let path = PathBuf::from(
                std::str::from_utf8(&path_bytes)
                    .map_err(|_| Error::CorruptObject("non-utf8 path in tree record".into()))?,
            );

            let oid = ObjectId::read_h40_from(&mut reader)
                .map_err(|_| Error::CorruptObject("truncated tree record in object id".into()))
                .context("reading tree entry id")?;

            entries.insert(path.clone(), TreeEntry::new(path, oid, mode));
        }

        Ok(Tree { entries })
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }

    fn display(&self) -> String {
        self.entries
            .values()
            .map(|entry| {
                format!(
                    "{:06o} {} {}\t{}",
                    entry.mode.as_u32(),
                    entry.object_type().as_str(),
                    entry.oid.as_ref(),
                    entry.path.display()
                )
            })
            .collect::<Vec<String>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::index::entry_mode::FileMode;
    use crate::errors::Error;
    use sha1::Digest;
    use std::io::Cursor;

    fn oid_of(data: &str) -> ObjectId {
        let mut hasher = sha1::Sha1::new();
        hasher.update(data);
        ObjectId::try_parse(format!("{:x}", hasher.finalize())).unwrap()
    }

    fn payload_of(tree: &Tree) -> Bytes {
        let serialized = tree.serialize().unwrap();
        let nul = serialized.iter().position(|&b| b == 0).unwrap();
        serialized.slice(nul + 1..)
    }

    #[test]
    fn serialization_round_trips() {
        let mut tree = Tree::default();
        tree.entries.insert(
            PathBuf::from("a.txt"),
            TreeEntry::new(
                PathBuf::from("a.txt"),
                oid_of("hello"),
                EntryMode::File(FileMode::Regular),
            ),
        );
        tree.entries.insert(
            PathBuf::from("bin/run.sh"),
            TreeEntry::new(
                PathBuf::from("bin/run.sh"),
                oid_of("#!/bin/sh"),
                EntryMode::File(FileMode::Executable),
            ),
        );

        let parsed = Tree::deserialize(Cursor::new(payload_of(&tree))).unwrap();

        pretty_assertions::assert_eq!(
            parsed.entries().cloned().collect::<Vec<_>>(),
            tree.entries().cloned().collect::<Vec<_>>()
        );
    }

    #[test]
    fn entries_are_ordered_by_path() {
        let mut tree = Tree::default();
        for name in ["zebra.txt", "alpha.txt", "midway.txt"] {
            tree.entries.insert(
                PathBuf::from(name),
                TreeEntry::new(
                    PathBuf::from(name),
                    oid_of(name),
                    EntryMode::File(FileMode::Regular),
                ),
            );
        }

        let paths = tree
            .entries()
            .map(|e| e.path.display().to_string())
            .collect::<Vec<_>>();
        pretty_assertions::assert_eq!(paths, vec!["alpha.txt", "midway.txt", "zebra.txt"]);
    }

    #[test]
    fn truncated_record_is_a_corrupt_object() {
        let mut tree = Tree::default();
        tree.entries.insert(
            PathBuf::from("a.txt"),
            TreeEntry::new(
                PathBuf::from("a.txt"),
                oid_of("hello"),
                EntryMode::File(FileMode::Regular),
            ),
        );

        let payload = payload_of(&tree);
        // chop the record in the middle of the binary id
        let truncated = payload.slice(..payload.len() - 5);

        let err = Tree::deserialize(Cursor::new(truncated)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::CorruptObject(_))
        ));
    }
}
