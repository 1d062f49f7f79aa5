//! Content-addressable object database
//!
//! Objects are zlib-compressed and stored under
//! `objects/<first-2-hex>/<remaining-38-hex>`. Once written an object is
//! never mutated: identical content hashes to the identical id, so a
//! write for an existing path is skipped. Writes go through a temp file
//! and an atomic rename, which makes racing writers harmless.

use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{Object, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::{Tree, TreeEntry};
use crate::errors::Error;
use anyhow::Context;
use bytes::Bytes;
use sha1::{Digest, Sha1};
use std::io::{Cursor, Read, Write};
use std::path::Path;

#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    /// Hash raw payload bytes as an object of the given type.
    ///
    /// The id is the SHA-1 of `"{type} {len}\0" + payload`. With `write`
    /// the compressed object is persisted as well; without it this is a
    /// pure function.
    pub fn hash_object(
        &self,
        data: &[u8],
        object_type: ObjectType,
        write: bool,
    ) -> anyhow::Result<ObjectId> {
        let mut full_data = Vec::with_capacity(data.len() + 16);
        write!(full_data, "{} {}\0", object_type.as_str(), data.len())?;
        full_data.extend_from_slice(data);

        let mut hasher = Sha1::new();
        hasher.update(&full_data);
        let oid = ObjectId::try_parse(format!("{:x}", hasher.finalize()))?;

        if write {
            self.write_object(&oid, Bytes::from(full_data))?;
        }

        Ok(oid)
    }

    /// Persist a serializable object, returning its id.
    pub fn store(&self, object: impl Object) -> anyhow::Result<ObjectId> {
        let object_content = object.serialize()?;
        let object_id = object.object_id()?;

        self.write_object(&object_id, object_content)?;

        Ok(object_id)
    }

    /// Resolve a hex prefix to the single object id it identifies.
    ///
    /// Scans the 2-char fan-out directory named by the first two prefix
    /// characters. Zero matches is `NotFound`, two or more is
    /// `AmbiguousId`. A full 40-char id always resolves uniquely if the
    /// object exists.
    pub fn find_object(&self, prefix: &str) -> anyhow::Result<ObjectId> {
        if prefix.len() < 2 || !prefix.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidObjectId(prefix.to_string()).into());
        }

        let dir_name = &prefix[..2];
        let file_prefix = &prefix[2..];
        let dir_path = self.path.join(dir_name);

        let mut matches = Vec::new();
        if dir_path.is_dir() {
            for entry in std::fs::read_dir(&dir_path)? {
                let entry = entry?;
                let file_name = entry.file_name();
                let file_name = file_name.to_string_lossy();

                if file_name.starts_with(file_prefix) {
                    matches.push(ObjectId::try_parse(format!("{dir_name}{file_name}"))?);
                }
            }
        }

        match matches.len() {
            0 => Err(Error::NotFound(prefix.to_string()).into()),
            1 => Ok(matches.pop().expect("one match")),
            count => Err(Error::AmbiguousId {
                prefix: prefix.to_string(),
                count,
            }
            .into()),
        }
    }

    /// Read an object by prefix, returning its type and payload.
    pub fn read_object(&self, prefix: &str) -> anyhow::Result<(ObjectType, Bytes)> {
        let object_id = self.find_object(prefix)?;
        self.read_object_by_id(&object_id)
    }

    /// Read an object by full id, returning its type and payload.
    ///
    /// Validates the declared payload size against the actual payload
    /// length and fails with `CorruptObject` on mismatch.
    pub fn read_object_by_id(&self, object_id: &ObjectId) -> anyhow::Result<(ObjectType, Bytes)> {
        let object_content = self.load(object_id)?;
        let mut object_reader = Cursor::new(object_content.clone());

        let (object_type, declared_size) = ObjectType::parse_header(&mut object_reader)?;
        let payload = object_content.slice(object_reader.position() as usize..);

        if declared_size != payload.len() {
            return Err(Error::CorruptObject(format!(
                "expected size {declared_size}, got {} bytes",
                payload.len()
            ))
            .into());
        }

        Ok((object_type, payload))
    }

    pub fn load_blob(&self, object_id: &ObjectId) -> anyhow::Result<Blob> {
        let payload = self.expect_type(object_id, ObjectType::Blob)?;
        Blob::deserialize(Cursor::new(payload))
    }

    pub fn load_tree(&self, object_id: &ObjectId) -> anyhow::Result<Tree> {
        let payload = self.expect_type(object_id, ObjectType::Tree)?;
        Tree::deserialize(Cursor::new(payload))
    }

    pub fn load_commit(&self, object_id: &ObjectId) -> anyhow::Result<Commit> {
        let payload = self.expect_type(object_id, ObjectType::Commit)?;
        Commit::deserialize(Cursor::new(payload))
    }

    /// Flatten a tree into its `(mode, path, id)` records.
    ///
    /// With `recursive`, entries whose mode marks a directory are
    /// expanded through the database depth-first, their children joined
    /// under the entry's path. Tree depth is bounded by filesystem path
    /// depth, so plain recursion suffices.
    pub fn read_tree(&self, object_id: &ObjectId, recursive: bool) -> anyhow::Result<Vec<TreeEntry>> {
        let tree = self.load_tree(object_id)?;
        let mut entries = Vec::new();

        for entry in tree.into_entries() {
            if recursive && entry.is_tree() {
                for child in self.read_tree(&entry.oid, true)? {
                    entries.push(TreeEntry::new(
                        entry.path.join(&child.path),
                        child.oid,
                        child.mode,
                    ));
                }
            } else {
                entries.push(entry);
            }
        }

        Ok(entries)
    }

    fn expect_type(&self, object_id: &ObjectId, expected: ObjectType) -> anyhow::Result<Bytes> {
        let (actual, payload) = self.read_object_by_id(object_id)?;

        if actual != expected {
            return Err(Error::WrongType { expected, actual }.into());
        }

        Ok(payload)
    }

    fn load(&self, object_id: &ObjectId) -> anyhow::Result<Bytes> {
        let object_path = self.path.join(object_id.to_path());

        let object_content = std::fs::read(&object_path).context(format!(
            "Unable to read object file {}",
            object_path.display()
        ))?;

        Self::decompress(object_content.into())
    }

    fn write_object(&self, object_id: &ObjectId, object_content: Bytes) -> anyhow::Result<()> {
        let object_path = self.path.join(object_id.to_path());

        // identical content never rewrites
        if object_path.exists() {
            return Ok(());
        }

        let object_dir = object_path
            .parent()
            .context(format!("Invalid object path {}", object_path.display()))?;
        std::fs::create_dir_all(object_dir).context(format!(
            "Unable to create object directory {}",
            object_dir.display()
        ))?;

        let temp_object_path = object_dir.join(Self::generate_temp_name());
        let object_content = Self::compress(object_content)?;

        let mut file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_object_path)
            .context(format!(
                "Unable to open object file {}",
                temp_object_path.display()
            ))?;

        file.write_all(&object_content).context(format!(
            "Unable to write object file {}",
            temp_object_path.display()
        ))?;

        // rename the temp file onto the object file to make the write atomic
        std::fs::rename(&temp_object_path, &object_path).context(format!(
            "Unable to rename object file to {}",
            object_path.display()
        ))?;

        Ok(())
    }

    fn compress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(&data)
            .context("Unable to compress object content")?;

        encoder
            .finish()
            .map(|compressed_content| compressed_content.into())
            .context("Unable to finish compressing object content")
    }

    fn decompress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(&*data);
        let mut decompressed_content = Vec::new();
        decoder
            .read_to_end(&mut decompressed_content)
            .context("Unable to decompress object content")?;

        Ok(decompressed_content.into())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::index::entry_mode::{EntryMode, FileMode};
    use proptest::proptest;

    fn temp_database() -> (assert_fs::TempDir, Database) {
        let dir = assert_fs::TempDir::new().unwrap();
        let database = Database::new(dir.path().join("objects").into_boxed_path());
        (dir, database)
    }

    #[test]
    fn hashing_is_deterministic_and_matches_the_header_formula() {
        let (_dir, database) = temp_database();

        let data = b"hello";
        let oid = database
            .hash_object(data, ObjectType::Blob, false)
            .unwrap();

        let mut hasher = Sha1::new();
        hasher.update(b"blob 5\0hello");
        let expected = format!("{:x}", hasher.finalize());

        pretty_assertions::assert_eq!(oid.as_ref(), expected);
        pretty_assertions::assert_eq!(
            database.hash_object(data, ObjectType::Blob, false).unwrap(),
            oid
        );
    }

    #[test]
    fn writing_the_same_content_twice_stores_one_object() {
        let (_dir, database) = temp_database();

        let first = database.hash_object(b"same", ObjectType::Blob, true).unwrap();
        let second = database.hash_object(b"same", ObjectType::Blob, true).unwrap();
        pretty_assertions::assert_eq!(first, second);

        let fanout = database.objects_path().join(&first.as_ref()[..2]);
        let stored = std::fs::read_dir(fanout).unwrap().count();
        assert_eq!(stored, 1);
    }

    #[test]
    fn read_returns_what_was_hashed() {
        let (_dir, database) = temp_database();

        let data = b"round trip payload";
        let oid = database.hash_object(data, ObjectType::Blob, true).unwrap();

        let (object_type, payload) = database.read_object(oid.as_ref()).unwrap();
        pretty_assertions::assert_eq!(object_type, ObjectType::Blob);
        pretty_assertions::assert_eq!(payload.as_ref(), data);
    }

    proptest! {
        #[test]
        fn hash_is_pure_without_write(data in proptest::collection::vec(proptest::prelude::any::<u8>(), 0..256)) {
            let (_dir, database) = temp_database();

            let oid = database.hash_object(&data, ObjectType::Blob, false).unwrap();

            let mut hasher = Sha1::new();
            hasher.update(format!("blob {}\0", data.len()).as_bytes());
            hasher.update(&data);
            assert_eq!(oid.as_ref(), format!("{:x}", hasher.finalize()));

            // nothing was persisted
            assert!(!database.objects_path().exists());
        }
    }

    #[test]
    fn unique_prefix_resolves_and_unknown_prefix_is_not_found() {
        let (_dir, database) = temp_database();

        let oid = database.hash_object(b"content", ObjectType::Blob, true).unwrap();

        let resolved = database.find_object(&oid.as_ref()[..6]).unwrap();
        pretty_assertions::assert_eq!(resolved, oid);

        let missing = if oid.as_ref().starts_with("00") { "ff00" } else { "0000" };
        let err = database.find_object(missing).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::NotFound(_))
        ));
    }

    #[test]
    fn shared_prefix_is_ambiguous() {
        let (_dir, database) = temp_database();

        // brute-force two blobs whose ids share the first three hex chars
        let mut seen = std::collections::HashMap::new();
        let mut pair = None;
        for n in 0..200_000u32 {
            let data = n.to_le_bytes();
            let oid = database.hash_object(&data, ObjectType::Blob, false).unwrap();
            let key = oid.as_ref()[..3].to_string();
            if let Some(previous) = seen.insert(key.clone(), data) {
                pair = Some((previous, data, key));
                break;
            }
        }
        let (first, second, prefix) = pair.expect("collision within the search limit");

        database.hash_object(&first, ObjectType::Blob, true).unwrap();
        database.hash_object(&second, ObjectType::Blob, true).unwrap();

        let err = database.find_object(&prefix).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::AmbiguousId { count: 2, .. })
        ));
    }

    #[test]
    fn size_mismatch_is_a_corrupt_object() {
        let (_dir, database) = temp_database();

        // declared size of 4 against a 5-byte payload
        let oid = database.hash_object(b"bogus", ObjectType::Blob, false).unwrap();
        let object_path = database.objects_path().join(oid.to_path());
        std::fs::create_dir_all(object_path.parent().unwrap()).unwrap();
        let corrupted = Database::compress(Bytes::from_static(b"blob 4\0bogus")).unwrap();
        std::fs::write(&object_path, corrupted).unwrap();

        let err = database.read_object_by_id(&oid).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::CorruptObject(_))
        ));
    }

    #[test]
    fn recursive_tree_read_reaches_every_leaf() {
        let (_dir, database) = temp_database();

        let leaf_a = database.hash_object(b"alpha", ObjectType::Blob, true).unwrap();
        let leaf_b = database.hash_object(b"beta", ObjectType::Blob, true).unwrap();
        let leaf_c = database.hash_object(b"gamma", ObjectType::Blob, true).unwrap();

        // inner tree holding two leaves, referenced from the root as "sub"
        let mut inner = Vec::new();
        for (name, oid) in [("one.txt", &leaf_a), ("two.txt", &leaf_b)] {
            inner.extend_from_slice(format!("100644 {name}\0").as_bytes());
            oid.write_h40_to(&mut inner).unwrap();
        }
        let inner_oid = database.hash_object(&inner, ObjectType::Tree, true).unwrap();

        let mut root = Vec::new();
        root.extend_from_slice(b"100644 top.txt\0");
        leaf_c.write_h40_to(&mut root).unwrap();
        root.extend_from_slice(b"40000 sub\0");
        inner_oid.write_h40_to(&mut root).unwrap();
        let root_oid = database.hash_object(&root, ObjectType::Tree, true).unwrap();

        let entries = database.read_tree(&root_oid, true).unwrap();
        let mut paths = entries
            .iter()
            .map(|e| e.path.display().to_string())
            .collect::<Vec<_>>();
        paths.sort();

        pretty_assertions::assert_eq!(paths, vec!["sub/one.txt", "sub/two.txt", "top.txt"]);
        assert!(entries.iter().all(|e| e.mode == EntryMode::File(FileMode::Regular)));
    }

    #[test]
    fn reading_a_blob_as_commit_is_a_wrong_type() {
        let (_dir, database) = temp_database();

        let oid = database.hash_object(b"plain", ObjectType::Blob, true).unwrap();
        let err = database.load_commit(&oid).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::WrongType {
                expected: ObjectType::Commit,
                actual: ObjectType::Blob,
            })
        ));
    }
}
