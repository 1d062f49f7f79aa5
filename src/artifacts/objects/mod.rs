//! Object types and codecs
//!
//! All repository content is stored as objects identified by SHA-1 hashes.
//! There are three types:
//!
//! - **Blob**: file content (raw bytes)
//! - **Tree**: directory snapshot (mode, path and object id per entry)
//! - **Commit**: snapshot with metadata (tree, parent, author, message)
//!
//! All objects implement serialization/deserialization for the on-disk
//! object format: `<type> <size>\0<content>`

pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;
pub mod tree;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;

/// Shortest object id or prefix accepted from the user
pub const MIN_PREFIX_LENGTH: usize = 3;
