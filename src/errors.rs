//! Typed failures of the storage engine.
//!
//! Every variant is unrecoverable at the point of detection: each one
//! signals a missing or corrupted on-disk artifact, or caller misuse.
//! The engine never retries and never silently repairs corruption.
//!
//! Errors propagate as `anyhow::Error`; callers that need to react to a
//! specific failure can recover the variant with
//! `err.downcast_ref::<Error>()`.

use crate::artifacts::objects::object_type::ObjectType;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A user-supplied object id is not hexadecimal or has an
    /// unsupported length (valid ids and prefixes are 3 to 40 hex chars).
    #[error("invalid object id '{0}'")]
    InvalidObjectId(String),

    /// No object in the database matches the given prefix.
    #[error("object '{0}' not found")]
    NotFound(String),

    /// More than one object matches the given prefix.
    #[error("multiple objects ({count}) with prefix '{prefix}'")]
    AmbiguousId { prefix: String, count: usize },

    /// An object file decompressed into something other than what its
    /// header declares.
    #[error("corrupt object: {0}")]
    CorruptObject(String),

    /// The index file failed checksum, signature, version or entry-count
    /// validation.
    #[error("corrupt index: {0}")]
    CorruptIndex(String),

    /// An object was read as the wrong type.
    #[error("expected object type {expected}, got {actual}")]
    WrongType {
        expected: ObjectType,
        actual: ObjectType,
    },

    /// A commit payload is missing one of its positional fields.
    #[error("malformed commit: {0}")]
    MalformedCommit(String),

    /// A staged path exceeds the capacity of the index flags field.
    #[error("path '{path}' is {length} bytes, exceeding the index path limit")]
    PathTooLong { path: PathBuf, length: usize },
}
