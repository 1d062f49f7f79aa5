//! A minimal content-addressable version control engine.
//!
//! The crate is organized in three layers:
//!
//! - `areas`: the on-disk areas of a repository (object database, staging
//!   index, references, working tree, configuration)
//! - `artifacts`: the data structures and codecs those areas exchange
//!   (objects, index records, status reports, checkout plans)
//! - `commands`: plumbing and porcelain operations implemented on top of
//!   the repository handle

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod errors;
