//! Command implementations
//!
//! Organized in two categories following the usual split:
//!
//! - `plumbing`: low-level commands for direct object and index
//!   inspection (hash-object, cat-file, ls-files, ls-tree)
//! - `porcelain`: user-facing commands for version control workflows
//!   (init, add, commit, status, checkout, branch, tag, config)
//!
//! Plumbing commands provide building blocks, while porcelain commands
//! compose them into higher-level operations.

pub mod plumbing;
pub mod porcelain;
