//! Working-tree status classification
//!
//! Every path in the union of working tree, index and last commit is
//! classified independently into five sets; a path may appear in more
//! than one set, each one a distinct signal about the path.

pub mod inspector;
pub mod report;
