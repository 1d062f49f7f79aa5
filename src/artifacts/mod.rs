//! Data structures and algorithms
//!
//! This module contains the core types the repository areas exchange:
//!
//! - `branch`: branch and reference name validation
//! - `checkout`: working-tree restoration planner
//! - `index`: binary index (staging area) record formats
//! - `objects`: object types and codecs (blob, tree, commit)
//! - `status`: working-tree/index/commit classification

pub mod branch;
pub mod checkout;
pub mod index;
pub mod objects;
pub mod status;
