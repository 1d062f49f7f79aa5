//! Working-tree exclusion predicate
//!
//! Every walk of the working tree filters paths through `is_ignored`.
//! The metadata directory is always excluded; beyond that, literal
//! patterns are loaded from a `.kitignore` file at the repository root,
//! one per line. A pattern matches a path when it equals the whole
//! relative path or any single component of it. Richer pattern syntax is
//! a policy question that lives outside the storage engine.

use crate::areas::METADATA_DIR;
use std::path::Path;

/// Name of the exclusion file at the repository root
pub const IGNORE_FILE: &str = ".kitignore";

#[derive(Debug, Default)]
pub struct Ignores {
    patterns: Vec<String>,
}

impl Ignores {
    /// Load patterns from the repository root, tolerating a missing file
    pub fn load(root: &Path) -> Self {
        let patterns = std::fs::read_to_string(root.join(IGNORE_FILE))
            .map(|content| {
                content
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty() && !line.starts_with('#'))
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ignores { patterns }
    }

    /// Check a repository-relative path against the exclusion rules
    pub fn is_ignored(&self, path: &Path) -> bool {
        if path
            .to_str()
            .is_some_and(|p| self.patterns.iter().any(|pattern| pattern == p))
        {
            return true;
        }

        path.components().any(|component| {
            if let std::path::Component::Normal(name) = component {
                let name = name.to_string_lossy();
                name == METADATA_DIR || self.patterns.iter().any(|pattern| *pattern == name)
            } else {
                false
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn the_metadata_directory_is_always_ignored() {
        let ignores = Ignores::default();

        assert!(ignores.is_ignored(&PathBuf::from(".kit")));
        assert!(ignores.is_ignored(&PathBuf::from(".kit/objects/ab/cdef")));
        assert!(!ignores.is_ignored(&PathBuf::from("src/main.rs")));
    }

    #[test]
    fn patterns_match_components_and_whole_paths() {
        let dir = assert_fs::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(IGNORE_FILE),
            "# build output\ntarget\nnotes/secret.txt\n",
        )
        .unwrap();

        let ignores = Ignores::load(dir.path());

        assert!(ignores.is_ignored(&PathBuf::from("target")));
        assert!(ignores.is_ignored(&PathBuf::from("target/debug/kit")));
        assert!(ignores.is_ignored(&PathBuf::from("notes/secret.txt")));
        assert!(!ignores.is_ignored(&PathBuf::from("notes/public.txt")));
    }
}
