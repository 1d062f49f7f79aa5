//! User configuration
//!
//! A plain-text file of `[section]` blocks with `key = value` lines,
//! stored at `.kit/config`. The engine itself only consumes the author
//! identity (`user.name`, `user.email`) when building commits; every
//! other key is read and written on behalf of the user untouched.

use anyhow::Context;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the config file (typically `.kit/config`)
    path: Box<Path>,
    /// Section name to key/value mapping
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl Config {
    /// Load the configuration, treating a missing file as empty
    pub fn open(path: Box<Path>) -> anyhow::Result<Self> {
        let mut sections: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();

        if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config file at {:?}", path))?;

            let mut current_section = String::new();
            for line in content.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                    continue;
                }

                if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                    current_section = section.trim().to_string();
                } else if let Some((key, value)) = line.split_once('=') {
                    sections
                        .entry(current_section.clone())
                        .or_default()
                        .insert(key.trim().to_string(), value.trim().to_string());
                }
            }
        }

        Ok(Config { path, sections })
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|keys| keys.get(key))
            .map(String::as_str)
    }

    /// Look up a dotted `section.key` name
    pub fn get_by_name(&self, name: &str) -> Option<&str> {
        let (section, key) = name.split_once('.')?;
        self.get(section, key)
    }

    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
    }

    /// Set a dotted `section.key` name
    pub fn set_by_name(&mut self, name: &str, value: &str) -> anyhow::Result<()> {
        let (section, key) = name
            .split_once('.')
            .ok_or_else(|| anyhow::anyhow!("config keys are named '<section>.<key>': {name}"))?;
        self.set(section, key, value);
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let mut content = Vec::new();
        for (section, keys) in &self.sections {
            writeln!(content, "[{section}]")?;
            for (key, value) in keys {
                writeln!(content, "\t{key} = {value}")?;
            }
        }

        std::fs::write(&self.path, content)
            .with_context(|| format!("failed to write config file at {:?}", self.path))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_round_trip_through_the_file() {
        let dir = assert_fs::TempDir::new().unwrap();
        let path = dir.path().join("config").into_boxed_path();

        let mut config = Config::open(path.clone()).unwrap();
        config.set("user", "name", "Jane Doe");
        config.set("user", "email", "jane@example.com");
        config.set("core", "editor", "vim");
        config.save().unwrap();

        let reloaded = Config::open(path).unwrap();
        pretty_assertions::assert_eq!(reloaded.get("user", "name"), Some("Jane Doe"));
        pretty_assertions::assert_eq!(reloaded.get_by_name("user.email"), Some("jane@example.com"));
        pretty_assertions::assert_eq!(reloaded.get_by_name("core.editor"), Some("vim"));
    }

    #[test]
    fn a_missing_file_is_an_empty_config() {
        let dir = assert_fs::TempDir::new().unwrap();
        let config = Config::open(dir.path().join("config").into_boxed_path()).unwrap();

        assert_eq!(config.get("user", "name"), None);
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let dir = assert_fs::TempDir::new().unwrap();
        let path = dir.path().join("config");
        std::fs::write(&path, "# a comment\n\n[user]\n; another\n\tname = Jo\n").unwrap();

        let config = Config::open(path.into_boxed_path()).unwrap();
        assert_eq!(config.get("user", "name"), Some("Jo"));
    }
}
