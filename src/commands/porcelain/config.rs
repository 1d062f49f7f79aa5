use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    /// Read or write a single `section.key` configuration value
    pub fn config_command(&mut self, key: &str, value: Option<&str>) -> anyhow::Result<()> {
        match value {
            Some(value) => {
                let mut config = self.config_mut();
                config.set_by_name(key, value)?;
                config.save()
            }
            None => match self.config().get_by_name(key) {
                Some(value) => {
                    writeln!(self.writer(), "{}", value)?;
                    Ok(())
                }
                None => anyhow::bail!("config key '{}' is not set", key),
            },
        }
    }
}
