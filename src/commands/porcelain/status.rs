use crate::areas::repository::Repository;
use crate::artifacts::status::report::{Status, StatusReport};
use std::io::Write;

impl Repository {
    /// Classify every path across working tree, index and last commit,
    /// print the report and return it.
    pub fn status(&mut self) -> anyhow::Result<StatusReport> {
        let mut index = self.index();
        index.rehydrate()?;

        let report = Status::new(self).report(&index)?;

        write!(self.writer(), "{}", report)?;

        Ok(report)
    }
}
