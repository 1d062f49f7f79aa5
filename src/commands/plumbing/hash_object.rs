use crate::areas::repository::Repository;
use crate::artifacts::objects::object_type::ObjectType;
use std::io::Write;

impl Repository {
    /// Hash a file's content as an object of the given type, optionally
    /// writing it to the object database, and print the id.
    pub fn hash_object(
        &mut self,
        file: &str,
        object_type: &str,
        write: bool,
    ) -> anyhow::Result<()> {
        let object_type = ObjectType::try_from(object_type)?;
        let data = self.workspace().read_file(file.as_ref())?;

        let object_id = self.database().hash_object(&data, object_type, write)?;

        writeln!(self.writer(), "{}", object_id)?;

        Ok(())
    }
}
