use crate::areas::repository::Repository;
use crate::artifacts::objects::object::{Object, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use crate::errors::Error;
use std::io::{Cursor, Write};

/// Display mode for `cat-file`: an expected object type (raw payload,
/// failing on mismatch) or one of the inspection modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatFileMode {
    Raw(ObjectType),
    Size,
    Type,
    Pretty,
}

impl std::str::FromStr for CatFileMode {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> anyhow::Result<Self> {
        match value {
            "blob" => Ok(CatFileMode::Raw(ObjectType::Blob)),
            "tree" => Ok(CatFileMode::Raw(ObjectType::Tree)),
            "commit" => Ok(CatFileMode::Raw(ObjectType::Commit)),
            "size" => Ok(CatFileMode::Size),
            "type" => Ok(CatFileMode::Type),
            "pretty" => Ok(CatFileMode::Pretty),
            _ => anyhow::bail!("unexpected cat-file mode '{value}'"),
        }
    }
}

impl Repository {
    pub fn cat_file(&mut self, mode: CatFileMode, prefix: &str) -> anyhow::Result<()> {
        ObjectId::validate_prefix(prefix)?;
        let (object_type, payload) = self.database().read_object(prefix)?;

        match mode {
            CatFileMode::Raw(expected) => {
                if object_type != expected {
                    return Err(Error::WrongType {
                        expected,
                        actual: object_type,
                    }
                    .into());
                }
                self.writer().write_all(&payload)?;
            }
            CatFileMode::Size => writeln!(self.writer(), "{}", payload.len())?,
            CatFileMode::Type => writeln!(self.writer(), "{}", object_type)?,
            CatFileMode::Pretty => match object_type {
                ObjectType::Blob | ObjectType::Commit => self.writer().write_all(&payload)?,
                ObjectType::Tree => {
                    let tree = Tree::deserialize(Cursor::new(payload))?;
                    writeln!(self.writer(), "{}", tree.display())?;
                }
            },
        }

        Ok(())
    }
}
