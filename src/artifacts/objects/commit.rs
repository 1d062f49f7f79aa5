//! Commit object
//!
//! Commits record snapshots of the repository at specific points in
//! time. Each one holds the root tree id, an optional parent commit id,
//! author and committer identities, and a message. History is a singly
//! linked chain through `parent`; merge commits are out of scope.
//!
//! ## Format
//!
//! On disk:
//! ```text
//! commit <size>\0
//! tree <tree-sha>
//! parent <parent-sha>
//! author <name> <email> <timestamp> <timezone>
//! committer <name> <email> <timestamp> <timezone>
//!
//! <commit message>
//! ```

use crate::areas::config::Config;
use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::Error;
use bytes::Bytes;
use std::io::{BufRead, Write};

/// Author or committer identity with a timestamp
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Author {
    name: String,
    email: String,
    timestamp: chrono::DateTime<chrono::FixedOffset>,
}

impl Author {
    /// Create a new author with the current timestamp
    pub fn new(name: String, email: String) -> Self {
        Author {
            name,
            email,
            timestamp: chrono::Local::now().fixed_offset(),
        }
    }

    /// Create a new author with a specific timestamp
    pub fn new_with_timestamp(
        name: String,
        email: String,
        timestamp: chrono::DateTime<chrono::FixedOffset>,
    ) -> Self {
        Author {
            name,
            email,
            timestamp,
        }
    }

    /// Format complete author info including timestamp
    ///
    /// # Returns
    ///
    /// String in format "Name <email> timestamp timezone"
    pub fn display(&self) -> String {
        format!(
            "{} <{}> {} {}",
            self.name,
            self.email,
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        )
    }

    /// Resolve the author identity for a new commit.
    ///
    /// `KIT_AUTHOR_NAME` / `KIT_AUTHOR_EMAIL` take precedence, then the
    /// `user.name` / `user.email` configuration keys. `KIT_AUTHOR_DATE`
    /// (RFC 2822 or "%Y-%m-%d %H:%M:%S %z") pins the timestamp.
    pub fn load(config: &Config) -> anyhow::Result<Self> {
        let name = std::env::var("KIT_AUTHOR_NAME")
            .ok()
            .or_else(|| config.get("user", "name").map(String::from))
            .ok_or_else(|| anyhow::anyhow!("author name not configured (set user.name)"))?;
        let email = std::env::var("KIT_AUTHOR_EMAIL")
            .ok()
            .or_else(|| config.get("user", "email").map(String::from))
            .ok_or_else(|| anyhow::anyhow!("author email not configured (set user.email)"))?;

        let timestamp = std::env::var("KIT_AUTHOR_DATE").ok().and_then(|date_str| {
            chrono::DateTime::parse_from_rfc2822(&date_str)
                .or_else(|_| chrono::DateTime::parse_from_str(&date_str, "%Y-%m-%d %H:%M:%S %z"))
                .ok()
        });

        match timestamp {
            Some(ts) => Ok(Author::new_with_timestamp(name, email, ts)),
            None => Ok(Author::new(name, email)),
        }
    }

    pub fn timestamp(&self) -> chrono::DateTime<chrono::FixedOffset> {
        self.timestamp
    }
}

impl TryFrom<&str> for Author {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        // Format: "name <email> timestamp timezone"
        // Split from the right to get timezone and timestamp first
        let parts: Vec<&str> = value.rsplitn(3, ' ').collect();
        if parts.len() < 3 {
            return Err(Error::MalformedCommit("invalid author format".into()).into());
        }

        let timezone = parts[0];
        let timestamp = parts[1]
            .parse::<i64>()
            .map_err(|_| Error::MalformedCommit("invalid author timestamp".into()))?;
        let name_email_part = parts[2]; // "name <email>"

        let email_start = name_email_part
            .find('<')
            .ok_or_else(|| Error::MalformedCommit("author line missing '<'".into()))?;
        let email_end = name_email_part
            .find('>')
            .ok_or_else(|| Error::MalformedCommit("author line missing '>'".into()))?;

        let name = name_email_part[..email_start].trim().to_string();
        let email = name_email_part[email_start + 1..email_end].to_string();

        let datetime = chrono::DateTime::from_timestamp(timestamp, 0)
            .ok_or_else(|| Error::MalformedCommit("author timestamp out of range".into()))?;
        let datetime = chrono::DateTime::parse_from_str(
            &format!("{} {}", datetime.format("%Y-%m-%d %H:%M:%S"), timezone),
            "%Y-%m-%d %H:%M:%S %z",
        )
        .map_err(|_| Error::MalformedCommit("invalid author timezone".into()))?;

        Ok(Author {
            name,
            email,
            timestamp: datetime,
        })
    }
}

/// Commit object
///
/// Represents a snapshot of the staged files with metadata. Contains
/// references to the root tree and to the previous commit, if any.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    /// Parent commit id (None for the root commit)
    parent: Option<ObjectId>,
    /// Tree object id representing the snapshot
    tree_oid: ObjectId,
    /// Author who wrote the changes
    author: Author,
    /// Committer who recorded the commit
    committer: Author,
    /// Commit message
    message: String,
}

impl Commit {
    pub fn new(
        parent: Option<ObjectId>,
        tree_oid: ObjectId,
        author: Author,
        message: String,
    ) -> Self {
        Commit {
            parent,
            tree_oid,
            author: author.clone(),
            committer: author,
            message,
        }
    }

    /// Get the first line of the commit message
    pub fn short_message(&self) -> String {
        self.message.lines().next().unwrap_or("").to_string()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn tree_oid(&self) -> &ObjectId {
        &self.tree_oid
    }

    pub fn parent(&self) -> Option<&ObjectId> {
        self.parent.as_ref()
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    pub fn timestamp(&self) -> chrono::DateTime<chrono::FixedOffset> {
        self.author.timestamp()
    }
}

impl Packable for Commit {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut object_content = vec![];

        object_content.push(format!("tree {}", self.tree_oid.as_ref()));
        if let Some(parent) = &self.parent {
            object_content.push(format!("parent {}", parent.as_ref()));
        }
        object_content.push(format!("author {}", self.author.display()));
        object_content.push(format!("committer {}", self.committer.display()));
        object_content.push(String::new());
        object_content.push(self.message.to_string());

        let content_bytes = object_content.join("\n").into_bytes();

        let mut commit_bytes = Vec::new();
        let header = format!("{} {}\0", self.object_type().as_str(), content_bytes.len());
        commit_bytes.write_all(header.as_bytes())?;
        commit_bytes.write_all(&content_bytes)?;

        Ok(Bytes::from(commit_bytes))
    }
}

impl Unpackable for Commit {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let content = reader
            .bytes()
            .collect::<Result<Vec<u8>, std::io::Error>>()?;

        let content = String::from_utf8(content)
            .map_err(|_| Error::MalformedCommit("non-utf8 payload".into()))?;
        let mut lines = content.lines();

        let tree_line = lines
            .next()
            .ok_or_else(|| Error::MalformedCommit("missing tree line".into()))?;
        let tree_oid = tree_line
            .strip_prefix("tree ")
            .ok_or_else(|| Error::MalformedCommit("invalid tree line".into()))?
            .to_string();
        let tree_oid = ObjectId::try_parse(tree_oid)?;

        let mut parent = None;
        let mut next_line = lines
            .next()
            .ok_or_else(|| Error::MalformedCommit("missing author line".into()))?;

        if let Some(parent_oid) = next_line.strip_prefix("parent ") {
            parent = Some(ObjectId::try_parse(parent_oid.to_string())?);

            next_line = lines
                .next()
                .ok_or_else(|| Error::MalformedCommit("missing author line".into()))?;

            // history is a single chain here, a second parent is not valid
            if next_line.starts_with("parent ") {
                return Err(Error::MalformedCommit("more than one parent".into()).into());
            }
        }

        let author = next_line
            .strip_prefix("author ")
            .ok_or_else(|| Error::MalformedCommit("invalid author line".into()))?;
        let author = Author::try_from(author)?;

        let committer_line = lines
            .next()
            .ok_or_else(|| Error::MalformedCommit("missing committer line".into()))?;
        let committer = committer_line
            .strip_prefix("committer ")
            .ok_or_else(|| Error::MalformedCommit("invalid committer line".into()))?;
        let _committer = Author::try_from(committer)?;

        // skip the empty line
        lines.next();

        let message = lines.collect::<Vec<&str>>().join("\n");
        Ok(Self::new(parent, tree_oid, author, message))
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }

    fn display(&self) -> String {
        let mut lines = vec![];

        lines.push(format!("tree {}", self.tree_oid.as_ref()));
        if let Some(parent) = &self.parent {
            lines.push(format!("parent {}", parent.as_ref()));
        }
        lines.push(format!("author {}", self.author.display()));
        lines.push(format!("committer {}", self.committer.display()));
        lines.push(String::new());
        lines.push(self.message.to_string());

        lines.join("\n")
    }
}
