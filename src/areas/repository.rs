//! Repository handle
//!
//! An explicit context object holding the resolved repository root and
//! every area, threaded into each operation. There is no process-wide
//! repository state; two handles on different directories never
//! interfere.

use crate::areas::METADATA_DIR;
use crate::areas::config::Config;
use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::Refs;
use crate::areas::workspace::Workspace;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::TreeEntry;
use std::cell::{Ref, RefCell, RefMut};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub struct Repository {
    path: Box<Path>,
    writer: RefCell<Box<dyn std::io::Write>>,
    index: RefCell<Index>,
    database: Database,
    workspace: Workspace,
    refs: Refs,
    config: RefCell<Config>,
}

impl Repository {
    pub fn new(path: &str, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let path = Path::new(path);
        if !path.exists() {
            std::fs::create_dir_all(path)?;
        }
        let path = path.canonicalize()?;
        let metadata_path = path.join(METADATA_DIR);

        let index = Index::new(metadata_path.join("index").into_boxed_path());
        let database = Database::new(metadata_path.join("objects").into_boxed_path());
        let workspace = Workspace::new(path.clone().into_boxed_path());
        let refs = Refs::new(metadata_path.clone().into_boxed_path());
        let config = Config::open(metadata_path.join("config").into_boxed_path())?;

        Ok(Repository {
            path: path.into_boxed_path(),
            writer: RefCell::new(writer),
            index: RefCell::new(index),
            database,
            workspace,
            refs,
            config: RefCell::new(config),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn index(&'_ self) -> RefMut<'_, Index> {
        self.index.borrow_mut()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    pub fn config(&'_ self) -> Ref<'_, Config> {
        self.config.borrow()
    }

    pub fn config_mut(&'_ self) -> RefMut<'_, Config> {
        self.config.borrow_mut()
    }

    /// Resolve a reference name or literal object id to a full id.
    ///
    /// Reference files win; a name matching none of them must be a hex
    /// id or id prefix (3 to 40 chars), resolved through the database.
    pub fn resolve_ref(&self, name: &str) -> anyhow::Result<ObjectId> {
        if let Some(oid) = self.refs().resolve(name)? {
            return Ok(oid);
        }

        ObjectId::validate_prefix(name)?;
        self.database().find_object(name)
    }

    /// Flattened tree of the commit HEAD points at, keyed by path.
    /// Empty when there is no commit yet.
    pub fn head_tree(&self) -> anyhow::Result<BTreeMap<PathBuf, TreeEntry>> {
        let mut head_tree = BTreeMap::new();

        if let Some(head_oid) = self.refs().read_head()? {
            let commit = self.database().load_commit(&head_oid)?;
            for entry in self.database().read_tree(commit.tree_oid(), true)? {
                head_tree.insert(entry.path.clone(), entry);
            }
        }

        Ok(head_tree)
    }
}
