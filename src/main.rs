use anyhow::Result;
use clap::{Parser, Subcommand};
use kit::areas::repository::Repository;

#[derive(Parser)]
#[command(
    name = "kit",
    version = "0.1.0",
    about = "A minimal content-addressable version control engine",
    long_about = "kit snapshots a directory tree into immutable, hash-identified \
    objects, stages pending changes in a binary index, commits snapshots with \
    parent linkage, and restores or reports against any snapshot.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "This command initializes a new repository in the current directory or at the specified path."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<String>,
    },
    #[command(
        name = "add",
        about = "Stage files for the next commit",
        long_about = "This command hashes the given files into the object database and records them in the index. \
        Directories are expanded recursively."
    )]
    Add {
        #[arg(required = true, help = "The paths to stage")]
        paths: Vec<String>,
    },
    #[command(
        name = "commit",
        about = "Record the staged files as a new commit",
        long_about = "This command writes the staged files as a tree object, wraps it in a commit pointing at the \
        previous one, and advances the current branch."
    )]
    Commit {
        #[arg(short, long, help = "The commit message")]
        message: String,
    },
    #[command(
        name = "status",
        about = "Report the state of working tree and staging area",
        long_about = "This command classifies every path across the working tree, the index, and the last commit."
    )]
    Status,
    #[command(
        name = "checkout",
        about = "Restore the working tree and index from a commit",
        long_about = "This command resolves the target to a commit, prunes and restores the working directory to \
        match its tree, rebuilds the index, and moves HEAD."
    )]
    Checkout {
        #[arg(index = 1, help = "A branch, tag, or object id to check out")]
        target: String,
    },
    #[command(
        name = "branch",
        about = "Create a branch at HEAD, or list branches",
        long_about = "With a name, this command creates a branch pointing at the current HEAD commit. \
        Without one, it lists the existing branches."
    )]
    Branch {
        #[arg(index = 1, help = "The name of the branch to create")]
        name: Option<String>,
    },
    #[command(
        name = "tag",
        about = "Create a tag at HEAD, or list tags",
        long_about = "With a name, this command creates a lightweight tag pointing at the current HEAD commit. \
        Without one, it lists the existing tags."
    )]
    Tag {
        #[arg(index = 1, help = "The name of the tag to create")]
        name: Option<String>,
    },
    #[command(
        name = "config",
        about = "Read or write a configuration value",
        long_about = "This command reads or writes a single '<section>.<key>' configuration value, \
        such as user.name or core.editor."
    )]
    Config {
        #[arg(index = 1, help = "The key to read or write, as <section>.<key>")]
        key: String,
        #[arg(index = 2, help = "The value to write")]
        value: Option<String>,
    },
    #[command(
        name = "cat-file",
        about = "Display the contents of an object",
        long_about = "This command displays an object from the database: its raw payload (for an expected type), \
        its size, its type, or a prettified rendering."
    )]
    CatFile {
        #[arg(
            index = 1,
            value_parser = ["commit", "tree", "blob", "size", "type", "pretty"],
            help = "Expected object type, or a display mode"
        )]
        mode: String,
        #[arg(index = 2, help = "The object id (or id prefix) to display")]
        object: String,
    },
    #[command(
        name = "hash-object",
        about = "Hash a file and optionally write it to the object database",
        long_about = "This command hashes a file as an object of the given type and prints the id. \
        With --write the compressed object is persisted as well."
    )]
    HashObject {
        #[arg(
            short = 't',
            default_value = "blob",
            value_parser = ["commit", "tree", "blob"],
            help = "The type of object to hash"
        )]
        r#type: String,
        #[arg(short, long, help = "Write the object to the object database")]
        write: bool,
        #[arg(index = 1, help = "The path of the file to hash")]
        file: String,
    },
    #[command(
        name = "ls-files",
        about = "List the staged files",
        long_about = "This command lists the paths recorded in the index, optionally with mode, id and stage number."
    )]
    LsFiles {
        #[arg(short, long, help = "Show mode, object id and stage number")]
        stage: bool,
    },
    #[command(
        name = "ls-tree",
        about = "List the entries of a tree object",
        long_about = "This command lists the entries of a tree object (or of a commit's root tree), \
        optionally recursing into nested trees."
    )]
    LsTree {
        #[arg(short, long, help = "Recurse into nested trees")]
        recursive: bool,
        #[arg(index = 1, help = "A tree or commit to list")]
        object: String,
    },
}

fn open_repository() -> Result<Repository> {
    let pwd = std::env::current_dir()?;
    Repository::new(&pwd.to_string_lossy(), Box::new(std::io::stdout()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Init { path } => {
            let mut repository = match path {
                Some(path) => Repository::new(path, Box::new(std::io::stdout()))?,
                None => open_repository()?,
            };

            repository.init()?
        }
        Commands::Add { paths } => open_repository()?.add(paths)?,
        Commands::Commit { message } => {
            open_repository()?.commit(message.as_str(), None)?;
        }
        Commands::Status => {
            open_repository()?.status()?;
        }
        Commands::Checkout { target } => open_repository()?.checkout(target)?,
        Commands::Branch { name } => open_repository()?.branch(name.as_deref())?,
        Commands::Tag { name } => open_repository()?.tag(name.as_deref())?,
        Commands::Config { key, value } => open_repository()?.config_command(key, value.as_deref())?,
        Commands::CatFile { mode, object } => {
            open_repository()?.cat_file(mode.parse()?, object)?
        }
        Commands::HashObject {
            r#type,
            write,
            file,
        } => open_repository()?.hash_object(file, r#type, *write)?,
        Commands::LsFiles { stage } => open_repository()?.ls_files(*stage)?,
        Commands::LsTree { recursive, object } => {
            open_repository()?.ls_tree(object, *recursive)?
        }
    }

    Ok(())
}
