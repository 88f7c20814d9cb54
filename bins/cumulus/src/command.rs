//! Command-line parsing.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use cumulus_shared::types::{FileId, UserId};

/// Usage text printed on parse errors.
pub const USAGE: &str = "\
usage: cumulus <owner-id> <command> [args]

commands:
  ls [folder-id] [sort]        list a folder (root by default)
  find <keyword> [sort]        search names
  mkdir <name> [parent-id]     create a folder
  put <local-path> [parent-id] upload a file
  get <file-id> <local-path>   download a file
  mv <target-id|root> <id>...  move nodes into a folder
  rename <id> <new-name>       rename a node
  rm <id>                      delete a node and its subtree
  path <id>                    print the path of a node
  url <id>                     print a signed download URL";

/// A parsed drive command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List {
        folder: Option<FileId>,
        sort: String,
    },
    Find {
        keyword: String,
        sort: String,
    },
    Mkdir {
        name: String,
        parent: Option<FileId>,
    },
    Put {
        path: PathBuf,
        parent: Option<FileId>,
    },
    Get {
        id: FileId,
        path: PathBuf,
    },
    Move {
        target: Option<FileId>,
        ids: Vec<FileId>,
    },
    Rename {
        id: FileId,
        name: String,
    },
    Remove {
        id: FileId,
    },
    Path {
        id: FileId,
    },
    Url {
        id: FileId,
    },
}

/// Acting user plus command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub owner: UserId,
    pub command: Command,
}

impl Invocation {
    /// Parse arguments, excluding the program name.
    pub fn parse<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let owner = args.next().context("missing owner id")?;
        let owner: UserId = owner
            .parse()
            .with_context(|| format!("invalid owner id '{owner}'"))?;
        let name = args.next().context("missing command")?;
        let rest: Vec<String> = args.collect();

        let command = match (name.as_str(), rest.as_slice()) {
            ("ls", [rest @ ..]) if rest.len() <= 2 => Command::List {
                folder: rest.first().map(|id| file_id(id)).transpose()?,
                sort: rest.get(1).cloned().unwrap_or_default(),
            },
            ("find", [keyword, rest @ ..]) if rest.len() <= 1 => Command::Find {
                keyword: keyword.clone(),
                sort: rest.first().cloned().unwrap_or_default(),
            },
            ("mkdir", [name]) => Command::Mkdir {
                name: name.clone(),
                parent: None,
            },
            ("mkdir", [name, parent]) => Command::Mkdir {
                name: name.clone(),
                parent: Some(file_id(parent)?),
            },
            ("put", [path]) => Command::Put {
                path: PathBuf::from(path),
                parent: None,
            },
            ("put", [path, parent]) => Command::Put {
                path: PathBuf::from(path),
                parent: Some(file_id(parent)?),
            },
            ("get", [id, path]) => Command::Get {
                id: file_id(id)?,
                path: PathBuf::from(path),
            },
            ("mv", [target, ids @ ..]) if !ids.is_empty() => Command::Move {
                target: match target.as_str() {
                    "root" | "/" => None,
                    id => Some(file_id(id)?),
                },
                ids: ids.iter().map(|id| file_id(id)).collect::<Result<_>>()?,
            },
            ("rename", [id, name]) => Command::Rename {
                id: file_id(id)?,
                name: name.clone(),
            },
            ("rm", [id]) => Command::Remove { id: file_id(id)? },
            ("path", [id]) => Command::Path { id: file_id(id)? },
            ("url", [id]) => Command::Url { id: file_id(id)? },
            (other, _) => bail!("unknown command or wrong arguments: {other}"),
        };

        Ok(Self { owner, command })
    }
}

fn file_id(raw: &str) -> Result<FileId> {
    raw.parse()
        .with_context(|| format!("invalid file id '{raw}'"))
}
