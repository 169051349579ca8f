use std::io;
use std::path::PathBuf;

use crate::path::Error as PathError;

/// Filesystem operation that failed, used to prefix `Error::Io` messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Stat,
    Open,
    Read,
    Create,
    Write,
    Mkdir,
    ReadDir,
    Remove,
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Op::Stat => "stat",
            Op::Open => "open",
            Op::Read => "read",
            Op::Create => "create",
            Op::Write => "write",
            Op::Mkdir => "mkdir",
            Op::ReadDir => "readdir",
            Op::Remove => "remove",
        };
        f.write_str(name)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Path(#[from] PathError),

    #[error("{op} {}: {source}", path.display())]
    Io {
        op: Op,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("body for {} exceeds {limit} bytes", path.display())]
    BodyTooLarge { path: PathBuf, limit: u64 },

    #[error("An error occurred trying to read the root path {}: {source}", path.display())]
    RootPathInvalid {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub fn io(op: Op, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            op,
            path: path.into(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}
