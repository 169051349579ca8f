use std::path;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use schemacafe_store::{
    BodyReader, Document, Error, Existing, LocalRoot, Node, Op, Path, PathStore, StoreKind,
};

/// Mode for directories created on demand by writes.
#[cfg(unix)]
const DIR_MODE: u32 = 0o777;

/// Opaque byte documents stored one file per path below a root directory.
///
/// Writes create any missing parent directories.  Reads hand back an open file handle so the
/// caller can stream the content without buffering it.
pub struct RawLocalStore {
    root: LocalRoot,
}

impl RawLocalStore {
    pub fn new(root: path::PathBuf) -> Result<RawLocalStore, Error> {
        Ok(RawLocalStore {
            root: LocalRoot::new(root)?,
        })
    }

    pub fn root(&self) -> &path::Path {
        self.root.root()
    }

    async fn create_parents(&self, file_path: &path::Path) -> Result<(), Error> {
        let Some(parent) = file_path.parent() else {
            return Ok(());
        };

        let mut builder = tokio::fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        builder.mode(DIR_MODE);

        builder
            .create(parent)
            .await
            .map_err(|err| Error::io(Op::Mkdir, parent, err))
    }
}

#[async_trait]
impl PathStore for RawLocalStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Raw
    }

    async fn put(&self, path: &Path, mut body: BodyReader) -> Result<(), Error> {
        let file_path = self.root.file_path(path);
        self.create_parents(&file_path).await?;

        tracing::debug!("Writing {}...", file_path.display());
        let mut file = tokio::fs::File::create(&file_path)
            .await
            .map_err(|err| Error::io(Op::Create, &file_path, err))?;
        let written = tokio::io::copy(&mut body, &mut file)
            .await
            .map_err(|err| Error::io(Op::Write, &file_path, err))?;
        tracing::trace!("Copied {} bytes to {}", written, file_path.display());
        file.flush()
            .await
            .map_err(|err| Error::io(Op::Write, &file_path, err))
    }

    async fn delete(&self, path: &Path) -> Result<(), Error> {
        self.root.remove(path).await
    }

    async fn get(&self, path: &Path) -> Result<Option<Node>, Error> {
        let file_path = self.root.file_path(path);
        match self.root.stat(&file_path).await? {
            None => Ok(None),
            Some(Existing::Directory) => {
                Ok(Some(Node::Directory(self.root.list(&file_path).await?)))
            }
            Some(Existing::File) => {
                tracing::debug!("Opening {}...", file_path.display());
                let file = tokio::fs::File::open(&file_path)
                    .await
                    .map_err(|err| Error::io(Op::Open, &file_path, err))?;
                Ok(Some(Node::Document(Document::Raw(file))))
            }
        }
    }
}
