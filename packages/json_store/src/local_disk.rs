use std::path;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;

use schemacafe_store::{
    BodyReader, Document, Error, Existing, LocalRoot, Node, Op, Path, PathStore, Schema,
    StoreKind,
};

/// Largest schema body accepted by default.
pub const DEFAULT_MAX_BODY_BYTES: u64 = 1024 * 1024;

/// Schema documents stored one JSON file per path below a root directory.
///
/// Parent directories are never created: writing below a directory that does not exist fails.
/// Request bodies are decoded whole, so they are capped at `max_body_bytes`.
pub struct SchemaLocalStore {
    root: LocalRoot,
    strict_decode: bool,
    max_body_bytes: u64,
}

impl SchemaLocalStore {
    pub fn new(root: path::PathBuf) -> Result<SchemaLocalStore, Error> {
        Ok(SchemaLocalStore {
            root: LocalRoot::new(root)?,
            strict_decode: false,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        })
    }

    /// When enabled, malformed request bodies and stored documents surface as
    /// `Error::Decode` instead of being read as the empty schema.
    #[must_use]
    pub fn with_strict_decode(mut self, strict_decode: bool) -> Self {
        self.strict_decode = strict_decode;
        self
    }

    #[must_use]
    pub fn with_max_body_bytes(mut self, max_body_bytes: u64) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    pub fn root(&self) -> &path::Path {
        self.root.root()
    }

    fn decode(&self, file_path: &path::Path, bytes: &[u8]) -> Result<Schema, Error> {
        if self.strict_decode {
            Schema::decode_strict(bytes).map_err(|source| Error::Decode {
                path: file_path.to_path_buf(),
                source,
            })
        } else {
            Ok(Schema::decode_lenient(bytes))
        }
    }

    async fn read_body(&self, file_path: &path::Path, body: BodyReader) -> Result<Vec<u8>, Error> {
        let mut bytes = vec![];
        body.take(self.max_body_bytes.saturating_add(1))
            .read_to_end(&mut bytes)
            .await
            .map_err(|err| Error::io(Op::Read, file_path, err))?;

        if bytes.len() as u64 > self.max_body_bytes {
            return Err(Error::BodyTooLarge {
                path: file_path.to_path_buf(),
                limit: self.max_body_bytes,
            });
        }
        Ok(bytes)
    }

    async fn write_schema(&self, file_path: &path::Path, schema: &Schema) -> Result<(), Error> {
        tracing::debug!("Writing {}...", file_path.display());

        let encoded =
            serde_json::to_vec(schema).map_err(|err| Error::io(Op::Write, file_path, err.into()))?;
        tokio::fs::write(file_path, encoded)
            .await
            .map_err(|err| Error::io(Op::Write, file_path, err))
    }

    async fn read_schema(&self, file_path: &path::Path) -> Result<Schema, Error> {
        tracing::debug!("Reading {}...", file_path.display());

        let bytes = tokio::fs::read(file_path)
            .await
            .map_err(|err| Error::io(Op::Open, file_path, err))?;
        self.decode(file_path, &bytes)
    }
}

#[async_trait]
impl PathStore for SchemaLocalStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Schema
    }

    async fn put(&self, path: &Path, body: BodyReader) -> Result<(), Error> {
        let file_path = self.root.file_path(path);
        let body = self.read_body(&file_path, body).await?;
        let schema = self.decode(&file_path, &body)?;
        self.write_schema(&file_path, &schema).await
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
                let schema = self.read_schema(&file_path).await?;
                Ok(Some(Node::Document(Document::Schema(schema))))
            }
        }
    }
}
