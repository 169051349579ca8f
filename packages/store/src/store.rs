use std::pin::Pin;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncRead;

use crate::error::Error;
use crate::path::Path;
use crate::schema::Schema;

/// How a directory child is classified in listings.
///
/// Classification is structural only: anything that is not a directory is a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Dir,
    Schema,
}

impl EntryKind {
    pub fn of(file_type: &std::fs::FileType) -> Self {
        if file_type.is_dir() {
            EntryKind::Dir
        } else {
            EntryKind::Schema
        }
    }
}

/// One child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

impl DirEntry {
    pub fn new(name: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// A document read from a store.
#[derive(Debug)]
pub enum Document {
    /// A decoded schema (JSON variant).
    Schema(Schema),
    /// An open handle to be streamed verbatim (raw variant).
    ///
    /// The handle is owned by the caller and closed when dropped.
    Raw(tokio::fs::File),
}

/// Whatever lives at a path.
#[derive(Debug)]
pub enum Node {
    /// Immediate children, in directory-read order.
    Directory(Vec<DirEntry>),
    Document(Document),
}

/// A request body handed to `PathStore::put`, read as it arrives.
pub type BodyReader = Pin<Box<dyn AsyncRead + Send>>;

/// Which flavour of store is behind a `PathStore`.
///
/// The HTTP layer uses this to decide the behaviours that differ between variants: whether
/// directory listings are content-negotiated and whether unknown methods are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Schema,
    Raw,
}

/// A directory tree exposed through put/delete/get on paths.
///
/// Every call touches the filesystem directly; implementations hold no cache and no locks, so
/// concurrent calls on the same path are unordered relative to each other.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Arc<dyn PathStore>`.
#[async_trait]
pub trait PathStore: Send + Sync {
    fn kind(&self) -> StoreKind;

    /// Creates or overwrites the document at `path` from `body`.
    ///
    /// The body is consumed as it is read; there is no time bound on the copy.
    async fn put(&self, path: &Path, body: BodyReader) -> Result<(), Error>;

    /// Removes the document (or empty directory) at `path`.
    ///
    /// Removing a path that does not exist is an error.
    async fn delete(&self, path: &Path) -> Result<(), Error>;

    /// Reads whatever lives at `path`.
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - Nothing exists at the path.
    /// * `Ok(Some(node))` - A directory listing or a document.
    /// * `Err(Error)` - Any other filesystem failure.
    async fn get(&self, path: &Path) -> Result<Option<Node>, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use tokio::io::AsyncReadExt;

    fn body(bytes: &'static [u8]) -> BodyReader {
        Box::pin(bytes)
    }

    #[test]
    fn dir_entry_wire_format() {
        assert_eq!(
            serde_json::to_value(DirEntry::new("a.json", EntryKind::Schema)).unwrap(),
            json!({"name": "a.json", "type": "schema"})
        );
        assert_eq!(
            serde_json::to_value(DirEntry::new("b", EntryKind::Dir)).unwrap(),
            json!({"name": "b", "type": "dir"})
        );
    }

    #[test]
    fn entry_kind_is_structural() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("file"), b"not json at all").unwrap();

        let sub = std::fs::metadata(dir.path().join("sub")).unwrap();
        let file = std::fs::metadata(dir.path().join("file")).unwrap();
        assert_eq!(EntryKind::of(&sub.file_type()), EntryKind::Dir);
        assert_eq!(EntryKind::of(&file.file_type()), EntryKind::Schema);
    }

    /// A simple in-memory store for exercising the trait object.
    struct TestStore {
        docs: Mutex<HashMap<Path, Schema>>,
    }

    #[async_trait]
    impl PathStore for TestStore {
        fn kind(&self) -> StoreKind {
            StoreKind::Schema
        }

        async fn put(&self, path: &Path, mut body: BodyReader) -> Result<(), Error> {
            let mut bytes = vec![];
            body.read_to_end(&mut bytes)
                .await
                .map_err(|err| Error::io(crate::error::Op::Read, path.to_string(), err))?;
            let schema = Schema::decode_lenient(&bytes);
            self.docs.lock().unwrap().insert(path.clone(), schema);
            Ok(())
        }

        async fn delete(&self, path: &Path) -> Result<(), Error> {
            match self.docs.lock().unwrap().remove(path) {
                Some(_) => Ok(()),
                None => Err(Error::io(
                    crate::error::Op::Remove,
                    path.to_string(),
                    std::io::ErrorKind::NotFound.into(),
                )),
            }
        }

        async fn get(&self, path: &Path) -> Result<Option<Node>, Error> {
            Ok(self
                .docs
                .lock()
                .unwrap()
                .get(path)
                .cloned()
                .map(|s| Node::Document(Document::Schema(s))))
        }
    }

    #[tokio::test]
    async fn arc_dyn_store_works() {
        let store: Arc<dyn PathStore> = Arc::new(TestStore {
            docs: Mutex::new(HashMap::new()),
        });
        let path = Path::from_request("/users").unwrap();

        store
            .put(&path, body(br#"{"fields":[{"name":"id","type":"int"}]}"#))
            .await
            .unwrap();

        match store.get(&path).await.unwrap() {
            Some(Node::Document(Document::Schema(schema))) => {
                assert_eq!(schema.fields[0].name, "id");
            }
            other => panic!("unexpected node: {:?}", other),
        }

        store.delete(&path).await.unwrap();
        assert!(store.get(&path).await.unwrap().is_none());
        assert!(store.delete(&path).await.unwrap_err().is_not_found());
        assert_eq!(store.kind(), StoreKind::Schema);
    }
}
