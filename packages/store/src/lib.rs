//! # schemacafe-store
//!
//! Core types shared by the schemacafe stores: request paths resolved against a root directory,
//! the schema document format, directory listings, and the `PathStore` trait that the JSON and
//! raw stores implement.

pub mod error;
pub mod local_disk;
pub mod path;
pub mod schema;
pub mod store;

pub use error::{Error, Op};
pub use local_disk::{Existing, LocalRoot};
pub use path::{Error as PathError, Path};
pub use schema::{Field, Schema};
pub use store::{BodyReader, DirEntry, Document, EntryKind, Node, PathStore, StoreKind};
