//! The JSON variant of schemacafe: every path below the root is either a directory or a JSON
//! schema document.

pub mod local_disk;

pub use local_disk::{SchemaLocalStore, DEFAULT_MAX_BODY_BYTES};
pub use schemacafe_store::{Field, Path, Schema};
