//! The raw variant of schemacafe: documents are opaque bytes, written and streamed back verbatim.

pub mod local_disk;

pub use local_disk::RawLocalStore;
