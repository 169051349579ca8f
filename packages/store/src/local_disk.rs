//! The filesystem half shared by the local stores.
//!
//! `LocalRoot` owns the validated root directory and performs the operations that do not depend
//! on the document format: resolving paths, stat, listing and removal.

use std::{fs, io, path as fs_path};

use crate::error::{Error, Op};
use crate::path::Path;
use crate::store::{DirEntry, EntryKind};

/// What a stat of a resolved path found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Existing {
    Directory,
    File,
}

#[derive(Debug, Clone)]
pub struct LocalRoot {
    root: fs_path::PathBuf,
}

impl LocalRoot {
    /// Validates that `root` is an existing, writable directory and canonicalizes it.
    pub fn new(root: fs_path::PathBuf) -> Result<LocalRoot, Error> {
        let attr = fs::metadata(&root).map_err(|source| Error::RootPathInvalid {
            path: root.clone(),
            source,
        })?;

        if !attr.is_dir() {
            return Err(Error::RootPathInvalid {
                path: root,
                source: io::Error::other("Root path must be a directory."),
            });
        }

        if attr.permissions().readonly() {
            return Err(Error::RootPathInvalid {
                path: root,
                source: io::Error::other("Root directory must be writable"),
            });
        }

        match root.canonicalize() {
            Ok(root) => Ok(LocalRoot { root }),
            Err(source) => Err(Error::RootPathInvalid { path: root, source }),
        }
    }

    pub fn root(&self) -> &fs_path::Path {
        &self.root
    }

    pub fn file_path(&self, path: &Path) -> fs_path::PathBuf {
        path.to_file_path(&self.root)
    }

    /// Returns `None` when nothing exists at `file_path`.
    pub async fn stat(&self, file_path: &fs_path::Path) -> Result<Option<Existing>, Error> {
        match tokio::fs::metadata(file_path).await {
            Ok(attr) if attr.is_dir() => Ok(Some(Existing::Directory)),
            Ok(_) => Ok(Some(Existing::File)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(Error::io(Op::Stat, file_path, err)),
        }
    }

    /// Lists the immediate children of a directory in read order.
    pub async fn list(&self, dir_path: &fs_path::Path) -> Result<Vec<DirEntry>, Error> {
        tracing::debug!("Listing {}...", dir_path.display());

        let mut read_dir = tokio::fs::read_dir(dir_path)
            .await
            .map_err(|err| Error::io(Op::ReadDir, dir_path, err))?;

        let mut entries = vec![];
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|err| Error::io(Op::ReadDir, dir_path, err))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|err| Error::io(Op::Stat, entry.path(), err))?;
            entries.push(DirEntry::new(
                entry.file_name().to_string_lossy(),
                EntryKind::of(&file_type),
            ));
        }
        Ok(entries)
    }

    /// Removes a file, or a directory if it is empty.
    pub async fn remove(&self, path: &Path) -> Result<(), Error> {
        let file_path = self.file_path(path);
        if path.is_empty() {
            return Err(Error::io(
                Op::Remove,
                &file_path,
                io::Error::new(io::ErrorKind::PermissionDenied, "refusing to remove the root"),
            ));
        }
        tracing::debug!("Removing {}...", file_path.display());

        let file_err = match tokio::fs::remove_file(&file_path).await {
            Ok(()) => return Ok(()),
            Err(err) => err,
        };

        // Unlinking a directory fails; only then is rmdir worth a try.
        match tokio::fs::symlink_metadata(&file_path).await {
            Ok(attr) if attr.is_dir() => tokio::fs::remove_dir(&file_path)
                .await
                .map_err(|err| Error::io(Op::Remove, &file_path, err)),
            _ => Err(Error::io(Op::Remove, &file_path, file_err)),
        }
    }
}
