// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! File commands against the storage node's local root directory.
//!
//! Every `PathKey` resolves to a host path below `root`. A node-wide
//! read/write lock keeps concurrent requests from interleaving on the disk:
//! `size` and `read` share it, `write`, `create`, `delete` and pruning
//! take it exclusively.

use crate::prune::{PruneReport, prune_tree};
use async_trait::async_trait;
use common::{Command, Error, PathKey, Result, Storage};
use diagnostics::log_debug;
use std::collections::BTreeSet;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::RwLock;

pub struct LocalStore {
    root: PathBuf,
    lock: RwLock<()>,
}

impl LocalStore {
    #[must_use]
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            lock: RwLock::new(()),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every regular file currently under the root
    pub async fn inventory(&self) -> Result<BTreeSet<PathKey>> {
        let _guard = self.lock.read().await;
        PathKey::list_local(&self.root).await
    }

    /// Delete `duplicates` and any directories they leave empty
    pub async fn prune(&self, duplicates: &BTreeSet<PathKey>) -> PruneReport {
        let _guard = self.lock.write().await;
        prune_tree(&self.root, duplicates).await
    }

    /// Length of the regular file at `local`
    async fn file_len(local: &Path, path: &PathKey) -> Result<u64> {
        match tokio::fs::metadata(local).await {
            Ok(meta) if meta.is_dir() => Err(Error::not_found(format!("{path} is a directory"))),
            Ok(meta) => Ok(meta.len()),
            Err(e) => Err(Error::io(path, &e)),
        }
    }
}

#[async_trait]
impl Storage for LocalStore {
    async fn size(&self, file: &PathKey) -> Result<u64> {
        let local = file.to_local(&self.root)?;
        let _guard = self.lock.read().await;
        Self::file_len(&local, file).await
    }

    async fn read(&self, file: &PathKey, offset: i64, length: i64) -> Result<Vec<u8>> {
        if offset < 0 || length < 0 {
            return Err(Error::invalid_argument(format!(
                "negative offset ({offset}) or length ({length})"
            )));
        }
        let (offset, length) = (offset as u64, length as u64);
        let local = file.to_local(&self.root)?;
        let _guard = self.lock.read().await;

        let size = Self::file_len(&local, file).await?;
        if offset.checked_add(length).is_none_or(|end| end > size) {
            return Err(Error::out_of_bounds(format!(
                "{file}: {length} bytes at {offset} exceed size {size}"
            )));
        }

        let mut handle = tokio::fs::File::open(&local)
            .await
            .map_err(|e| Error::io(file, &e))?;
        _ = handle
            .seek(SeekFrom::Start(offset))
            .await
            .map_err(|e| Error::io(file, &e))?;
        let mut data = vec![0; length as usize];
        _ = handle
            .read_exact(&mut data)
            .await
            .map_err(|e| Error::io(file, &e))?;
        Ok(data)
    }

    async fn write(&self, file: &PathKey, offset: i64, data: &[u8]) -> Result<()> {
        if offset < 0 {
            return Err(Error::invalid_argument(format!("negative offset ({offset})")));
        }
        let local = file.to_local(&self.root)?;
        let _guard = self.lock.write().await;

        // Writes go to existing files only; `create` makes new ones
        _ = Self::file_len(&local, file).await?;
        let mut handle = tokio::fs::OpenOptions::new()
            .write(true)
            .open(&local)
            .await
            .map_err(|e| Error::io(file, &e))?;
        if data.is_empty() {
            return Ok(());
        }
        // Seeking past the end and writing leaves a zero-filled gap
        _ = handle
            .seek(SeekFrom::Start(offset as u64))
            .await
            .map_err(|e| Error::io(file, &e))?;
        handle
            .write_all(data)
            .await
            .map_err(|e| Error::io(file, &e))?;
        handle.flush().await.map_err(|e| Error::io(file, &e))?;
        Ok(())
    }
}

#[async_trait]
impl Command for LocalStore {
    async fn create(&self, file: &PathKey) -> Result<bool> {
        if file.is_root() {
            return Ok(false);
        }
        let Ok(local) = file.to_local(&self.root) else {
            return Ok(false);
        };
        let _guard = self.lock.write().await;

        if !matches!(tokio::fs::try_exists(&local).await, Ok(false)) {
            return Ok(false);
        }
        if let Some(parent) = local.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                let (path, err) = (file.to_string(), e.to_string());
                log_debug!("Cannot create parents of {path}: {error}", path: path, error: err);
                return Ok(false);
            }
        }
        let created = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&local)
            .await;
        Ok(match created {
            Ok(_) => true,
            Err(e) => {
                let (path, err) = (file.to_string(), e.to_string());
                log_debug!("Cannot create {path}: {error}", path: path, error: err);
                false
            }
        })
    }

    async fn delete(&self, path: &PathKey) -> Result<bool> {
        if path.is_root() {
            return Ok(false);
        }
        let Ok(local) = path.to_local(&self.root) else {
            return Ok(false);
        };
        let _guard = self.lock.write().await;

        let Ok(meta) = tokio::fs::symlink_metadata(&local).await else {
            return Ok(false);
        };
        let removed = if meta.is_dir() {
            tokio::fs::remove_dir_all(&local).await
        } else {
            tokio::fs::remove_file(&local).await
        };
        Ok(match removed {
            Ok(()) => true,
            Err(e) => {
                let (path, err) = (path.to_string(), e.to_string());
                log_debug!("Cannot delete {path}: {error}", path: path, error: err);
                false
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn p(s: &str) -> PathKey {
        PathKey::parse(s).unwrap()
    }

    fn store() -> (TempDir, LocalStore) {
        let dir = TempDir::new().expect("create temp dir");
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/hello.txt"), b"Hello, World!").unwrap();
        let store = LocalStore::new(dir.path());
        (dir, store)
    }

    #[tokio::test]
    async fn test_size() {
        let (_dir, store) = store();
        assert_eq!(store.size(&p("/sub/hello.txt")).await, Ok(13));
        assert!(matches!(store.size(&p("/sub")).await, Err(Error::NotFound(_))));
        assert!(matches!(store.size(&p("/nope")).await, Err(Error::NotFound(_))));
        assert!(matches!(store.size(&PathKey::root()).await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_read() {
        let (_dir, store) = store();
        let file = p("/sub/hello.txt");
        assert_eq!(store.read(&file, 0, 5).await.unwrap(), b"Hello");
        assert_eq!(store.read(&file, 7, 6).await.unwrap(), b"World!");
        assert_eq!(store.read(&file, 13, 0).await.unwrap(), b"");

        assert!(matches!(store.read(&file, -1, 1).await, Err(Error::InvalidArgument(_))));
        assert!(matches!(store.read(&file, 0, -1).await, Err(Error::InvalidArgument(_))));
        assert!(matches!(store.read(&file, 10, 4).await, Err(Error::OutOfBounds(_))));
        assert!(matches!(store.read(&file, 0, 14).await, Err(Error::OutOfBounds(_))));
        assert!(matches!(store.read(&file, i64::MAX, i64::MAX).await, Err(Error::OutOfBounds(_))));
        assert!(matches!(store.read(&p("/sub"), 0, 0).await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let (_dir, store) = store();
        let file = p("/sub/hello.txt");
        store.write(&file, 0, b"Howdy").await.unwrap();
        assert_eq!(store.read(&file, 0, 13).await.unwrap(), b"Howdy, World!");

        assert_eq!(store.create(&p("/fresh")).await, Ok(true));
        store.write(&p("/fresh"), 0, b"data").await.unwrap();
        assert_eq!(store.read(&p("/fresh"), 0, 4).await.unwrap(), b"data");
    }

    #[tokio::test]
    async fn test_write_past_end_zero_fills() {
        let (_dir, store) = store();
        let file = p("/sub/hello.txt");
        store.write(&file, 20, b"tail").await.unwrap();

        let size = store.size(&file).await.unwrap();
        assert!(size >= 24);
        assert_eq!(store.read(&file, 13, 7).await.unwrap(), vec![0u8; 7]);
        assert_eq!(store.read(&file, 20, 4).await.unwrap(), b"tail");
    }

    #[tokio::test]
    async fn test_write_errors() {
        let (_dir, store) = store();
        assert!(matches!(
            store.write(&p("/sub/hello.txt"), -1, b"x").await,
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(store.write(&p("/sub"), 0, b"x").await, Err(Error::NotFound(_))));
        assert!(matches!(store.write(&p("/absent"), 0, b"x").await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_zero_length_write_is_a_no_op() {
        let (_dir, store) = store();
        let file = p("/sub/hello.txt");
        tokio_test::assert_ok!(store.write(&file, 100, b"").await);
        assert_eq!(store.size(&file).await, Ok(13));
    }

    #[tokio::test]
    async fn test_create() {
        let (dir, store) = store();
        assert_eq!(store.create(&PathKey::root()).await, Ok(false));
        assert_eq!(store.create(&p("/sub/hello.txt")).await, Ok(false));
        assert_eq!(store.create(&p("/sub")).await, Ok(false));

        assert_eq!(store.create(&p("/new/deep/file")).await, Ok(true));
        assert!(dir.path().join("new/deep/file").is_file());
        assert_eq!(store.size(&p("/new/deep/file")).await, Ok(0));

        // A file is in the way of the parent directory
        assert_eq!(store.create(&p("/sub/hello.txt/child")).await, Ok(false));
        // Cannot be mapped below the root
        assert_eq!(store.create(&p("/../escape")).await, Ok(false));
    }

    #[tokio::test]
    async fn test_delete() {
        let (dir, store) = store();
        std::fs::create_dir_all(dir.path().join("tree/a/b")).unwrap();
        std::fs::write(dir.path().join("tree/a/one"), b"1").unwrap();
        std::fs::write(dir.path().join("tree/a/b/two"), b"2").unwrap();

        assert_eq!(store.delete(&PathKey::root()).await, Ok(false));
        assert_eq!(store.delete(&p("/missing")).await, Ok(false));

        assert_eq!(store.delete(&p("/tree")).await, Ok(true));
        assert!(!dir.path().join("tree").exists());
        assert!(matches!(store.size(&p("/tree/a/one")).await, Err(Error::NotFound(_))));

        assert_eq!(store.delete(&p("/sub/hello.txt")).await, Ok(true));
        assert!(dir.path().join("sub").is_dir());
        assert!(dir.path().exists());
    }
}
