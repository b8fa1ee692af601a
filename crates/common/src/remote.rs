// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! The four remote interfaces of the filesystem.
//!
//! Storage nodes serve `Storage` (data plane, used by clients) and `Command`
//! (control plane, used by the naming service). The naming service serves
//! `Service` (clients) and `Registration` (storage nodes). Each trait is
//! implemented once by the server-side object and once by a stub that
//! forwards over the transport, so callers do not care which they hold.

use crate::error::{Error, Result};
use crate::path::PathKey;
use crate::stub::{CommandStub, StorageStub};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Byte-level file access on one storage node
#[async_trait]
pub trait Storage: Send + Sync {
    /// Length of a file in bytes
    async fn size(&self, file: &PathKey) -> Result<u64>;

    /// Exactly `length` bytes starting at `offset`
    async fn read(&self, file: &PathKey, offset: i64, length: i64) -> Result<Vec<u8>>;

    /// Write `data` at `offset`, growing the file (zero filled) as needed
    async fn write(&self, file: &PathKey, offset: i64, data: &[u8]) -> Result<()>;
}

/// Structural commands the naming service issues to a storage node.
///
/// Both return `false` rather than an error for ordinary failures.
#[async_trait]
pub trait Command: Send + Sync {
    async fn create(&self, file: &PathKey) -> Result<bool>;

    async fn delete(&self, path: &PathKey) -> Result<bool>;
}

#[async_trait]
pub trait Registration: Send + Sync {
    /// Announce a storage node and its files. Returns the paths already owned
    /// by another node; the caller must delete its local copies.
    async fn register(
        &self,
        node: StorageNodeHandle,
        files: BTreeSet<PathKey>,
    ) -> Result<BTreeSet<PathKey>>;
}

/// Client-facing naming operations
#[async_trait]
pub trait Service: Send + Sync {
    async fn exists(&self, path: &PathKey) -> Result<bool>;

    async fn is_directory(&self, path: &PathKey) -> Result<bool>;

    async fn list(&self, directory: &PathKey) -> Result<BTreeSet<String>>;

    async fn create_file(&self, file: &PathKey) -> Result<bool>;

    async fn create_directory(&self, directory: &PathKey) -> Result<bool>;

    async fn delete(&self, path: &PathKey) -> Result<bool>;

    /// The data-plane endpoint of the node that owns `file`
    async fn get_storage(&self, file: &PathKey) -> Result<StorageStub>;
}

/// Both endpoints of one storage node. Two handles name the same node iff
/// both endpoints are equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StorageNodeHandle {
    pub storage: StorageStub,
    pub command: CommandStub,
}

impl StorageNodeHandle {
    #[must_use]
    pub fn new(storage: StorageStub, command: CommandStub) -> Self {
        Self { storage, command }
    }

    /// Assemble a handle from a request whose endpoints may be missing
    pub fn from_parts(storage: Option<StorageStub>, command: Option<CommandStub>) -> Result<Self> {
        match (storage, command) {
            (Some(storage), Some(command)) => Ok(Self { storage, command }),
            (None, _) => Err(Error::invalid_argument("storage endpoint is missing")),
            (_, None) => Err(Error::invalid_argument("command endpoint is missing")),
        }
    }
}

impl fmt::Display for StorageNodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "storage={} command={}",
            self.storage.addr(),
            self.command.addr()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(port: u16) -> std::net::SocketAddr {
        std::net::SocketAddr::from(([127, 0, 0, 1], port))
    }

    #[test]
    fn test_handle_identity_is_the_pair() {
        let a = StorageNodeHandle::new(StorageStub::new(addr(1)), CommandStub::new(addr(2)));
        let b = StorageNodeHandle::new(StorageStub::new(addr(1)), CommandStub::new(addr(2)));
        let c = StorageNodeHandle::new(StorageStub::new(addr(1)), CommandStub::new(addr(3)));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_from_parts_requires_both() {
        let storage = StorageStub::new(addr(1));
        let command = CommandStub::new(addr(2));
        assert!(StorageNodeHandle::from_parts(Some(storage), Some(command)).is_ok());
        assert!(matches!(
            StorageNodeHandle::from_parts(None, Some(command)),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            StorageNodeHandle::from_parts(Some(storage), None),
            Err(Error::InvalidArgument(_))
        ));
    }
}
