// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Client-side proxies for the remote interfaces.
//!
//! A stub is nothing more than the socket address of a skeleton; it can be
//! copied, compared and sent inside messages. Every method opens a
//! connection, sends one `Request` and decodes one `Reply`.

use crate::error::Result;
use crate::path::PathKey;
use crate::remote::{Command, Registration, Service, Storage, StorageNodeHandle};
use crate::transport::call;
use crate::wire::Request;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::net::SocketAddr;

macro_rules! stub {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name {
            addr: SocketAddr,
        }

        impl $name {
            #[must_use]
            pub fn new(addr: SocketAddr) -> Self {
                Self { addr }
            }

            #[must_use]
            pub fn addr(&self) -> SocketAddr {
                self.addr
            }
        }
    };
}

stub!(
    /// Data-plane endpoint of a storage node
    StorageStub
);
stub!(
    /// Control-plane endpoint of a storage node
    CommandStub
);
stub!(
    /// Registration endpoint of the naming service
    RegistrationStub
);
stub!(
    /// Client endpoint of the naming service
    ServiceStub
);

#[async_trait]
impl Storage for StorageStub {
    async fn size(&self, file: &PathKey) -> Result<u64> {
        let path = file.clone();
        call(self.addr, Request::Size { path }).await?.into_size()
    }

    async fn read(&self, file: &PathKey, offset: i64, length: i64) -> Result<Vec<u8>> {
        let path = file.clone();
        call(self.addr, Request::Read { path, offset, length })
            .await?
            .into_bytes()
    }

    async fn write(&self, file: &PathKey, offset: i64, data: &[u8]) -> Result<()> {
        let path = file.clone();
        let data = data.to_vec();
        call(self.addr, Request::Write { path, offset, data })
            .await?
            .into_unit()
    }
}

#[async_trait]
impl Command for CommandStub {
    async fn create(&self, file: &PathKey) -> Result<bool> {
        let path = file.clone();
        call(self.addr, Request::Create { path }).await?.into_bool()
    }

    async fn delete(&self, path: &PathKey) -> Result<bool> {
        let path = path.clone();
        call(self.addr, Request::Delete { path }).await?.into_bool()
    }
}

#[async_trait]
impl Registration for RegistrationStub {
    async fn register(
        &self,
        node: StorageNodeHandle,
        files: BTreeSet<PathKey>,
    ) -> Result<BTreeSet<PathKey>> {
        let request = Request::Register {
            storage: Some(node.storage),
            command: Some(node.command),
            files: Some(files),
        };
        call(self.addr, request).await?.into_duplicates()
    }
}

#[async_trait]
impl Service for ServiceStub {
    async fn exists(&self, path: &PathKey) -> Result<bool> {
        let path = path.clone();
        call(self.addr, Request::Exists { path }).await?.into_bool()
    }

    async fn is_directory(&self, path: &PathKey) -> Result<bool> {
        let path = path.clone();
        call(self.addr, Request::IsDirectory { path })
            .await?
            .into_bool()
    }

    async fn list(&self, directory: &PathKey) -> Result<BTreeSet<String>> {
        let path = directory.clone();
        call(self.addr, Request::List { path }).await?.into_names()
    }

    async fn create_file(&self, file: &PathKey) -> Result<bool> {
        let path = file.clone();
        call(self.addr, Request::CreateFile { path })
            .await?
            .into_bool()
    }

    async fn create_directory(&self, directory: &PathKey) -> Result<bool> {
        let path = directory.clone();
        call(self.addr, Request::CreateDirectory { path })
            .await?
            .into_bool()
    }

    async fn delete(&self, path: &PathKey) -> Result<bool> {
        let path = path.clone();
        call(self.addr, Request::DeletePath { path })
            .await?
            .into_bool()
    }

    async fn get_storage(&self, file: &PathKey) -> Result<StorageStub> {
        let path = file.clone();
        call(self.addr, Request::GetStorage { path })
            .await?
            .into_storage()
    }
}
