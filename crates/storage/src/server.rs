// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Storage node startup and lifecycle.
//!
//! Startup runs in a fixed order: take an inventory of the local root, start
//! both skeletons, register with the naming service, then prune whatever it
//! reports as duplicates. Any failure before registration stops the
//! skeletons again and is returned to the caller.

use crate::dispatch::{CommandDispatch, StorageDispatch};
use crate::local::LocalStore;
use crate::prune::PruneReport;
use common::{
    CommandStub, Error, Registration, Result, Skeleton, StorageNodeHandle, StorageStub,
};
use diagnostics::{log_error, log_info};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

/// Where a storage node listens and what it tells the naming service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoints {
    pub storage: SocketAddr,
    pub command: SocketAddr,
    /// Address other hosts reach this node at. Defaults to the bound IP.
    pub advertise: Option<IpAddr>,
}

impl Default for Endpoints {
    fn default() -> Self {
        let any_port = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0);
        Self {
            storage: any_port,
            command: any_port,
            advertise: None,
        }
    }
}

impl Endpoints {
    fn public(&self, bound: SocketAddr) -> Result<SocketAddr> {
        let ip = self.advertise.unwrap_or(bound.ip());
        if ip.is_unspecified() {
            return Err(Error::invalid_argument(format!(
                "{bound} is not reachable from other hosts; an advertise address is required"
            )));
        }
        Ok(SocketAddr::new(ip, bound.port()))
    }

    /// The handle other parties use to reach the bound skeletons
    fn handle(&self, storage: SocketAddr, command: SocketAddr) -> Result<StorageNodeHandle> {
        Ok(StorageNodeHandle::new(
            StorageStub::new(self.public(storage)?),
            CommandStub::new(self.public(command)?),
        ))
    }
}

pub struct StorageServer {
    store: Arc<LocalStore>,
    endpoints: Endpoints,
}

impl StorageServer {
    #[must_use]
    pub fn new<P: Into<PathBuf>>(root: P, endpoints: Endpoints) -> Self {
        Self {
            store: Arc::new(LocalStore::new(root)),
            endpoints,
        }
    }

    /// Serve the local root and join the filesystem through `naming`.
    pub async fn start(self, naming: &dyn Registration) -> Result<RunningStorage> {
        let root = self.store.root().display().to_string();

        // Fails on a missing root before anything is bound or sent
        let files = self.store.inventory().await?;
        let file_count = files.len();
        log_info!(
            "Storage root {root} holds {file_count} files",
            root: root,
            file_count: file_count
        );

        let storage = Skeleton::start(
            self.endpoints.storage,
            Arc::new(StorageDispatch(self.store.clone())),
        )
        .await?;
        let command = match Skeleton::start(
            self.endpoints.command,
            Arc::new(CommandDispatch(self.store.clone())),
        )
        .await
        {
            Ok(command) => command,
            Err(e) => {
                storage.stop().await;
                return Err(e);
            }
        };

        let handle = match self
            .endpoints
            .handle(storage.local_addr(), command.local_addr())
        {
            Ok(handle) => handle,
            Err(e) => {
                storage.stop().await;
                command.stop().await;
                return Err(e);
            }
        };

        let duplicates = match naming.register(handle, files).await {
            Ok(duplicates) => duplicates,
            Err(e) => {
                let err = e.to_string();
                log_error!("Registration of {root} failed: {error}", root: root, error: err);
                storage.stop().await;
                command.stop().await;
                return Err(e);
            }
        };

        let pruned = self.store.prune(&duplicates).await;
        let node_str = handle.to_string();
        let (files, directories) = (pruned.files, pruned.directories);
        log_info!(
            "Storage node {node_str} started; pruned {files} duplicates and {directories} directories",
            node_str: node_str,
            files: files,
            directories: directories
        );

        Ok(RunningStorage {
            store: self.store,
            storage,
            command,
            handle,
            pruned,
        })
    }
}

/// A registered storage node that is accepting requests
pub struct RunningStorage {
    store: Arc<LocalStore>,
    storage: Skeleton,
    command: Skeleton,
    handle: StorageNodeHandle,
    pruned: PruneReport,
}

impl RunningStorage {
    /// The endpoints this node registered under
    #[must_use]
    pub fn handle(&self) -> StorageNodeHandle {
        self.handle
    }

    #[must_use]
    pub fn store(&self) -> &Arc<LocalStore> {
        &self.store
    }

    /// What startup pruning removed
    #[must_use]
    pub fn pruned(&self) -> PruneReport {
        self.pruned
    }

    pub async fn stop(self) {
        self.storage.stop().await;
        self.command.stop().await;
    }
}
