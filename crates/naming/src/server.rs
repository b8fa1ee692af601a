// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! The naming service: registration of storage nodes and every client query.
//!
//! All state lives in one `Registry` behind a `tokio::sync::RwLock`.
//! Registration and mutations hold the write half for their whole
//! check-and-insert pass, so no reader ever observes a half-applied batch.
//! Remote calls to storage nodes are only made after the lock is released.

use crate::tree::{DirectoryTree, Node};
use async_trait::async_trait;
use common::{
    Command, Error, PathKey, Registration, Result, Service, StorageNodeHandle, StorageStub,
};
use diagnostics::{log_debug, log_info, log_warn};
use std::collections::BTreeSet;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Registry {
    tree: DirectoryTree,
    /// Registered nodes, in registration order
    nodes: Vec<StorageNodeHandle>,
    /// Round-robin cursor for placing new files
    next: usize,
}

/// A storage node that could not be reached is reported as unavailable,
/// naming the node, so callers can tell it apart from the naming hop.
fn from_node(node: StorageNodeHandle, err: Error) -> Error {
    if err.is_transport() {
        Error::unavailable(format!("storage node {node}: {err}"))
    } else {
        err
    }
}

impl Registry {
    fn is_registered(&self, node: &StorageNodeHandle) -> bool {
        self.nodes.contains(node)
    }

    fn pick_node(&mut self) -> Option<StorageNodeHandle> {
        if self.nodes.is_empty() {
            return None;
        }
        let node = self.nodes[self.next % self.nodes.len()];
        self.next = self.next.wrapping_add(1);
        Some(node)
    }

    /// The parent of `path` must exist and be a directory
    fn check_parent(&self, path: &PathKey) -> Result<()> {
        let parent = path.parent()?;
        match self.tree.is_directory(&parent) {
            Ok(true) => Ok(()),
            Ok(false) => Err(Error::not_found(format!("{parent} is a file"))),
            Err(e) => Err(e),
        }
    }
}

#[derive(Debug, Default)]
pub struct NamingServer {
    registry: RwLock<Registry>,
}

impl NamingServer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered storage nodes
    pub async fn node_count(&self) -> usize {
        self.registry.read().await.nodes.len()
    }

    /// The node owning `file`
    pub async fn owner(&self, file: &PathKey) -> Result<StorageNodeHandle> {
        self.registry.read().await.tree.owner(file)
    }
}

#[async_trait]
impl Registration for NamingServer {
    async fn register(
        &self,
        node: StorageNodeHandle,
        files: BTreeSet<PathKey>,
    ) -> Result<BTreeSet<PathKey>> {
        let mut registry = self.registry.write().await;
        if registry.is_registered(&node) {
            return Err(Error::already_registered(node));
        }

        let mut duplicates = BTreeSet::new();
        for path in files {
            if path.is_root() {
                continue;
            }
            if registry.tree.conflicts(&path) {
                _ = duplicates.insert(path);
                continue;
            }
            registry.tree.insert(&path, node)?;
        }
        registry.nodes.push(node);
        drop(registry);

        let node_str = node.to_string();
        let dup_count = duplicates.len();
        log_info!(
            "Registered storage node {node_str} with {dup_count} duplicates",
            node_str: node_str,
            dup_count: dup_count
        );
        Ok(duplicates)
    }
}

#[async_trait]
impl Service for NamingServer {
    async fn exists(&self, path: &PathKey) -> Result<bool> {
        Ok(self.registry.read().await.tree.exists(path))
    }

    async fn is_directory(&self, path: &PathKey) -> Result<bool> {
        self.registry.read().await.tree.is_directory(path)
    }

    async fn list(&self, directory: &PathKey) -> Result<BTreeSet<String>> {
        self.registry.read().await.tree.list(directory)
    }

    async fn create_directory(&self, directory: &PathKey) -> Result<bool> {
        let mut registry = self.registry.write().await;
        if registry.tree.exists(directory) {
            return Ok(false);
        }
        registry.check_parent(directory)?;
        registry.tree.insert_directory(directory)?;
        Ok(true)
    }

    async fn create_file(&self, file: &PathKey) -> Result<bool> {
        // Reserve the name under the lock, then ask the chosen node to
        // create it with the lock released.
        let node = {
            let mut registry = self.registry.write().await;
            if registry.tree.exists(file) {
                return Ok(false);
            }
            registry.check_parent(file)?;
            let node = registry
                .pick_node()
                .ok_or_else(|| Error::unavailable("no storage node is registered"))?;
            registry.tree.insert(file, node)?;
            node
        };

        let path_str = file.to_string();
        let node_str = node.to_string();
        let outcome = node.command.create(file).await.map_err(|e| from_node(node, e));
        if matches!(outcome, Ok(true)) {
            log_debug!("Created {path_str} on {node_str}", path_str: path_str, node_str: node_str);
            return Ok(true);
        }

        let mut registry = self.registry.write().await;
        if registry.tree.owner(file).ok() == Some(node) {
            _ = registry.tree.remove(file);
        }
        log_warn!(
            "Storage node {node_str} did not create {path_str}",
            node_str: node_str,
            path_str: path_str
        );
        outcome
    }

    async fn delete(&self, path: &PathKey) -> Result<bool> {
        if path.is_root() {
            return Ok(false);
        }
        let removed = self
            .registry
            .write()
            .await
            .tree
            .remove(path)
            .ok_or_else(|| Error::not_found(path))?;

        let owners: BTreeSet<StorageNodeHandle> = match &removed {
            Node::File(file) => BTreeSet::from([file.owner]),
            Node::Directory(_) => removed
                .files(path)
                .into_iter()
                .map(|(_, owner)| owner)
                .collect(),
        };

        // Every owner is asked, even after one fails
        let mut all_deleted = true;
        let mut first_error = None;
        for owner in owners {
            match owner.command.delete(path).await {
                Ok(deleted) => all_deleted &= deleted,
                Err(e) => {
                    let (node_str, err) = (owner.to_string(), e.to_string());
                    log_warn!(
                        "Storage node {node_str} did not delete: {error}",
                        node_str: node_str,
                        error: err
                    );
                    all_deleted = false;
                    _ = first_error.get_or_insert(from_node(owner, e));
                }
            }
        }
        let path_str = path.to_string();
        log_debug!(
            "Deleted {path_str}: {all_deleted}",
            path_str: path_str,
            all_deleted: all_deleted
        );
        match first_error {
            Some(err) => Err(err),
            None => Ok(all_deleted),
        }
    }

    async fn get_storage(&self, file: &PathKey) -> Result<StorageStub> {
        Ok(self.registry.read().await.tree.owner(file)?.storage)
    }
}
