// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Skeleton-side routing of wire requests onto a `LocalStore`.

use crate::local::LocalStore;
use async_trait::async_trait;
use common::wire::{Request, Response};
use common::{Command, Dispatch, Error, Result, Storage};
use std::sync::Arc;

/// Data plane: size, read and write
pub struct StorageDispatch(pub Arc<LocalStore>);

/// Control plane: create and delete
pub struct CommandDispatch(pub Arc<LocalStore>);

fn unsupported(interface: &str, request: &Request) -> Error {
    Error::invalid_argument(format!(
        "{} is not a method of the {interface} interface",
        request.method()
    ))
}

#[async_trait]
impl Dispatch for StorageDispatch {
    async fn dispatch(&self, request: Request) -> Result<Response> {
        let store = &self.0;
        match request {
            Request::Size { path } => store.size(&path).await.map(Response::Size),
            Request::Read {
                path,
                offset,
                length,
            } => store.read(&path, offset, length).await.map(Response::Bytes),
            Request::Write { path, offset, data } => store
                .write(&path, offset, &data)
                .await
                .map(|()| Response::Unit),
            other => Err(unsupported("storage", &other)),
        }
    }
}

#[async_trait]
impl Dispatch for CommandDispatch {
    async fn dispatch(&self, request: Request) -> Result<Response> {
        let store = &self.0;
        match request {
            Request::Create { path } => store.create(&path).await.map(Response::Bool),
            Request::Delete { path } => store.delete(&path).await.map(Response::Bool),
            other => Err(unsupported("command", &other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::PathKey;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_interfaces_are_separate() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(LocalStore::new(dir.path()));
        let storage = StorageDispatch(store.clone());
        let command = CommandDispatch(store);
        let path = PathKey::parse("/f").unwrap();

        assert!(matches!(
            storage.dispatch(Request::Create { path: path.clone() }).await,
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            command.dispatch(Request::Size { path: path.clone() }).await,
            Err(Error::InvalidArgument(_))
        ));

        assert_eq!(
            command.dispatch(Request::Create { path: path.clone() }).await,
            Ok(Response::Bool(true))
        );
        assert_eq!(
            storage
                .dispatch(Request::Write {
                    path: path.clone(),
                    offset: 0,
                    data: b"abc".to_vec(),
                })
                .await,
            Ok(Response::Unit)
        );
        assert_eq!(
            storage.dispatch(Request::Size { path }).await,
            Ok(Response::Size(3))
        );
    }
}
