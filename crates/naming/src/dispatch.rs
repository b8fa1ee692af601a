// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Skeleton-side routing of wire requests onto the `NamingServer`.
//!
//! The client and registration interfaces listen on separate endpoints;
//! each dispatcher only answers the methods of its own interface.

use crate::server::NamingServer;
use async_trait::async_trait;
use common::wire::{Request, Response};
use common::{Dispatch, Error, Registration, Result, Service, StorageNodeHandle};
use std::sync::Arc;

pub struct ServiceDispatch(pub Arc<NamingServer>);

pub struct RegistrationDispatch(pub Arc<NamingServer>);

fn unsupported(interface: &str, request: &Request) -> Error {
    Error::invalid_argument(format!(
        "{} is not a method of the {interface} interface",
        request.method()
    ))
}

#[async_trait]
impl Dispatch for ServiceDispatch {
    async fn dispatch(&self, request: Request) -> Result<Response> {
        let naming = &self.0;
        match request {
            Request::Exists { path } => naming.exists(&path).await.map(Response::Bool),
            Request::IsDirectory { path } => naming.is_directory(&path).await.map(Response::Bool),
            Request::List { path } => naming.list(&path).await.map(Response::Names),
            Request::CreateFile { path } => naming.create_file(&path).await.map(Response::Bool),
            Request::CreateDirectory { path } => naming
                .create_directory(&path)
                .await
                .map(Response::Bool),
            Request::DeletePath { path } => naming.delete(&path).await.map(Response::Bool),
            Request::GetStorage { path } => {
                naming.get_storage(&path).await.map(Response::Storage)
            }
            other => Err(unsupported("service", &other)),
        }
    }
}

#[async_trait]
impl Dispatch for RegistrationDispatch {
    async fn dispatch(&self, request: Request) -> Result<Response> {
        match request {
            Request::Register {
                storage,
                command,
                files,
            } => {
                let node = StorageNodeHandle::from_parts(storage, command)?;
                let files =
                    files.ok_or_else(|| Error::invalid_argument("file list is missing"))?;
                let duplicates = self.0.register(node, files).await?;
                Ok(Response::Duplicates(Some(duplicates)))
            }
            other => Err(unsupported("registration", &other)),
        }
    }
}
