// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Tagged request and reply messages exchanged by stubs and skeletons.

use crate::error::{Error, Result};
use crate::path::PathKey;
use crate::stub::{CommandStub, StorageStub};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One method invocation. The `method` tag names the interface method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Request {
    // Storage
    Size {
        path: PathKey,
    },
    Read {
        path: PathKey,
        offset: i64,
        length: i64,
    },
    Write {
        path: PathKey,
        offset: i64,
        data: Vec<u8>,
    },

    // Command
    Create {
        path: PathKey,
    },
    Delete {
        path: PathKey,
    },

    // Registration. Every field is optional on the wire so that an
    // incomplete request is answered with `InvalidArgument`.
    Register {
        #[serde(default)]
        storage: Option<StorageStub>,
        #[serde(default)]
        command: Option<CommandStub>,
        #[serde(default)]
        files: Option<BTreeSet<PathKey>>,
    },

    // Service
    Exists {
        path: PathKey,
    },
    IsDirectory {
        path: PathKey,
    },
    List {
        path: PathKey,
    },
    CreateFile {
        path: PathKey,
    },
    CreateDirectory {
        path: PathKey,
    },
    DeletePath {
        path: PathKey,
    },
    GetStorage {
        path: PathKey,
    },
}

impl Request {
    /// The method tag, for logging
    #[must_use]
    pub fn method(&self) -> &'static str {
        match self {
            Request::Size { .. } => "size",
            Request::Read { .. } => "read",
            Request::Write { .. } => "write",
            Request::Create { .. } => "create",
            Request::Delete { .. } => "delete",
            Request::Register { .. } => "register",
            Request::Exists { .. } => "exists",
            Request::IsDirectory { .. } => "is_directory",
            Request::List { .. } => "list",
            Request::CreateFile { .. } => "create_file",
            Request::CreateDirectory { .. } => "create_directory",
            Request::DeletePath { .. } => "delete_path",
            Request::GetStorage { .. } => "get_storage",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Response {
    Unit,
    Bool(bool),
    Size(u64),
    Bytes(Vec<u8>),
    /// `None` is equivalent to an empty set
    Duplicates(Option<BTreeSet<PathKey>>),
    Names(BTreeSet<String>),
    Storage(StorageStub),
}

/// What travels back for every request
pub type Reply = std::result::Result<Response, Error>;

fn unexpected(expected: &str, got: &Response) -> Error {
    Error::transport(format!("expected {expected} reply, got {got:?}"))
}

impl Response {
    pub fn into_unit(self) -> Result<()> {
        match self {
            Response::Unit => Ok(()),
            other => Err(unexpected("unit", &other)),
        }
    }

    pub fn into_bool(self) -> Result<bool> {
        match self {
            Response::Bool(b) => Ok(b),
            other => Err(unexpected("bool", &other)),
        }
    }

    pub fn into_size(self) -> Result<u64> {
        match self {
            Response::Size(n) => Ok(n),
            other => Err(unexpected("size", &other)),
        }
    }

    pub fn into_bytes(self) -> Result<Vec<u8>> {
        match self {
            Response::Bytes(data) => Ok(data),
            other => Err(unexpected("bytes", &other)),
        }
    }

    pub fn into_duplicates(self) -> Result<BTreeSet<PathKey>> {
        match self {
            Response::Duplicates(dups) => Ok(dups.unwrap_or_default()),
            other => Err(unexpected("duplicates", &other)),
        }
    }

    pub fn into_names(self) -> Result<BTreeSet<String>> {
        match self {
            Response::Names(names) => Ok(names),
            other => Err(unexpected("names", &other)),
        }
    }

    pub fn into_storage(self) -> Result<StorageStub> {
        match self {
            Response::Storage(stub) => Ok(stub),
            other => Err(unexpected("storage", &other)),
        }
    }
}
