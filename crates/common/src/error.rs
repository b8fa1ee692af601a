// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by paths, the registry, local file commands and the transport.
///
/// Every variant except `Transport` is an application error: it is produced
/// by the callee and crosses the wire unchanged, so a remote caller sees the
/// same value a local caller would. `Transport` is only ever produced on the
/// calling side.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message")]
pub enum Error {
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Out of bounds: {0}")]
    OutOfBounds(String),

    #[error("Storage node already registered: {0}")]
    AlreadyRegistered(String),

    #[error("No storage available: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl Error {
    pub fn invalid_path<S: Display>(s: S) -> Self {
        Error::InvalidPath(s.to_string())
    }

    pub fn invalid_argument<S: Display>(s: S) -> Self {
        Error::InvalidArgument(s.to_string())
    }

    pub fn not_found<S: Display>(s: S) -> Self {
        Error::NotFound(s.to_string())
    }

    pub fn out_of_bounds<S: Display>(s: S) -> Self {
        Error::OutOfBounds(s.to_string())
    }

    pub fn already_registered<S: Display>(s: S) -> Self {
        Error::AlreadyRegistered(s.to_string())
    }

    pub fn unavailable<S: Display>(s: S) -> Self {
        Error::Unavailable(s.to_string())
    }

    pub fn transport<S: Display>(s: S) -> Self {
        Error::Transport(s.to_string())
    }

    /// Wrap a local I/O failure, keeping `NotFound` distinguishable.
    pub fn io<S: Display>(what: S, err: &std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Error::NotFound(what.to_string())
        } else {
            Error::Io(format!("{what}: {err}"))
        }
    }

    /// True when the remote endpoint could not be reached or the connection broke.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}
