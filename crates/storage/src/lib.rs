// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Storage node: serves files below a local root directory and registers
//! them with the naming service at startup.

mod dispatch;
mod local;
mod prune;
mod server;

pub use dispatch::{CommandDispatch, StorageDispatch};
pub use local::LocalStore;
pub use prune::PruneReport;
pub use server::{Endpoints, RunningStorage, StorageServer};
