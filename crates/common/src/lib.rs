// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Types shared by the naming service, storage nodes and clients: paths,
//! errors, the remote interfaces and the transport that carries them.

pub mod error;
pub mod path;
pub mod remote;
pub mod stub;
pub mod transport;
pub mod wire;

pub use error::{Error, Result};
pub use path::PathKey;
pub use remote::{Command, Registration, Service, Storage, StorageNodeHandle};
pub use stub::{CommandStub, RegistrationStub, ServiceStub, StorageStub};
pub use transport::{Dispatch, Skeleton};

/// Well-known port of the naming service's client interface
pub const SERVICE_PORT: u16 = 6000;

/// Well-known port of the naming service's registration interface
pub const REGISTRATION_PORT: u16 = 6001;
