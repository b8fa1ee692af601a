// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Naming service: the metadata authority mapping paths to storage nodes.

mod dispatch;
mod server;
pub mod tree;

pub use dispatch::{RegistrationDispatch, ServiceDispatch};
pub use server::NamingServer;
pub use tree::DirectoryTree;

use common::{RegistrationStub, Result, ServiceStub, Skeleton};
use diagnostics::log_info;
use std::net::SocketAddr;
use std::sync::Arc;

/// A naming service that is accepting requests
pub struct RunningNaming {
    server: Arc<NamingServer>,
    service: Skeleton,
    registration: Skeleton,
}

impl RunningNaming {
    /// Start both interfaces of `server`
    pub async fn start(
        server: Arc<NamingServer>,
        service_addr: SocketAddr,
        registration_addr: SocketAddr,
    ) -> Result<Self> {
        let service = Skeleton::start(service_addr, Arc::new(ServiceDispatch(server.clone()))).await?;
        let registration = Skeleton::start(
            registration_addr,
            Arc::new(RegistrationDispatch(server.clone())),
        )
        .await?;

        let service_at = service.local_addr().to_string();
        let registration_at = registration.local_addr().to_string();
        log_info!(
            "Naming service on {service_at}, registration on {registration_at}",
            service_at: service_at,
            registration_at: registration_at
        );
        Ok(Self {
            server,
            service,
            registration,
        })
    }

    #[must_use]
    pub fn server(&self) -> &Arc<NamingServer> {
        &self.server
    }

    #[must_use]
    pub fn service_stub(&self) -> ServiceStub {
        ServiceStub::new(self.service.local_addr())
    }

    #[must_use]
    pub fn registration_stub(&self) -> RegistrationStub {
        RegistrationStub::new(self.registration.local_addr())
    }

    pub async fn stop(self) {
        self.service.stop().await;
        self.registration.stop().await;
    }
}
