// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! YAML configuration for the `naming` and `storage` servers.
//!
//! ```yaml
//! naming:
//!   service: 0.0.0.0:6000
//!   registration: 0.0.0.0:6001
//! storage:
//!   root: /srv/dfs
//!   naming: 10.0.0.1:6001
//!   advertise: 10.0.0.7
//!   storage_bind: 0.0.0.0:7000
//!   command_bind: 0.0.0.0:7001
//! ```
//!
//! Every field is optional; command-line flags override the file.

use anyhow::{Context, Result};
use common::{REGISTRATION_PORT, SERVICE_PORT};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DfsConfig {
    pub naming: NamingConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NamingConfig {
    /// Client interface bind address
    pub service: SocketAddr,
    /// Registration interface bind address
    pub registration: SocketAddr,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            service: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), SERVICE_PORT),
            registration: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), REGISTRATION_PORT),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Local directory holding this node's files
    pub root: Option<PathBuf>,
    /// Registration interface of the naming service
    pub naming: SocketAddr,
    /// Address announced to the naming service
    pub advertise: Option<IpAddr>,
    pub storage_bind: SocketAddr,
    pub command_bind: SocketAddr,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let loopback = IpAddr::V4(Ipv4Addr::LOCALHOST);
        Self {
            root: None,
            naming: SocketAddr::new(loopback, REGISTRATION_PORT),
            advertise: None,
            storage_bind: SocketAddr::new(loopback, 0),
            command_bind: SocketAddr::new(loopback, 0),
        }
    }
}

impl StorageConfig {
    #[must_use]
    pub fn endpoints(&self) -> storage::Endpoints {
        storage::Endpoints {
            storage: self.storage_bind,
            command: self.command_bind,
            advertise: self.advertise,
        }
    }
}

/// Load configuration from YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<DfsConfig> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

    let config: DfsConfig =
        serde_yaml_ng::from_str(&content).with_context(|| "Failed to parse YAML configuration")?;

    validate_config(&config)?;
    Ok(config)
}

fn same_fixed_port(a: SocketAddr, b: SocketAddr) -> bool {
    a.port() != 0 && a == b
}

/// Validate configuration
pub fn validate_config(config: &DfsConfig) -> Result<()> {
    if same_fixed_port(config.naming.service, config.naming.registration) {
        anyhow::bail!(
            "naming service and registration cannot share {}",
            config.naming.service
        );
    }

    let storage = &config.storage;
    if same_fixed_port(storage.storage_bind, storage.command_bind) {
        anyhow::bail!(
            "storage and command interfaces cannot share {}",
            storage.storage_bind
        );
    }
    if storage.advertise.is_none()
        && (storage.storage_bind.ip().is_unspecified() || storage.command_bind.ip().is_unspecified())
    {
        anyhow::bail!("storage.advertise is required when binding an unspecified address");
    }
    if storage.naming.port() == 0 || storage.naming.ip().is_unspecified() {
        anyhow::bail!("storage.naming must be a reachable address, not {}", storage.naming);
    }
    if storage.root.as_ref().is_some_and(|r| r.as_os_str().is_empty()) {
        anyhow::bail!("storage.root cannot be empty");
    }

    Ok(())
}
