// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use anyhow::{Context, Result};
use common::{PathKey, SERVICE_PORT};

/// Environment variable naming the service interface of the naming server
pub const NAMING_ENV: &str = "DFS_NAMING";

fn resolve_naming_addr(
    override_addr: Option<SocketAddr>,
    from_env: Option<String>,
) -> Result<SocketAddr> {
    if let Some(addr) = override_addr {
        return Ok(addr);
    }
    match from_env {
        Some(value) => value
            .parse()
            .with_context(|| format!("{NAMING_ENV}={value} is not a socket address")),
        None => Ok(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), SERVICE_PORT)),
    }
}

/// Get the naming service address with an optional override, falling back to
/// the DFS_NAMING environment variable and then the well-known local port
pub fn get_naming_addr_with_override(override_addr: Option<SocketAddr>) -> Result<SocketAddr> {
    resolve_naming_addr(override_addr, env::var(NAMING_ENV).ok())
}

/// Parse a user-supplied distributed path
pub fn parse_path(path: &str) -> Result<PathKey> {
    PathKey::parse(path).with_context(|| format!("Invalid path: {path}"))
}
