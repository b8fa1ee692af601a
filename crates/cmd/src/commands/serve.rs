// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use common::RegistrationStub;
use diagnostics::log_info;
use naming::{NamingServer, RunningNaming};
use storage::StorageServer;

use crate::config::{NamingConfig, StorageConfig};

async fn wait_for_shutdown() -> Result<()> {
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")
}

/// Run a naming service until interrupted
pub async fn naming_command(config: &NamingConfig) -> Result<()> {
    let running = RunningNaming::start(
        Arc::new(NamingServer::new()),
        config.service,
        config.registration,
    )
    .await
    .context("Failed to start naming service")?;

    wait_for_shutdown().await?;
    log_info!("Naming service shutting down");
    running.stop().await;
    Ok(())
}

/// Run a storage node until interrupted
pub async fn storage_command(config: &StorageConfig) -> Result<()> {
    let root = config
        .root
        .clone()
        .ok_or_else(|| anyhow!("A storage root is required (--root or storage.root)"))?;
    let root_str = root.display().to_string();

    let naming = RegistrationStub::new(config.naming);
    let running = StorageServer::new(root, config.endpoints())
        .start(&naming)
        .await
        .with_context(|| format!("Failed to start storage node for {root_str}"))?;

    wait_for_shutdown().await?;
    log_info!("Storage node for {root_str} shutting down", root_str: root_str);
    running.stop().await;
    Ok(())
}
