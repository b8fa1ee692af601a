// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::{Result, bail};
use common::{PathKey, Service};
use diagnostics::log_info;

use crate::common::parse_path;

/// Create a directory. With `parents`, missing ancestors are created first
/// and an existing directory is not an error.
pub async fn mkdir_command(service: &dyn Service, path: &str, parents: bool) -> Result<()> {
    let target = parse_path(path)?;

    if parents {
        let mut current = PathKey::root();
        for component in target.iter() {
            current = current.join(component)?;
            if !service.create_directory(&current).await? && !service.is_directory(&current).await? {
                bail!("{current} exists and is a file");
            }
        }
    } else if !service.create_directory(&target).await? {
        bail!("{target} already exists");
    }

    log_info!("Directory created successfully: {path}", path: path);
    Ok(())
}
