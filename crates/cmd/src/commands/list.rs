// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::{Context, Result};
use common::{Service, Storage};
use diagnostics::log_debug;

use crate::common::parse_path;

pub async fn exists_command(service: &dyn Service, path: &str) -> Result<bool> {
    let path = parse_path(path)?;
    Ok(service.exists(&path).await?)
}

/// Names in a directory, one per line, with a trailing `/` on subdirectories
pub async fn list_command(service: &dyn Service, path: &str) -> Result<Vec<String>> {
    let dir = parse_path(path)?;
    let names = service
        .list(&dir)
        .await
        .with_context(|| format!("Cannot list {dir}"))?;

    let mut lines = Vec::with_capacity(names.len());
    for name in names {
        let child = dir.join(&name)?;
        if service.is_directory(&child).await? {
            lines.push(format!("{name}/"));
        } else {
            lines.push(name);
        }
    }
    let count = lines.len();
    log_debug!("Listed {count} entries in {path}", count: count, path: path);
    Ok(lines)
}

/// One-line description of a file or directory
pub async fn stat_command(service: &dyn Service, path: &str) -> Result<String> {
    let path = parse_path(path)?;
    if service
        .is_directory(&path)
        .await
        .with_context(|| format!("Cannot stat {path}"))?
    {
        let entries = service.list(&path).await?.len();
        return Ok(format!("{path}\tdirectory\t{entries} entries"));
    }

    let storage = service.get_storage(&path).await?;
    let size = storage.size(&path).await?;
    Ok(format!("{path}\tfile\t{size} bytes\t{}", storage.addr()))
}
