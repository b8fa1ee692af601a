// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::{Context, Result};
use common::{Service, Storage};
use diagnostics::log_debug;

use crate::common::parse_path;

/// Write `data` at `offset`. With `create`, a missing file is created first.
pub async fn write_command(
    service: &dyn Service,
    path: &str,
    offset: u64,
    data: &[u8],
    create: bool,
) -> Result<()> {
    let file = parse_path(path)?;
    if create && !service.exists(&file).await? {
        _ = service
            .create_file(&file)
            .await
            .with_context(|| format!("Cannot create {file}"))?;
    }

    let storage = service
        .get_storage(&file)
        .await
        .with_context(|| format!("Cannot locate {file}"))?;
    let offset = i64::try_from(offset).context("offset is too large")?;
    storage
        .write(&file, offset, data)
        .await
        .with_context(|| format!("Cannot write {file}"))?;

    let count = data.len();
    log_debug!("Wrote {count} bytes to {path}", count: count, path: path);
    Ok(())
}
