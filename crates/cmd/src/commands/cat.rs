// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::{Context, Result};
use common::{Service, Storage};
use diagnostics::log_debug;

use crate::common::parse_path;

/// Read `length` bytes at `offset`, or everything from `offset` to the end
pub async fn cat_command(
    service: &dyn Service,
    path: &str,
    offset: u64,
    length: Option<u64>,
) -> Result<Vec<u8>> {
    let file = parse_path(path)?;
    let storage = service
        .get_storage(&file)
        .await
        .with_context(|| format!("Cannot locate {file}"))?;

    let length = match length {
        Some(length) => length,
        None => storage.size(&file).await?.saturating_sub(offset),
    };
    let offset = i64::try_from(offset).context("offset is too large")?;
    let length = i64::try_from(length).context("length is too large")?;

    let data = storage
        .read(&file, offset, length)
        .await
        .with_context(|| format!("Cannot read {file}"))?;
    let addr = storage.addr().to_string();
    log_debug!(
        "Read {length} bytes of {path} from {addr}",
        length: length,
        path: path,
        addr: addr
    );
    Ok(data)
}
