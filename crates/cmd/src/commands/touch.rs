// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::{Context, Result};
use common::Service;
use diagnostics::log_debug;

use crate::common::parse_path;

/// Create an empty file. Returns `false` if the path already exists.
pub async fn touch_command(service: &dyn Service, path: &str) -> Result<bool> {
    let file = parse_path(path)?;
    let created = service
        .create_file(&file)
        .await
        .with_context(|| format!("Cannot create {file}"))?;
    log_debug!("touch {path}: {created}", path: path, created: created);
    Ok(created)
}
