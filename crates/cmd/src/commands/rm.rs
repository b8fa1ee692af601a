// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::{Context, Result, bail};
use common::Service;
use diagnostics::log_info;

use crate::common::parse_path;

/// Delete a file or a whole directory tree
pub async fn rm_command(service: &dyn Service, path: &str) -> Result<()> {
    let target = parse_path(path)?;
    if target.is_root() {
        bail!("Refusing to delete the root directory");
    }
    let deleted = service
        .delete(&target)
        .await
        .with_context(|| format!("Cannot delete {target}"))?;
    if !deleted {
        bail!("{target} was removed from the namespace but a storage node kept its copy");
    }
    log_info!("Deleted {path}", path: path);
    Ok(())
}
