// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Removal of files the naming service reported as duplicates.

use common::PathKey;
use diagnostics::log_warn;
use std::collections::BTreeSet;
use std::path::Path;

/// What a pruning pass removed from disk
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PruneReport {
    pub files: usize,
    pub directories: usize,
}

async fn is_empty_dir(local: &Path) -> bool {
    match tokio::fs::read_dir(local).await {
        Ok(mut entries) => matches!(entries.next_entry().await, Ok(None)),
        Err(_) => false,
    }
}

/// Delete each duplicate below `root`, then climb from its parent removing
/// directories that became empty. The root itself is never removed.
pub(crate) async fn prune_tree(root: &Path, duplicates: &BTreeSet<PathKey>) -> PruneReport {
    let mut report = PruneReport::default();
    let mut parents = BTreeSet::new();

    for path in duplicates {
        let Ok(parent) = path.parent() else {
            continue;
        };
        let Ok(local) = path.to_local(root) else {
            let path = path.to_string();
            log_warn!("Duplicate {path} does not map below the storage root", path: path);
            continue;
        };
        match tokio::fs::remove_file(&local).await {
            Ok(()) => report.files += 1,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                let (path, err) = (path.to_string(), e.to_string());
                log_warn!("Cannot remove duplicate {path}: {error}", path: path, error: err);
                continue;
            }
        }
        _ = parents.insert(parent);
    }

    // Deepest first, so a directory is examined after its children
    let mut parents: Vec<PathKey> = parents.into_iter().collect();
    parents.sort_by_key(|dir| std::cmp::Reverse(dir.depth()));

    for mut dir in parents {
        while !dir.is_root() {
            let Ok(local) = dir.to_local(root) else {
                break;
            };
            if !is_empty_dir(&local).await {
                break;
            }
            if let Err(e) = tokio::fs::remove_dir(&local).await {
                let (path, err) = (dir.to_string(), e.to_string());
                log_warn!("Cannot remove empty directory {path}: {error}", path: path, error: err);
                break;
            }
            report.directories += 1;
            let Ok(parent) = dir.parent() else {
                break;
            };
            dir = parent;
        }
    }
    report
}
