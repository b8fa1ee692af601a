// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Logging for the naming service, storage nodes and the `dfs` CLI.
//!
//! Usage:
//! - Set DFS_LOG=off (default) - no logs
//! - Set DFS_LOG=error | warn - problems only
//! - Set DFS_LOG=info - registrations, startup, prune results
//! - Set DFS_LOG=debug - every request and local file command

use std::sync::Once;

// Re-export emit so macros can use it
pub use emit;

/// Environment variable consulted by [`init_diagnostics`]
pub const LOG_ENV: &str = "DFS_LOG";

static INIT: Once = Once::new();

/// Parse a `DFS_LOG` value. `Ok(None)` means logging is off.
pub fn parse_level(value: &str) -> Result<Option<emit::Level>, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "off" => Ok(None),
        "debug" => Ok(Some(emit::Level::Debug)),
        "info" => Ok(Some(emit::Level::Info)),
        "warn" => Ok(Some(emit::Level::Warn)),
        "error" => Ok(Some(emit::Level::Error)),
        other => Err(format!("unknown {LOG_ENV} value '{other}'")),
    }
}

/// Initialize diagnostics based on the DFS_LOG environment variable
///
/// Safe to call more than once; only the first call (of this or
/// [`init_with_level`]) installs an emitter.
pub fn init_diagnostics() {
    let value = std::env::var(LOG_ENV).unwrap_or_default();
    match parse_level(&value) {
        Ok(level) => install(level),
        Err(msg) => {
            install(Some(emit::Level::Info));
            emit::warn!("Unrecognized log level, using info: {reason}", reason: msg);
        }
    }
}

/// Initialize diagnostics at a fixed level, ignoring DFS_LOG
pub fn init_with_level(level: emit::Level) {
    install(Some(level));
}

fn install(level: Option<emit::Level>) {
    INIT.call_once(|| {
        let Some(level) = level else {
            return;
        };
        let rt = emit::setup()
            .emit_to(emit_term::stderr())
            .emit_when(emit::level::min_filter(level))
            .init();

        // The emitter stays installed for the life of the process
        std::mem::forget(rt);
    });
}

/// Log basic operations (registrations, server startup, prune results)
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

/// Log detailed diagnostics (individual requests, local file commands)
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

/// Log recoverable problems (a failed prune, a refused create)
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

/// Log failures that stop an operation
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}

/// Re-export the init function for convenience
pub use init_diagnostics as init;
