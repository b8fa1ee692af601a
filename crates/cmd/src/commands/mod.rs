// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

pub mod cat;
pub mod list;
pub mod mkdir;
pub mod rm;
pub mod serve;
pub mod touch;
pub mod write;

pub use cat::cat_command;
pub use list::{exists_command, list_command, stat_command};
pub use mkdir::mkdir_command;
pub use rm::rm_command;
pub use serve::{naming_command, storage_command};
pub use touch::touch_command;
pub use write::write_command;
