// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io::Write;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cmd::commands;
use cmd::common::get_naming_addr_with_override;
use cmd::config::{DfsConfig, load_config, validate_config};
use common::ServiceStub;
use tokio::io::AsyncReadExt;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "dfs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging (otherwise DFS_LOG decides)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// YAML configuration for the naming and storage servers
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Naming service address for client commands (overrides DFS_NAMING)
    #[arg(long, global = true)]
    naming: Option<SocketAddr>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the naming service
    Naming {
        /// Client interface bind address
        #[arg(long)]
        service: Option<SocketAddr>,
        /// Registration interface bind address
        #[arg(long)]
        registration: Option<SocketAddr>,
    },
    /// Run a storage node serving a local directory
    Storage {
        /// Local directory holding this node's files
        #[arg(long)]
        root: Option<PathBuf>,
        /// Registration address of the naming service
        #[arg(long)]
        registration: Option<SocketAddr>,
        /// Address announced to the naming service
        #[arg(long)]
        advertise: Option<IpAddr>,
        /// Storage interface bind address
        #[arg(long)]
        storage_bind: Option<SocketAddr>,
        /// Command interface bind address
        #[arg(long)]
        command_bind: Option<SocketAddr>,
    },
    /// Print whether a path exists
    Exists {
        path: String,
    },
    /// List a directory
    Ls {
        #[arg(default_value = "/")]
        path: String,
    },
    /// Describe a file or directory
    Stat {
        path: String,
    },
    /// Create a directory
    Mkdir {
        path: String,
        /// Create missing parent directories
        #[arg(short, long)]
        parents: bool,
    },
    /// Create an empty file
    Touch {
        path: String,
    },
    /// Delete a file or directory tree
    Rm {
        path: String,
    },
    /// Print file contents
    Cat {
        path: String,
        #[arg(long, default_value_t = 0)]
        offset: u64,
        /// Bytes to read (default: to the end of the file)
        #[arg(long)]
        length: Option<u64>,
    },
    /// Write to a file from an argument or standard input
    Write {
        path: String,
        /// Data to write (default: read standard input)
        data: Option<String>,
        #[arg(long, default_value_t = 0)]
        offset: u64,
        /// Create the file if it does not exist
        #[arg(short, long)]
        create: bool,
    },
}

fn load_or_default(path: Option<&PathBuf>) -> Result<DfsConfig> {
    match path {
        Some(path) => load_config(path),
        None => Ok(DfsConfig::default()),
    }
}

#[allow(clippy::print_stdout)]
fn print_lines<I: IntoIterator<Item = String>>(lines: I) {
    for line in lines {
        println!("{line}");
    }
}

async fn read_stdin() -> Result<Vec<u8>> {
    let mut data = Vec::new();
    _ = tokio::io::stdin()
        .read_to_end(&mut data)
        .await
        .context("Failed to read standard input")?;
    Ok(data)
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = load_or_default(cli.config.as_ref())?;
    let service = || -> Result<ServiceStub> {
        Ok(ServiceStub::new(get_naming_addr_with_override(cli.naming)?))
    };

    match cli.command {
        Commands::Naming {
            service,
            registration,
        } => {
            if let Some(addr) = service {
                config.naming.service = addr;
            }
            if let Some(addr) = registration {
                config.naming.registration = addr;
            }
            validate_config(&config)?;
            commands::naming_command(&config.naming).await
        }
        Commands::Storage {
            root,
            registration,
            advertise,
            storage_bind,
            command_bind,
        } => {
            let storage = &mut config.storage;
            if root.is_some() {
                storage.root = root;
            }
            if let Some(addr) = registration {
                storage.naming = addr;
            }
            if advertise.is_some() {
                storage.advertise = advertise;
            }
            if let Some(addr) = storage_bind {
                storage.storage_bind = addr;
            }
            if let Some(addr) = command_bind {
                storage.command_bind = addr;
            }
            validate_config(&config)?;
            commands::storage_command(&config.storage).await
        }
        Commands::Exists { path } => {
            let exists = commands::exists_command(&service()?, &path).await?;
            print_lines([exists.to_string()]);
            Ok(())
        }
        Commands::Ls { path } => {
            print_lines(commands::list_command(&service()?, &path).await?);
            Ok(())
        }
        Commands::Stat { path } => {
            print_lines([commands::stat_command(&service()?, &path).await?]);
            Ok(())
        }
        Commands::Mkdir { path, parents } => {
            commands::mkdir_command(&service()?, &path, parents).await
        }
        Commands::Touch { path } => {
            if !commands::touch_command(&service()?, &path).await? {
                anyhow::bail!("{path} already exists");
            }
            Ok(())
        }
        Commands::Rm { path } => commands::rm_command(&service()?, &path).await,
        Commands::Cat {
            path,
            offset,
            length,
        } => {
            let data = commands::cat_command(&service()?, &path, offset, length).await?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&data).context("Failed to write to stdout")?;
            stdout.flush().context("Failed to write to stdout")?;
            Ok(())
        }
        Commands::Write {
            path,
            data,
            offset,
            create,
        } => {
            let data = match data {
                Some(text) => text.into_bytes(),
                None => read_stdin().await?,
            };
            commands::write_command(&service()?, &path, offset, &data, create).await
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.verbose {
        diagnostics::init_with_level(diagnostics::emit::Level::Debug);
    } else {
        diagnostics::init_diagnostics();
    }
    run(cli).await
}
