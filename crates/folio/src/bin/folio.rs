//! The `folio` command-line tool.
//!
//! ```bash
//! folio boot                        # boot the host, print the activation summary
//! folio plugins                     # list enabled plugins and their state
//! folio --base-path /srv/site plugins --json
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use folio::framework::EnablementCache;
use folio::listing::{PluginTable, plugin_rows};
use folio::runtime::FolioRuntime;

#[derive(Parser, Debug)]
#[command(name = "folio", version, about = "Folio plugin host")]
struct Cli {
    /// Configuration file (default: search for folio.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Host base directory, overriding `paths.base_path`
    #[arg(short, long, global = true)]
    base_path: Option<PathBuf>,

    /// Configuration profile (development, production, ...)
    #[arg(short, long, global = true)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Boot the host and print the activation summary
    Boot,
    /// List enabled plugins and their activation state
    Plugins {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder = FolioRuntime::builder();
    if let Some(config) = &cli.config {
        builder = builder.config_file(config);
    }
    if let Some(base_path) = &cli.base_path {
        builder = builder.base_path(base_path);
    }
    if let Some(profile) = &cli.profile {
        builder = builder.profile(profile.clone());
    }
    let runtime = builder
        .build()
        .context("failed to initialize the Folio runtime")?
        .booted();

    match cli.command {
        Command::Boot => {
            print!("{}", runtime.stats());
        }
        Command::Plugins { json } => {
            let snapshot = runtime
                .cache()
                .read()
                .with_context(|| format!("failed to read {}", runtime.cache().path().display()))?;
            let rows = plugin_rows(&snapshot, runtime.report());
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                print!("{}", PluginTable(&rows));
            }
        }
    }

    Ok(())
}
