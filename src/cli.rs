use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Menu-driven operations console.
#[derive(Debug, Parser)]
#[command(name = "opsmenu", version, about = "Menu-driven operations console")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// User whose profiles are loaded; prompted for when absent
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    /// Log level written to opsmenu.log (RUST_LOG takes precedence)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Settings file (defaults to <config dir>/opsmenu/settings.toml)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Local root for Sftp/sync
    #[arg(long, global = true)]
    pub local_dir: Option<String>,

    /// Remote root for Sftp/sync
    #[arg(long, global = true)]
    pub remote_dir: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Walk the menu interactively (default)
    Menu,
    /// Run menu leaves unattended
    Batch {
        /// Comma-separated leaf paths, e.g. "Sftp/sync,Sftp/cat"
        #[arg(short, long)]
        paths: Option<String>,
    },
}

impl Cli {
    pub fn selected_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Menu)
    }
}
