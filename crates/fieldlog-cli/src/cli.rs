use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use fieldlog_core::models::ReferenceKind;

#[derive(Parser)]
#[command(name = "fieldlog")]
#[command(about = "Sync field logs with a farm server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the local state file
    #[arg(long, global = true, value_name = "PATH")]
    pub state: Option<PathBuf>,

    /// Farm server URL (overrides FIELDLOG_HOST)
    #[arg(long, global = true, value_name = "URL")]
    pub host: Option<String>,

    /// Session token (overrides FIELDLOG_TOKEN)
    #[arg(long, global = true, value_name = "TOKEN")]
    pub token: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pull server changes, then push pending local logs
    Sync,
    /// Pull server changes only
    Pull,
    /// Push pending local logs only
    Push {
        /// Re-queue logs whose last send failed before pushing
        #[arg(long)]
        retry_failed: bool,
    },
    /// Refresh reference data (all kinds when omitted)
    Refresh {
        #[arg(value_enum)]
        kind: Option<RefreshKind>,
    },
    /// List fields kept locally while the server disagreed
    Conflicts {
        /// Number of conflicts to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show local sync state
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum RefreshKind {
    Areas,
    Assets,
    Units,
    Categories,
    Equipment,
}

impl From<RefreshKind> for ReferenceKind {
    fn from(kind: RefreshKind) -> Self {
        match kind {
            RefreshKind::Areas => Self::Areas,
            RefreshKind::Assets => Self::Assets,
            RefreshKind::Units => Self::Units,
            RefreshKind::Categories => Self::Categories,
            RefreshKind::Equipment => Self::Equipment,
        }
    }
}
