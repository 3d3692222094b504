//! CLI argument parsing for taskboard.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "tb",
    about = "A lane-ordered task board",
    version = env!("GIT_DESCRIBE"),
    after_help = "Logs are written to: ~/.local/share/taskboard/logs/taskboard.log"
)]
pub struct Cli {
    /// Path to the board directory (default: current directory)
    #[arg(short = 'd', long, global = true)]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Initialize a new board in the current directory
    Init,

    /// Add a task to the end of a lane
    Add {
        /// Task title
        title: String,

        /// Description
        #[arg(short = 'D', long, default_value = "")]
        description: String,

        /// Lane (default: first configured lane)
        #[arg(short, long)]
        status: Option<String>,
    },

    /// Remove a task
    Rm {
        /// Task ID
        id: u64,
    },

    /// Move a task within or across lanes
    Mv {
        /// Task ID
        id: u64,

        /// Destination lane (default: the task's current lane)
        #[arg(short, long)]
        to: Option<String>,

        /// Place the task in front of this task
        #[arg(short, long)]
        before: Option<u64>,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New description
        #[arg(long)]
        description: Option<String>,
    },

    /// Get a task by ID
    Get {
        /// Task ID
        id: u64,
    },

    /// List tasks
    List {
        /// Only this lane, sorted by position
        #[arg(short, long)]
        lane: Option<String>,
    },

    /// Show every lane as a column
    Board,

    /// Run the daemon in foreground
    Daemon,

    /// Stop the running daemon
    DaemonStop,

    /// Check daemon status
    DaemonStatus,
}
