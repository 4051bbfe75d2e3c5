pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::ItemFilter;

#[derive(Parser)]
#[command(name = "feedloop")]
#[command(about = "Feed and podcast sync with listening progress", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.config/feedloop/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Subscribe to a feed
    Subscribe {
        /// Feed URL; "https://" is assumed when missing
        url: String,
    },
    /// Unsubscribe from a feed
    Unsubscribe {
        /// Source id as shown by `sources`
        id: String,
    },
    /// List subscriptions
    Sources,
    /// Load items from a JSON file into the local catalog
    Import {
        /// Path to a JSON array of items
        path: PathBuf,
    },
    /// Fetch the latest items
    Refresh {
        /// Ignore the refresh interval
        #[arg(long)]
        force: bool,

        /// Show new items right away instead of just reporting them
        #[arg(long)]
        latest: bool,
    },
    /// List items
    List {
        /// all, continue, unlistened, queue, or a source id
        #[arg(short, long, default_value = "all")]
        filter: ItemFilter,

        /// Number of pages to load
        #[arg(long, default_value_t = 1)]
        pages: usize,
    },
    /// Save listening progress for an episode
    Progress {
        /// Episode key as shown by `list`
        key: String,
        /// Position in seconds
        secs: f64,
    },
    /// Mark an episode as finished
    Finish {
        /// Episode key as shown by `list`
        key: String,
    },
    /// Toggle an episode between finished and unplayed
    Toggle {
        /// Episode key as shown by `list`
        key: String,
    },
    /// Keep refreshing in the foreground until Ctrl-C
    Watch {
        /// Refresh interval (e.g., "30s", "5m", "1h")
        #[arg(short, long)]
        interval: Option<String>,
    },
}
