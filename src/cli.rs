use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command Line Interface definition for the meowmail-dev binary.
#[derive(Parser, Debug)]
#[clap(author, version, about = "MeowMail frontend dev server")]
pub struct Cli {
    /// Frontend project root; `src/` and `dist/` live under it
    #[clap(long, default_value = ".")]
    pub root: PathBuf,

    /// Log level: trace, debug, info, warn, error
    #[clap(long, default_value = "info")]
    pub log_level: String,

    /// Enable timestamp in logs
    #[clap(long)]
    pub log_timestamp: bool,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the built frontend and proxy backend traffic (port comes from $PORT, default 3000)
    Serve {
        /// Host IP address to bind the server to
        #[clap(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory with the built assets (defaults to <root>/dist)
        #[clap(long)]
        static_dir: Option<PathBuf>,
    },

    /// Print the resolved configuration as JSON
    Config,

    /// Resolve an aliased import specifier (e.g. @/components/Inbox.vue)
    Resolve {
        specifier: String,
    },
}
