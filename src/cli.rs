use clap::{Parser, Subcommand};

/// Homework Watch: relays homework review status changes to Telegram
#[derive(Parser)]
#[command(name = "homework-watch", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Poll the status endpoint until interrupted
    Run {
        /// Seconds between poll cycles
        #[arg(short, long, env = "HOMEWORK_RETRY_SECS", value_parser = clap::value_parser!(u64).range(1..))]
        interval: Option<u64>,
        /// Initial cursor as a unix timestamp (defaults to now)
        #[arg(long)]
        since: Option<i64>,
    },

    /// Run a single poll cycle and print its outcome
    Once {
        /// Cursor as a unix timestamp (defaults to now)
        #[arg(long)]
        since: Option<i64>,
    },

    /// List the status codes the monitor understands
    Statuses,
}
