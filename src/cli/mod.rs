use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "carbontrack",
    about = "Personal carbon footprint tracker and analysis engine"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the local API server
    Serve,
    /// Log one activity and print its CO2 estimate
    Add {
        #[arg(long = "type")]
        activity_type: String,
        #[arg(long)]
        value: f64,
        #[arg(long)]
        unit: String,
        #[arg(long)]
        owner: Option<String>,
    },
    /// List recent entries
    Entries {
        #[arg(long, default_value_t = 7)]
        days: u32,
        #[arg(long)]
        owner: Option<String>,
    },
    /// Print per-day totals for the window
    Totals {
        #[arg(long, default_value_t = 7)]
        days: u32,
        #[arg(long)]
        owner: Option<String>,
    },
    /// Run a full analysis and print the payload
    Analyze {
        #[arg(long)]
        owner: Option<String>,
    },
    /// Print stored analysis snapshots, newest first
    History {
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[arg(long)]
        owner: Option<String>,
    },
    /// Show config and database summary
    Status,
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    Set { key: String, value: String },
    Get { key: String },
}
