use clap::{Parser, Subcommand};

use crate::commands;

#[derive(Parser)]
#[command(name = "moverboard")]
#[command(about = "NSE watchlist movers dashboard", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Poll the watchlist and render the movers board
    Watch {
        /// Run a single cycle and exit
        #[arg(long)]
        once: bool,

        /// Fixed poll interval in seconds (overrides the market-hours cadence)
        #[arg(short, long)]
        interval: Option<u64>,
    },
    /// Show ledger and configuration status
    Status,
    /// Show or refresh the cached instrument directory
    Instruments {
        /// Refetch the exchange dump from the API
        #[arg(long)]
        refresh: bool,
    },
}

pub fn run() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Watch { once, interval } => {
            commands::watch::run(once, interval);
        }
        Commands::Status => {
            commands::status::run();
        }
        Commands::Instruments { refresh } => {
            commands::instruments::run(refresh);
        }
    }
}
