use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "das-indexer",
    author,
    version,
    about = "Project DAS account transactions into relational rows"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Node RPC URL (default: DAS_RPC_URL, then the network default)
    #[arg(long, global = true)]
    pub rpc_url: Option<String>,

    /// mainnet or testnet
    #[arg(long, global = true)]
    pub network: Option<String>,

    /// JSON config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON (also DAS_LOG_JSON=1)
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Transactions handled concurrently
    #[arg(long, global = true)]
    pub concurrency: Option<usize>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fetch a transaction, run its action handler and print the resulting rows
    ParseTx {
        /// Transaction hash (0x...)
        hash: String,

        /// Override the action decoded from the action witness
        #[arg(long)]
        action: Option<String>,
    },

    /// Print the action a transaction declares
    Classify {
        /// Transaction hash (0x...)
        hash: String,
    },
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Commands::ParseTx { .. } => "parse-tx",
            Commands::Classify { .. } => "classify",
        }
    }
}
