//! das-indexer: project DAS account transactions into relational rows.
//!
//! - **parse-tx**: fetch a transaction and its header, run the handler for its
//!   action against an in-memory store and print the rows as JSON
//! - **classify**: print the action a transaction declares

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::info;

use das_indexer::block_parser::{BlockParser, HandleRequest, ParseContext};
use das_indexer::config::IndexerConfig;
use das_indexer::dao::MemoryDao;
use das_indexer::logging::init_tracing;
use das_state_fetcher::{ChainClient, HistoricalStateProvider};
use das_transport::CkbRpcClient;
use das_types::{env_bool, H256};

mod args;

use args::{Cli, Commands};

fn build_config(cli: &Cli) -> Result<IndexerConfig> {
    let mut config = match &cli.config {
        Some(path) => IndexerConfig::load(path)?,
        None => IndexerConfig::default(),
    };
    config.apply_env();
    if let Some(url) = &cli.rpc_url {
        config.rpc_url = url.clone();
    }
    if let Some(network) = &cli.network {
        config.network = network.clone();
    }
    if let Some(n) = cli.concurrency {
        config.parser_concurrency = n;
    }
    Ok(config)
}

fn parse_hash(hash: &str) -> Result<H256> {
    hash.parse::<H256>()
        .with_context(|| format!("invalid transaction hash {}", hash))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.log_json || env_bool("DAS_LOG_JSON"))?;

    let config = build_config(&cli)?;
    let endpoint = config.rpc_endpoint();
    info!(
        command = cli.command.name(),
        endpoint = %endpoint,
        network = %config.effective_network(),
        "starting"
    );

    let rpc = CkbRpcClient::new(&endpoint).with_retry(config.retry);
    let client: Arc<dyn ChainClient> = Arc::new(rpc);

    match cli.command {
        Commands::Classify { hash } => {
            let hash = parse_hash(&hash)?;
            let fetched = client
                .get_transaction(&hash)
                .await?
                .ok_or_else(|| anyhow!("transaction {} not found", hash))?;
            let action = BlockParser::classify(&fetched.view.inner)
                .with_context(|| format!("decode action of {}", hash))?;
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "tx_hash": hash,
                    "action": action.action,
                    "params": hex::encode(&action.params),
                }))?
            );
        }
        Commands::ParseTx { hash, action } => {
            let hash = parse_hash(&hash)?;
            let fetched = client
                .get_transaction(&hash)
                .await?
                .ok_or_else(|| anyhow!("transaction {} not found", hash))?;
            let block_hash = fetched
                .block_hash
                .ok_or_else(|| anyhow!("transaction {} is not committed yet", hash))?;
            let header = client
                .get_header(&block_hash)
                .await?
                .ok_or_else(|| anyhow!("header {} not found", block_hash))?;

            let action = match action {
                Some(action) => action,
                None => BlockParser::classify(&fetched.view.inner)
                    .with_context(|| format!("decode action of {}", hash))?
                    .action,
            };

            let ctx = ParseContext {
                registry: Arc::new(config.registry()?),
                lookup: Arc::new(HistoricalStateProvider::new(
                    client.clone(),
                    config.tx_cache_capacity,
                )),
            };
            let dao = Arc::new(MemoryDao::new());
            let parser = BlockParser::new(ctx, dao.clone(), config.parser_concurrency);

            let req = HandleRequest {
                tx: fetched.view.inner,
                tx_hash: hash,
                block_number: header.number,
                block_timestamp: header.timestamp,
                action,
            };
            let outcome = parser.handle(&req).await?;
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "tx_hash": hash,
                    "action": req.action,
                    "block_number": req.block_number,
                    "outcome": outcome,
                    "rows": dao.snapshot(),
                }))?
            );
        }
    }
    Ok(())
}
