use std::path::PathBuf;
use std::sync::Arc;

use alloy::primitives::Address;
use clap::{Parser, Subcommand};
use rand::Rng;
use serde_json::json;

use multichain_verify::backend::{
    CompletionReporter, EligibilityCheck, EligibilityClient, FlowPreparationClient, HttpBackend,
    PresaleBackend,
};
use multichain_verify::config::{load_config, FlowConfig};
use multichain_verify::networks::NetworkRegistry;
use multichain_verify::observability::logging::init_logging;
use multichain_verify::orchestrator::SignatureOrchestrator;
use multichain_verify::resilience::RetryPolicy;
use multichain_verify::session::format_address;

#[derive(Parser)]
#[command(name = "flow-cli")]
#[command(about = "Inspect wallet eligibility and signature messages against a backend", long_about = None)]
struct Cli {
    /// Path to a TOML config file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the configured networks in confirmation order
    Networks,
    /// Ask the backend whether a wallet is eligible
    Check {
        #[arg(short, long)]
        address: String,
    },
    /// Fetch the prepared per-network operations for a wallet
    Prepare {
        #[arg(short, long)]
        address: String,
    },
    /// Print the message a wallet would be asked to sign
    Message {
        #[arg(short, long)]
        address: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => FlowConfig::default(),
    };
    init_logging(&config.observability);

    let registry = Arc::new(NetworkRegistry::from_config(&config.networks)?);

    match cli.command {
        Commands::Networks => {
            let networks: Vec<_> = registry
                .iter()
                .map(|n| {
                    json!({
                        "id": n.id,
                        "name": n.name,
                        "symbol": n.symbol,
                        "explorer_url": n.explorer_url,
                        "contract_address": n.contract_address,
                    })
                })
                .collect();
            print_json(&json!(networks))?;
        }
        Commands::Check { address } => {
            let address: Address = address.parse()?;
            let backend: Arc<dyn PresaleBackend> = Arc::new(HttpBackend::new(&config.backend)?);
            let client = EligibilityClient::new(backend, registry.clone(), &config.program);
            match client.check_eligibility(address).await? {
                EligibilityCheck::Completed(result) => {
                    let balances: Vec<_> = result
                        .per_network_balances
                        .iter()
                        .map(|(id, balance)| {
                            json!({
                                "network": registry.get(*id).map(|n| n.name.as_str()),
                                "amount": balance.amount,
                                "symbol": balance.symbol,
                                "value_usd": balance.value_usd,
                            })
                        })
                        .collect();
                    print_json(&json!({
                        "wallet": format_address(&result.address),
                        "eligible": result.is_eligible,
                        "allocation": result.allocation,
                        "total_value_usd": result.total_value_usd(),
                        "balances": balances,
                    }))?;
                }
                EligibilityCheck::AlreadyInFlight => {
                    eprintln!("A check for {} is already running", address);
                }
            }
        }
        Commands::Prepare { address } => {
            let address: Address = address.parse()?;
            let backend: Arc<dyn PresaleBackend> = Arc::new(HttpBackend::new(&config.backend)?);
            let transactions = FlowPreparationClient::new(backend).prepare_flow(address).await?;
            print_json(&serde_json::to_value(transactions)?)?;
        }
        Commands::Message { address } => {
            let address: Address = address.parse()?;
            let backend: Arc<dyn PresaleBackend> = Arc::new(HttpBackend::new(&config.backend)?);
            let reporter = CompletionReporter::new(backend, RetryPolicy::none());
            let orchestrator = SignatureOrchestrator::new(registry, reporter, &config);
            let nonce: u64 = rand::thread_rng().gen();
            println!(
                "{}",
                orchestrator.preview_message(&address, jiff::Timestamp::now(), nonce)
            );
        }
    }

    Ok(())
}

fn print_json(value: &serde_json::Value) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
