// Yak governance deployment CLI
//
// Runs the deployment pipeline against a network and inspects its results.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use log::info;

use yak_deploy::config::{ConfigManager, DeployConfig};
use yak_deploy::ethereum::chain::{NetworkConfig, NetworkRegistry};
use yak_deploy::report::{fetch_grantee_balances, ReportFormat, ReportFormatter};
use yak_deploy::{default_registry, DeployContext, Runner};

/// Deploys and configures the YAK governance contracts
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// JSON configuration file used instead of environment variables
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the deployment pipeline
    Deploy {
        /// Target network
        #[clap(long, short)]
        network: Option<String>,

        /// Only run steps with these tags and their dependencies
        #[clap(long, short, value_delimiter = ',')]
        tags: Vec<String>,
    },

    /// Print the execution order without connecting to a node
    Plan {
        #[clap(long, short, value_delimiter = ',')]
        tags: Vec<String>,
    },

    /// Report grant and token balances of every grantee
    Balances {
        #[clap(long, short)]
        network: Option<String>,

        /// Output format
        #[clap(long, short, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,

        /// Output file (optional)
        #[clap(long, short)]
        output: Option<PathBuf>,
    },

    /// Print the resolved configuration, without private keys
    Config {
        #[clap(long, short)]
        network: Option<String>,

        /// Save to a file instead of printing
        #[clap(long, short)]
        output: Option<PathBuf>,
    },

    /// List known networks
    Networks,
}

fn load_config(file: Option<&PathBuf>, network: Option<&String>) -> Result<DeployConfig> {
    let mut config = match file {
        Some(path) => {
            let mut config = ConfigManager::load_from_file(path)
                .with_context(|| format!("Failed to load configuration from {:?}", path))?;
            // Keys are never stored in configuration files
            config.private_keys = ["DEPLOYER_PRIVATE_KEY", "TOKEN_DEPLOYER_PRIVATE_KEY"]
                .iter()
                .filter_map(|key| std::env::var(key).ok())
                .filter(|value| !value.is_empty())
                .collect();
            config
        }
        None => {
            let mut vars: HashMap<String, String> = std::env::vars().collect();
            if let Some(network) = network {
                vars.insert("NETWORK".to_string(), network.clone());
            }
            ConfigManager::load_from_vars(&vars).context("Failed to load configuration")?
        }
    };
    if let Some(network) = network {
        config.network = network.clone();
    }
    Ok(config)
}

fn network_line(network: &NetworkConfig) -> String {
    format!(
        "{:<10} chain {:<6} {:<5} {}",
        network.name,
        network.chain_id,
        network.currency_symbol,
        if network.live { "live" } else { "local" }
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Deploy { network, tags } => {
            let config = load_config(cli.config.as_ref(), network.as_ref())?;
            let runner = Runner::new(default_registry()?);
            // Reject bad plans before connecting
            runner.registry().plan(&tags)?;

            let mut ctx = DeployContext::connect(config)
                .await
                .context("Failed to connect to network")?;
            let report = runner
                .run(&mut ctx, &tags)
                .await
                .context("Deployment failed")?;
            println!("{}", ReportFormatter::run_summary(&report));
        }
        Commands::Plan { tags } => {
            let registry = default_registry()?;
            for (position, step) in registry.plan(&tags)?.into_iter().enumerate() {
                println!(
                    "{:>2}. {:<26} tags: {:<28} after: {}",
                    position + 1,
                    step.id(),
                    step.tags().join(", "),
                    step.dependencies().join(", ")
                );
            }
        }
        Commands::Balances {
            network,
            format,
            output,
        } => {
            let config = load_config(cli.config.as_ref(), network.as_ref())?;
            let ctx = DeployContext::connect(config)
                .await
                .context("Failed to connect to network")?;
            let report = fetch_grantee_balances(&ctx)
                .await
                .context("Failed to read grantee balances")?;
            match output {
                Some(path) => {
                    ReportFormatter::save_to_file(&report, &path, format)
                        .context("Failed to save report")?;
                    info!("Report saved to {:?}", path);
                }
                None => println!("{}", ReportFormatter::format(&report, format)?),
            }
        }
        Commands::Config { network, output } => {
            let config = load_config(cli.config.as_ref(), network.as_ref())?;
            match output {
                Some(path) => {
                    ConfigManager::save_to_file(&config, &path)
                        .context("Failed to save configuration")?;
                    info!("Configuration saved to {:?}", path);
                }
                None => println!("{}", serde_json::to_string_pretty(&config)?),
            }
        }
        Commands::Networks => {
            let registry = NetworkRegistry::new();
            for name in registry.names() {
                if let Some(network) = registry.get(name) {
                    println!("{}", network_line(network));
                }
            }
        }
    }

    Ok(())
}
