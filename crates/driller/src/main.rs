//! chaindriller - transaction load generator entry point

use anyhow::{Context, Result};
use clap::Parser;
use config::{ConfigLoader, ConfigOverrides, LoggingConfig};
use std::env;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;

use app::Application;

#[derive(Parser, Debug)]
#[command(name = "chaindriller", author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (defaults to ./chaindriller.yaml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Chain ID the transactions are signed for
    #[arg(long)]
    chain: Option<u64>,

    /// HTTP JSON-RPC endpoint of the node
    #[arg(long)]
    endpoint: Option<String>,

    /// Maximum number of concurrent sends, 0 sends everything at once
    #[arg(long)]
    routines: Option<usize>,

    /// Number of transactions to prepare and send
    #[arg(short = 'n', long)]
    transactions: Option<usize>,

    /// Write an example configuration file to this path and exit
    #[arg(long, value_name = "PATH")]
    create_example: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            chain_id: self.chain,
            rpc_url: self.endpoint.clone(),
            concurrency: self.routines,
            transactions: self.transactions,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(ref path) = args.create_example {
        ConfigLoader::create_example(path)
            .with_context(|| format!("Failed to create example config at {}", path.display()))?;
        println!("Example configuration written to {}", path.display());
        return Ok(());
    }

    // Load .env file if it exists
    let dotenv_result = dotenv::dotenv();

    let config = ConfigLoader::load_with(args.config.as_deref(), &args.overrides())
        .context("Failed to load configuration")?;

    init_logging(&config.logging)?;

    match dotenv_result {
        Ok(path) => info!("Loaded environment variables from {}", path.display()),
        Err(e) if !e.not_found() => warn!("Could not load .env file: {}", e),
        Err(_) => {}
    }

    info!("Starting chaindriller v{}", env!("CARGO_PKG_VERSION"));
    info!(
        endpoint = %config.network.rpc_url,
        chain_id = config.network.chain_id,
        transactions = config.drill.transactions,
        concurrency = config.drill.concurrency,
        "Configuration loaded"
    );

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("Interrupt received, waiting for in-flight sends");
                trigger.cancel();
            }
            Err(e) => warn!("Could not install CTRL+C handler: {}", e),
        }
    });

    let mut app = Application::new(config)
        .await
        .context("Failed to create application")?;

    app.run(cancel).await
}

/// Initialize logging from the configuration, `RUST_LOG` and `LOG_FORMAT` win
fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| logging.format.clone());

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

    let registry = tracing_subscriber::registry().with(env_filter);

    match log_format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()
                .context("Failed to initialize JSON logging")?;
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .try_init()
                .context("Failed to initialize pretty logging")?;
        }
    }

    if logging.level == "trace" || logging.level == "debug" {
        warn!("Debug/trace logging enabled - may slow down dispatch");
    }

    Ok(())
}
