//! SnipeOnBelieve - sniper wallet and dashboard backend
//!
//! # WARNING
//! - Deposits and withdrawals move real SOL.
//! - The sniper wallet secret key lives in a local keystore file. Back it up.

use anyhow::Result;
use clap::{Parser, Subcommand};
use solana_sdk::signer::Signer;
use tracing::{error, info, warn};

use snipe_on_believe::cli::commands;
use snipe_on_believe::config::Config;
use snipe_on_believe::wallet::keystore::read_keypair;

/// SnipeOnBelieve dashboard backend
#[derive(Parser)]
#[command(name = "sob")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve,

    /// Show current configuration (secrets masked)
    Config,

    /// Browse the token catalogs
    Catalog {
        #[command(subcommand)]
        list: CatalogList,
    },

    /// Sniper wallet management
    Wallet {
        #[command(subcommand)]
        action: WalletAction,
    },
}

#[derive(Subcommand)]
enum CatalogList {
    /// Newly launched tokens
    Tokens,

    /// Tokens that completed their bonding curve
    Graduated,
}

#[derive(Subcommand)]
enum WalletAction {
    /// Create the sniper wallet
    Generate,

    /// Show the sniper wallet
    Status,

    /// Re-read the sniper wallet balance
    Refresh,

    /// Move SOL from the primary wallet into the sniper wallet
    Deposit {
        /// Amount in SOL
        amount: String,

        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },

    /// Move SOL from the sniper wallet back to the primary wallet
    Withdraw {
        /// Amount in SOL
        amount: String,

        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("snipe_on_believe=info".parse()?),
        )
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = startup_checks(&config) {
        error!("Startup checks failed: {}", e);
        std::process::exit(1);
    }

    let result = match cli.command {
        Commands::Serve => commands::serve(&config).await,
        Commands::Config => commands::show_config(&config),
        Commands::Catalog { list } => match list {
            CatalogList::Tokens => commands::catalog_tokens(),
            CatalogList::Graduated => commands::catalog_graduated(),
        },
        Commands::Wallet { action } => match action {
            WalletAction::Generate => commands::wallet_generate(&config).await,
            WalletAction::Status => commands::wallet_status(&config).await,
            WalletAction::Refresh => commands::wallet_refresh(&config).await,
            WalletAction::Deposit { amount, force } => {
                commands::wallet_deposit(&config, &amount, force).await
            }
            WalletAction::Withdraw { amount, force } => {
                commands::wallet_withdraw(&config, &amount, force).await
            }
        },
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Refuse to start with unreadable or world-readable key files
fn startup_checks(config: &Config) -> Result<()> {
    info!("Performing startup checks...");

    match &config.primary_wallet.keypair_path {
        Some(path) => {
            let keypair = read_keypair(std::path::Path::new(path))
                .map_err(|e| anyhow::anyhow!("{}", e))?;
            info!("Primary wallet keypair OK: {}", keypair.pubkey());
        }
        None => warn!("No primary wallet keypair configured (set KEYPAIR_PATH)"),
    }

    let keystore = config.keystore_path();
    if keystore.exists() {
        read_keypair(&keystore).map_err(|e| anyhow::anyhow!("Sniper keystore: {}", e))?;
        info!("Sniper keystore permissions OK");
    }

    info!("Startup checks passed");
    Ok(())
}
