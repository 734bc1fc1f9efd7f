//! CrawlPay Wallet CLI Application
//!
//! A command-line interface for deploying and operating threshold
//! multi-signature authorization wallets.

use clap::{Parser, Subcommand};
use crawlpay_wallet::cli::{self, AppState};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "crawlpay")]
#[command(version = "0.1.0")]
#[command(about = "Threshold multi-signature authorization wallets for pay-per-crawl", long_about = None)]
struct Cli {
    /// Data directory for wallet registry storage
    #[arg(short, long, default_value = ".crawlpay_data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize an empty wallet registry
    Init,

    /// Predict a wallet address without deploying
    Predict {
        /// Owners (comma-separated, `addr` or `addr:role:device`)
        #[arg(short, long)]
        owners: String,

        /// Confirmation threshold
        #[arg(short, long)]
        threshold: u8,

        /// Address-derivation salt
        #[arg(short, long)]
        salt: String,
    },

    /// Deploy a new wallet
    Deploy {
        /// Owners (comma-separated, `addr` or `addr:role:device`)
        #[arg(short, long)]
        owners: String,

        /// Confirmation threshold (required unless --profile is given)
        #[arg(short, long)]
        threshold: Option<u8>,

        /// Address-derivation salt (random if omitted)
        #[arg(short, long)]
        salt: Option<String>,

        /// Time-lock duration in seconds
        #[arg(long)]
        time_lock: Option<u64>,

        /// Emergency responders (comma-separated owner addresses)
        #[arg(long)]
        responders: Option<String>,

        /// Deployment preset: testnet or production
        #[arg(short, long)]
        profile: Option<String>,
    },

    /// List all deployed wallets
    List,

    /// Show a wallet's owners and pending transactions
    Show {
        /// Wallet address
        #[arg(short, long)]
        wallet: String,
    },

    /// Show a wallet's event journal
    History {
        /// Wallet address
        #[arg(short, long)]
        wallet: String,
    },

    /// Submit a transaction proposal
    Submit {
        /// Wallet address
        #[arg(short, long)]
        wallet: String,

        /// Submitting owner
        #[arg(short, long)]
        caller: String,

        /// Call target address
        #[arg(long)]
        to: String,

        /// Amount forwarded with the call
        #[arg(short, long, default_value = "0")]
        value: u64,

        /// Call payload (hex)
        #[arg(long)]
        payload: Option<String>,

        /// Description for the audit trail
        #[arg(long, default_value = "")]
        description: String,

        /// Request the emergency time-lock bypass
        #[arg(long)]
        emergency: bool,
    },

    /// Confirm a pending transaction
    Confirm {
        /// Wallet address
        #[arg(short, long)]
        wallet: String,

        /// Confirming owner
        #[arg(short, long)]
        caller: String,

        /// Transaction id
        #[arg(short, long)]
        tx_id: u64,
    },

    /// Revoke a confirmation from a pending transaction
    Revoke {
        /// Wallet address
        #[arg(short, long)]
        wallet: String,

        /// Revoking owner
        #[arg(short, long)]
        caller: String,

        /// Transaction id
        #[arg(short, long)]
        tx_id: u64,
    },

    /// Retry execution of a time-locked transaction
    Execute {
        /// Wallet address
        #[arg(short, long)]
        wallet: String,

        /// Executing owner
        #[arg(short, long)]
        caller: String,

        /// Transaction id
        #[arg(short, long)]
        tx_id: u64,
    },

    /// Propose adding an owner (routed through governance)
    AddOwner {
        /// Wallet address
        #[arg(short, long)]
        wallet: String,

        /// Proposing owner
        #[arg(short, long)]
        caller: String,

        /// Address of the owner to add
        #[arg(short, long)]
        address: String,

        /// Role label
        #[arg(long, default_value = "")]
        role: String,

        /// Device class label
        #[arg(long, default_value = "")]
        device_class: String,
    },

    /// Propose removing an owner (routed through governance)
    RemoveOwner {
        /// Wallet address
        #[arg(short, long)]
        wallet: String,

        /// Proposing owner
        #[arg(short, long)]
        caller: String,

        /// Address of the owner to remove
        #[arg(short, long)]
        address: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Commands that don't need loaded state
    match &cli.command {
        Commands::Init => return cli::cmd_init(&cli.data_dir),
        Commands::Predict {
            owners,
            threshold,
            salt,
        } => return cli::cmd_predict(owners, *threshold, salt),
        _ => {}
    }

    let mut state = AppState::new(cli.data_dir.clone())?;

    match cli.command {
        Commands::Init | Commands::Predict { .. } => unreachable!(),

        Commands::Deploy {
            owners,
            threshold,
            salt,
            time_lock,
            responders,
            profile,
        } => {
            cli::cmd_deploy(
                &mut state,
                &owners,
                threshold,
                salt.as_deref(),
                time_lock,
                responders.as_deref(),
                profile.as_deref(),
            )?;
        }

        Commands::List => {
            cli::cmd_list(&state)?;
        }

        Commands::Show { wallet } => {
            cli::cmd_show(&state, &wallet)?;
        }

        Commands::History { wallet } => {
            cli::cmd_history(&state, &wallet)?;
        }

        Commands::Submit {
            wallet,
            caller,
            to,
            value,
            payload,
            description,
            emergency,
        } => {
            cli::cmd_submit(
                &mut state,
                &wallet,
                &caller,
                &to,
                value,
                payload.as_deref(),
                &description,
                emergency,
            )?;
        }

        Commands::Confirm {
            wallet,
            caller,
            tx_id,
        } => {
            cli::cmd_confirm(&mut state, &wallet, &caller, tx_id)?;
        }

        Commands::Revoke {
            wallet,
            caller,
            tx_id,
        } => {
            cli::cmd_revoke(&mut state, &wallet, &caller, tx_id)?;
        }

        Commands::Execute {
            wallet,
            caller,
            tx_id,
        } => {
            cli::cmd_execute(&mut state, &wallet, &caller, tx_id)?;
        }

        Commands::AddOwner {
            wallet,
            caller,
            address,
            role,
            device_class,
        } => {
            cli::cmd_add_owner(&mut state, &wallet, &caller, &address, &role, &device_class)?;
        }

        Commands::RemoveOwner {
            wallet,
            caller,
            address,
        } => {
            cli::cmd_remove_owner(&mut state, &wallet, &caller, &address)?;
        }
    }

    Ok(())
}
