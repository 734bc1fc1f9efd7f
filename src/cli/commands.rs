//! CLI commands for the wallet platform
//!
//! Implements all command handlers for the CLI interface.

use crate::factory::{DeployProfile, WalletFactory};
use crate::storage::{Storage, StorageConfig};
use crate::wallet::{CallOutcome, CallTarget, GovernanceOp, OwnerSpec};
use std::path::{Path, PathBuf};

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Application state
pub struct AppState {
    pub factory: WalletFactory,
    pub storage: Storage,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize application state
    pub fn new(data_dir: PathBuf) -> CliResult<Self> {
        let storage_config = StorageConfig {
            data_dir: data_dir.clone(),
            ..Default::default()
        };
        let storage = Storage::new(storage_config)?;

        // Load or create the factory registry
        let factory = if storage.exists() {
            println!("📂 Loading existing wallet registry...");
            storage.load()?
        } else {
            println!("🆕 Creating new wallet registry...");
            let factory = WalletFactory::new();
            storage.save(&factory)?;
            factory
        };

        Ok(Self {
            factory,
            storage,
            data_dir,
        })
    }

    /// Save the current state
    pub fn save(&self) -> CliResult<()> {
        self.storage.save(&self.factory)?;
        Ok(())
    }
}

/// External-call target for CLI sessions
///
/// The real platform wires the licensing registry and payment
/// pass-through here; from the terminal we log the outbound call and
/// report success.
pub struct ConsoleCallTarget;

impl CallTarget for ConsoleCallTarget {
    fn call(&mut self, to: &str, value: u64, payload: &[u8]) -> CallOutcome {
        println!(
            "📡 External call → {} (value: {}, payload: {} bytes)",
            to,
            value,
            payload.len()
        );
        CallOutcome::ok(Vec::new())
    }
}

/// Parse comma-separated owner specs: `addr` or `addr:role:device`
pub fn parse_owner_specs(input: &str) -> Vec<OwnerSpec> {
    input
        .split(',')
        .map(|entry| {
            let mut parts = entry.trim().splitn(3, ':');
            let address = parts.next().unwrap_or_default();
            match (parts.next(), parts.next()) {
                (Some(role), Some(device)) => OwnerSpec::with_metadata(address, role, device),
                _ => OwnerSpec::new(address),
            }
        })
        .collect()
}

fn parse_responders(input: Option<&str>) -> Vec<String> {
    input
        .map(|s| s.split(',').map(|r| r.trim().to_string()).collect())
        .unwrap_or_default()
}

fn generated_salt() -> String {
    hex::encode(rand::random::<[u8; 16]>())
}

/// Initialize an empty wallet registry
pub fn cmd_init(data_dir: &Path) -> CliResult<()> {
    let storage_config = StorageConfig {
        data_dir: data_dir.to_path_buf(),
        ..Default::default()
    };
    let storage = Storage::new(storage_config)?;

    if storage.exists() {
        println!("⚠️  Wallet registry already exists at {:?}", data_dir);
        return Ok(());
    }

    storage.save(&WalletFactory::new())?;

    println!("✅ Wallet registry initialized!");
    println!("   📁 Data directory: {:?}", data_dir);
    Ok(())
}

/// Predict a wallet address without deploying
pub fn cmd_predict(owners: &str, threshold: u8, salt: &str) -> CliResult<()> {
    let specs = parse_owner_specs(owners);
    let address = WalletFactory::predict_address(&specs, threshold, salt);

    println!("🔮 Predicted wallet address");
    println!("   📍 Address: {}", address);
    println!("   👥 Owners: {}", specs.len());
    println!("   🔢 Threshold: {}-of-{}", threshold, specs.len());
    println!("   🧂 Salt: {}", salt);
    Ok(())
}

/// Deploy a new wallet
#[allow(clippy::too_many_arguments)]
pub fn cmd_deploy(
    state: &mut AppState,
    owners: &str,
    threshold: Option<u8>,
    salt: Option<&str>,
    time_lock_secs: Option<u64>,
    responders: Option<&str>,
    profile: Option<&str>,
) -> CliResult<()> {
    let specs = parse_owner_specs(owners);
    let responders = parse_responders(responders);
    let salt = salt.map(str::to_string).unwrap_or_else(generated_salt);

    let address = match profile {
        Some(name) => {
            let profile = match name {
                "testnet" => DeployProfile::testnet(),
                "production" => DeployProfile::production(),
                other => return Err(format!("unknown profile: {}", other).into()),
            };
            state
                .factory
                .deploy_with_profile(&specs, &salt, &profile, responders)?
        }
        None => {
            let threshold = threshold.ok_or("either --profile or --threshold is required")?;
            state.factory.deploy(
                &specs,
                threshold,
                &salt,
                time_lock_secs.unwrap_or(0),
                responders,
            )?
        }
    };

    state.save()?;

    let wallet = state.factory.wallet(&address).expect("just deployed");
    println!("✅ Wallet deployed!");
    println!("   📍 Address: {}", address);
    println!(
        "   🔢 Threshold: {}-of-{}",
        wallet.threshold(),
        wallet.get_owners().len()
    );
    println!("   ⏳ Time-lock: {}s", wallet.time_lock_secs());
    println!("   🧂 Salt: {}", salt);
    Ok(())
}

/// List all deployed wallets
pub fn cmd_list(state: &AppState) -> CliResult<()> {
    let deployed = state.factory.list_deployed();
    if deployed.is_empty() {
        println!("📭 No wallets deployed yet. Deploy one with: crawlpay deploy");
        return Ok(());
    }

    println!("📋 Deployed wallets ({}):", deployed.len());
    for address in deployed {
        let wallet = state.factory.wallet(address).expect("indexed wallet");
        println!(
            "   {} ({}-of-{}, {} pending)",
            address,
            wallet.threshold(),
            wallet.get_owners().len(),
            wallet.pending_transactions().len()
        );
    }
    Ok(())
}

/// Show a wallet's configuration, owners, and pending transactions
pub fn cmd_show(state: &AppState, address: &str) -> CliResult<()> {
    let wallet = state
        .factory
        .wallet(address)
        .ok_or_else(|| format!("wallet not found: {}", address))?;

    println!("🔐 Wallet {}", address);
    println!(
        "   🔢 Threshold: {}-of-{}",
        wallet.threshold(),
        wallet.get_owners().len()
    );
    println!("   ⏳ Time-lock: {}s", wallet.time_lock_secs());
    if !wallet.emergency_responders().is_empty() {
        println!("   🚨 Responders: {}", wallet.emergency_responders().join(", "));
    }

    println!("\n   👥 Owners:");
    for owner in wallet.owner_registry().iter() {
        let status = if owner.is_active { "active" } else { "removed" };
        let role = if owner.role.is_empty() { "-" } else { &owner.role };
        println!(
            "   ├─ {} [{}] role: {}, last active: {}",
            owner.address, status, role, owner.last_activity_at
        );
    }

    let pending = wallet.pending_transactions();
    if pending.is_empty() {
        println!("\n   📭 No pending transactions");
    } else {
        println!("\n   📨 Pending transactions:");
        for tx in pending {
            println!(
                "   ├─ #{} → {} (value: {}, {}/{} confirmations{})",
                tx.id,
                tx.to,
                tx.value,
                tx.confirmation_count(),
                wallet.threshold(),
                if tx.is_emergency { ", emergency" } else { "" }
            );
        }
    }

    if let Some(record) = state.factory.record(address) {
        println!("\n   🧾 Deployed at: {}", record.deployed_at);
        println!("   #️⃣  Config hash: {}", &record.config_hash[..16]);
    }
    Ok(())
}

/// Show a wallet's event journal
pub fn cmd_history(state: &AppState, address: &str) -> CliResult<()> {
    let wallet = state
        .factory
        .wallet(address)
        .ok_or_else(|| format!("wallet not found: {}", address))?;

    if wallet.events().is_empty() {
        println!("📭 No events recorded for {}", address);
        return Ok(());
    }

    println!("📜 Events for {}:", address);
    for event in wallet.events() {
        println!("   {}", serde_json::to_string(event)?);
    }
    Ok(())
}

/// Submit a new transaction
#[allow(clippy::too_many_arguments)]
pub fn cmd_submit(
    state: &mut AppState,
    address: &str,
    caller: &str,
    to: &str,
    value: u64,
    payload_hex: Option<&str>,
    description: &str,
    emergency: bool,
) -> CliResult<()> {
    let payload = match payload_hex {
        Some(h) => hex::decode(h)?,
        None => Vec::new(),
    };

    let wallet = state
        .factory
        .wallet_mut(address)
        .ok_or_else(|| format!("wallet not found: {}", address))?;

    let mut target = ConsoleCallTarget;
    let id = wallet.submit(caller, to, value, payload, description, emergency, &mut target)?;
    report_transaction(state, address, id);
    state.save()?;
    Ok(())
}

/// Confirm a pending transaction
pub fn cmd_confirm(state: &mut AppState, address: &str, caller: &str, tx_id: u64) -> CliResult<()> {
    let wallet = state
        .factory
        .wallet_mut(address)
        .ok_or_else(|| format!("wallet not found: {}", address))?;

    let mut target = ConsoleCallTarget;
    wallet.confirm(caller, tx_id, &mut target)?;
    report_transaction(state, address, tx_id);
    state.save()?;
    Ok(())
}

/// Revoke a confirmation
pub fn cmd_revoke(state: &mut AppState, address: &str, caller: &str, tx_id: u64) -> CliResult<()> {
    let wallet = state
        .factory
        .wallet_mut(address)
        .ok_or_else(|| format!("wallet not found: {}", address))?;

    wallet.revoke_confirmation(caller, tx_id)?;
    println!("↩️  Confirmation of transaction #{} revoked by {}", tx_id, caller);
    report_transaction(state, address, tx_id);
    state.save()?;
    Ok(())
}

/// Retry execution of a time-locked transaction
pub fn cmd_execute(state: &mut AppState, address: &str, caller: &str, tx_id: u64) -> CliResult<()> {
    let wallet = state
        .factory
        .wallet_mut(address)
        .ok_or_else(|| format!("wallet not found: {}", address))?;

    let mut target = ConsoleCallTarget;
    wallet.execute_transaction(caller, tx_id, &mut target)?;
    report_transaction(state, address, tx_id);
    state.save()?;
    Ok(())
}

/// Propose adding an owner (self-targeted governance transaction)
pub fn cmd_add_owner(
    state: &mut AppState,
    address: &str,
    caller: &str,
    new_owner: &str,
    role: &str,
    device_class: &str,
) -> CliResult<()> {
    let op = GovernanceOp::AddOwner {
        address: new_owner.to_string(),
        role: role.to_string(),
        device_class: device_class.to_string(),
    };
    submit_governance(state, address, caller, op, &format!("Add owner {}", new_owner))
}

/// Propose removing an owner (self-targeted governance transaction)
pub fn cmd_remove_owner(
    state: &mut AppState,
    address: &str,
    caller: &str,
    owner: &str,
) -> CliResult<()> {
    let op = GovernanceOp::RemoveOwner {
        address: owner.to_string(),
    };
    submit_governance(state, address, caller, op, &format!("Remove owner {}", owner))
}

fn submit_governance(
    state: &mut AppState,
    address: &str,
    caller: &str,
    op: GovernanceOp,
    description: &str,
) -> CliResult<()> {
    let payload = op.encode()?;
    let wallet = state
        .factory
        .wallet_mut(address)
        .ok_or_else(|| format!("wallet not found: {}", address))?;

    let mut target = ConsoleCallTarget;
    let self_address = wallet.address().to_string();
    let id = wallet.submit(caller, &self_address, 0, payload, description, false, &mut target)?;

    println!("🗳️  Governance proposal submitted: {}", description);
    report_transaction(state, address, id);
    state.save()?;
    Ok(())
}

fn report_transaction(state: &AppState, address: &str, tx_id: u64) {
    let Some(wallet) = state.factory.wallet(address) else {
        return;
    };
    let Some(tx) = wallet.get_transaction(tx_id) else {
        return;
    };

    if tx.executed {
        let result = match &tx.outcome {
            Some(outcome) if outcome.success => "call succeeded",
            Some(_) => "call failed",
            None => "no outcome recorded",
        };
        println!("✅ Transaction #{} executed ({})", tx_id, result);
    } else {
        println!(
            "⏳ Transaction #{} pending: {}/{} confirmations",
            tx_id,
            tx.confirmation_count(),
            wallet.threshold()
        );
        if let Some(eligible) = tx.eligible_at(wallet.time_lock_secs()) {
            println!("   Eligible for execution at {}", eligible);
        }
    }
}
