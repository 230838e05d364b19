//! WalletCommand: typed client-cli invocations → argument vectors
//!
//! Every invocation has the shape
//! `client-cli <config> <mempool file> <wallet file> <subcommand> [args...]`.

use crate::core::paths::{files, subcommand};

/// The three file arguments that bind an invocation to one wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletFiles {
    pub config: String,
    pub mempool: String,
    pub wallet: String,
}

impl WalletFiles {
    pub fn for_wallet(config: impl Into<String>, wallet_id: u64) -> Self {
        Self { config: config.into(), mempool: files::mempool(wallet_id), wallet: files::wallet(wallet_id) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletCommand {
    NewAddress,
    Mint { utxos: u64, atomic_unit: u64 },
    Info,
    Send { amount: u64, address: String },
    ImportInput { token: String },
    Sync,
}

impl WalletCommand {
    pub fn name(&self) -> &'static str {
        match self {
            WalletCommand::NewAddress => subcommand::NEW_ADDRESS,
            WalletCommand::Mint { .. } => subcommand::MINT,
            WalletCommand::Info => subcommand::INFO,
            WalletCommand::Send { .. } => subcommand::SEND,
            WalletCommand::ImportInput { .. } => subcommand::IMPORT_INPUT,
            WalletCommand::Sync => subcommand::SYNC,
        }
    }

    /// Full argument vector for this command against `files`.
    pub fn args(&self, files: &WalletFiles) -> Vec<String> {
        let mut args = vec![files.config.clone(), files.mempool.clone(), files.wallet.clone(), self.name().to_string()];
        match self {
            WalletCommand::Mint { utxos, atomic_unit } => {
                args.push(utxos.to_string());
                args.push(atomic_unit.to_string());
            }
            WalletCommand::Send { amount, address } => {
                args.push(amount.to_string());
                args.push(address.clone());
            }
            WalletCommand::ImportInput { token } => args.push(token.clone()),
            WalletCommand::NewAddress | WalletCommand::Info | WalletCommand::Sync => {}
        }
        args
    }
}
