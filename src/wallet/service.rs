//! WalletService - one method per wallet action
//!
//! Every operation is resolve → build → execute → interpret: find the
//! registry record, build client-cli argv for that wallet's files, run it
//! through the [`CommandRunner`], then parse the output.

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::error::WalletError;
use super::locks::WalletLocks;
use super::steps::{StepChain, StepFailure};
use crate::config::ProxyConfig;
use crate::core::command::{WalletCommand, WalletFiles};
use crate::core::parse::{parse_address, parse_balance_info, parse_continuation_token, BalanceInfo};
use crate::core::paths::files;
use crate::process::{CliRunner, CommandRunner, ProcessError};
use crate::registry::{highest_artifact_id, WalletRecord, WalletRegistry};

pub struct WalletService {
    runner: Arc<dyn CommandRunner>,
    registry: WalletRegistry,
    cli_config: String,
    work_dir: Option<PathBuf>,
    locks: WalletLocks,
    create: Mutex<()>,
}

impl WalletService {
    pub fn new(runner: Arc<dyn CommandRunner>, registry: WalletRegistry) -> Self {
        Self {
            runner,
            registry,
            cli_config: files::CLI_CONFIG.into(),
            work_dir: None,
            locks: WalletLocks::new(),
            create: Mutex::new(()),
        }
    }

    pub fn with_cli_config(mut self, name: impl Into<String>) -> Self { self.cli_config = name.into(); self }
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self { self.work_dir = Some(dir.into()); self }

    pub fn from_config(config: &ProxyConfig) -> Self {
        let runner = CliRunner::new(&config.cli_path)
            .with_work_dir(&config.work_dir)
            .with_timeout(config.command_timeout);
        Self::new(Arc::new(runner), WalletRegistry::open(config.registry_path()))
            .with_cli_config(&config.cli_config)
            .with_work_dir(&config.work_dir)
    }

    pub fn registry(&self) -> &WalletRegistry { &self.registry }

    /// Allocate an id, ask client-cli for a fresh address, register it.
    /// Nothing is persisted unless every step succeeds.
    pub async fn create_wallet(&self) -> Result<WalletRecord, WalletError> {
        let _create = self.create.lock().await;
        let attempt: Result<WalletRecord, WalletError> = async {
            let wallet_id = self.registry.allocate_next_identifier().await?;
            let _wallet = self.locks.acquire(wallet_id).await;
            let output = self.exec(wallet_id, WalletCommand::NewAddress).await?;
            let address = parse_address(&output)?;
            Ok(self.registry.register(wallet_id, &address, None).await?)
        }
        .await;
        attempt.map_err(|e| {
            tracing::error!(error = %e, "wallet creation failed");
            WalletError::WalletCreationFailed(Box::new(e))
        })
    }

    pub async fn get_wallet(&self, wallet_id: &str) -> Result<WalletRecord, WalletError> {
        self.resolve_id(wallet_id).await
    }

    pub async fn list_wallets(&self) -> Result<Vec<WalletRecord>, WalletError> {
        Ok(self.registry.all().await?)
    }

    pub async fn mint(&self, wallet_id: &str, utxos: u64, atomic_unit: u64) -> Result<String, WalletError> {
        let record = self.resolve_id(wallet_id).await?;
        let _wallet = self.locks.acquire(record.wallet_id).await;
        Ok(self.exec(record.wallet_id, WalletCommand::Mint { utxos, atomic_unit }).await?)
    }

    /// `key` is a walletID or a registered address.
    pub async fn balance(&self, key: &str) -> Result<BalanceInfo, WalletError> {
        let record = self.resolve(key).await?;
        let _wallet = self.locks.acquire(record.wallet_id).await;
        let output = self.exec(record.wallet_id, WalletCommand::Info).await?;
        parse_balance_info(&output).map_err(WalletError::BalanceUnavailable)
    }

    /// Raw send output; it embeds the importinput token for the receiver.
    pub async fn send(&self, sender_id: &str, receiver_address: &str, amount: u64) -> Result<String, WalletError> {
        let sender = self.resolve_id(sender_id).await?;
        self.send_from(&sender, receiver_address, amount).await
    }

    /// importinput → sync → info on the target wallet; returns the info text.
    pub async fn import(&self, wallet_id: &str, token: &str) -> Result<String, WalletError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(WalletError::InvalidInput("importinput is empty".into()));
        }
        let record = self.resolve_id(wallet_id).await?;
        self.run_import(record.wallet_id, token).await.map_err(|f| WalletError::StepFailed { step: f.step, source: f.source })
    }

    /// Send, then import the resulting output into the receiver's wallet.
    ///
    /// There is no rollback. If the import chain fails after the send went
    /// through, the error is [`WalletError::InFlight`] carrying the token.
    pub async fn send_and_import(&self, sender_id: &str, receiver_address: &str, amount: u64) -> Result<String, WalletError> {
        let sender = self.resolve_id(sender_id).await?;
        // Resolved before sending so an unknown receiver never strands funds.
        let receiver = self.resolve(receiver_address).await?;

        let sent = self.send_from(&sender, &receiver.address, amount).await?;
        let token = parse_continuation_token(&sent).ok_or(WalletError::TokenExtractionFailed)?;

        self.run_import(receiver.wallet_id, &token).await.map_err(|f| {
            let completed: Vec<&str> = f.completed.iter().map(|s| s.step).collect();
            tracing::error!(
                sender = sender.wallet_id,
                receiver = receiver.wallet_id,
                token = %token,
                step = f.step,
                completed = ?completed,
                "send succeeded but import failed; funds in flight"
            );
            WalletError::InFlight { receiver: receiver.wallet_id, token: token.clone(), step: f.step, source: f.source }
        })
    }

    /// Warn when wallet files on disk are ahead of the registry; a new
    /// wallet would otherwise reuse an existing wallet file.
    pub async fn check_artifacts(&self) -> Result<(), WalletError> {
        let Some(dir) = self.work_dir.as_deref() else { return Ok(()) };
        let next = self.registry.allocate_next_identifier().await?;
        match highest_artifact_id(dir) {
            Ok(Some(highest)) if highest >= next => {
                tracing::warn!(highest, next, dir = %dir.display(), "wallet files exist beyond the registry; the registry stays authoritative");
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, dir = %dir.display(), "cannot scan wallet files"),
        }
        Ok(())
    }

    async fn send_from(&self, sender: &WalletRecord, receiver_address: &str, amount: u64) -> Result<String, WalletError> {
        let receiver_address = receiver_address.trim();
        if receiver_address.is_empty() {
            return Err(WalletError::InvalidInput("receiverAddress is empty".into()));
        }
        let _wallet = self.locks.acquire(sender.wallet_id).await;
        let command = WalletCommand::Send { amount, address: receiver_address.to_string() };
        Ok(self.exec(sender.wallet_id, command).await?)
    }

    async fn run_import(&self, wallet_id: u64, token: &str) -> Result<String, StepFailure> {
        let _wallet = self.locks.acquire(wallet_id).await;
        let mut steps = StepChain::import(token)
            .run(self.runner.as_ref(), &self.files(wallet_id), self.work_dir.as_deref())
            .await?;
        Ok(steps.pop().map(|s| s.output).unwrap_or_default())
    }

    async fn exec(&self, wallet_id: u64, command: WalletCommand) -> Result<String, ProcessError> {
        tracing::debug!(wallet_id, subcommand = command.name(), "client-cli");
        self.runner.run(&command.args(&self.files(wallet_id)), self.work_dir.as_deref()).await
    }

    fn files(&self, wallet_id: u64) -> WalletFiles { WalletFiles::for_wallet(&self.cli_config, wallet_id) }

    async fn resolve(&self, key: &str) -> Result<WalletRecord, WalletError> {
        self.registry.lookup(key).await?.ok_or_else(|| WalletError::NotFound(key.trim().to_string()))
    }

    async fn resolve_id(&self, wallet_id: &str) -> Result<WalletRecord, WalletError> {
        let not_found = || WalletError::NotFound(wallet_id.trim().to_string());
        let id = wallet_id.trim().parse::<u64>().map_err(|_| not_found())?;
        self.registry.lookup_id(id).await?.ok_or_else(not_found)
    }
}
