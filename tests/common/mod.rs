//! Shared test doubles for client-cli.

#![allow(dead_code)]

use async_trait::async_trait;
use cbdc_wallet_proxy::{CommandRunner, ProcessError, WalletRegistry, WalletService};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const INFO_OUTPUT: &str = "Balance: $12.50, UTXOs: 3, pending TXs: 0\n";
pub const SEND_OUTPUT: &str = "tx_id:\n7f3a\nimportinput:\n7f3a00c0ffee\nSent 10\n";

type Respond = dyn Fn(&[String]) -> Result<String, ProcessError> + Send + Sync;

/// Answers every invocation with `respond` and records the argv.
pub struct ScriptedRunner {
    respond: Box<Respond>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl ScriptedRunner {
    pub fn new(respond: impl Fn(&[String]) -> Result<String, ProcessError> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self { respond: Box::new(respond), calls: Mutex::new(Vec::new()) })
    }

    /// Behaves like a healthy client-cli.
    pub fn happy() -> Arc<Self> { Self::new(happy_response) }

    pub fn calls(&self) -> Vec<Vec<String>> { self.calls.lock().unwrap().clone() }

    /// `(subcommand, wallet file)` per call, in order.
    pub fn trace(&self) -> Vec<(String, String)> {
        self.calls().iter().map(|a| (a[3].clone(), a[2].clone())).collect()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, args: &[String], _work_dir: Option<&Path>) -> Result<String, ProcessError> {
        self.calls.lock().unwrap().push(args.to_vec());
        (self.respond)(args)
    }
}

pub fn happy_response(args: &[String]) -> Result<String, ProcessError> {
    Ok(match args[3].as_str() {
        "newaddress" => format!("{}\nusd1q{}addr\n", "[INFO] new address", digits(&args[2])),
        "mint" => format!("minted {} x {}\n", args[4], args[5]),
        "info" => INFO_OUTPUT.to_string(),
        "send" => SEND_OUTPUT.to_string(),
        "importinput" => "imported\n".to_string(),
        "sync" => "synced\n".to_string(),
        other => return Err(ProcessError::Failed { exit_code: Some(2), output: format!("unknown {other}") }),
    })
}

pub fn failure(output: &str) -> ProcessError {
    ProcessError::Failed { exit_code: Some(1), output: output.to_string() }
}

fn digits(s: &str) -> String { s.chars().filter(char::is_ascii_digit).collect() }

pub fn service(runner: Arc<ScriptedRunner>) -> (WalletService, TempDir) {
    let dir = TempDir::new().expect("tempdir");
    let registry = WalletRegistry::open(dir.path().join("walletInfo.json"));
    (WalletService::new(runner, registry), dir)
}

/// Service with wallets 0 (usd1alice) and 1 (usd1bob) already registered.
pub async fn seeded(runner: Arc<ScriptedRunner>) -> (WalletService, TempDir) {
    let (svc, dir) = service(runner);
    svc.registry().register(0, "usd1alice", None).await.expect("seed alice");
    svc.registry().register(1, "usd1bob", None).await.expect("seed bob");
    (svc, dir)
}
