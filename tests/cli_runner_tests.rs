//! CliRunner against a stand-in client-cli shell script.
//!
//! These tests verify:
//! 1. stdout is returned on exit 0, captured output kept on failure
//! 2. launch failures and timeouts are distinct errors
//! 3. the full WalletService flow over a real subprocess

#![cfg(unix)]

use cbdc_wallet_proxy::{CliRunner, CommandRunner, ProcessError, ProxyConfig, WalletService};
use once_cell::sync::Lazy;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::Mutex;

// A script written while another test forks can fail with "text file busy".
static SCRIPT_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

const FAKE_CLIENT_CLI: &str = r#"#!/bin/sh
# client-cli <cfg> <mempool> <wallet> <subcommand> [args...]
echo "$4 $3" >> calls.log
case "$4" in
  newaddress) echo "[INFO ] generated"; echo "usd1q$(echo "$3" | tr -dc '0-9')fake" ;;
  mint) echo "minted $5 utxos of $6" ;;
  info) echo "Balance: \$1.00, UTXOs: 1, pending TXs: 0" ;;
  send) printf 'tx_id:\nfeed\nimportinput:\nfeed0001\n' ;;
  importinput) echo "imported $5" ;;
  sync) echo "synced" ;;
  fail) echo "partial output"; echo "bad things" >&2; exit 3 ;;
  hang) sleep 5 ;;
  pwd) pwd ;;
  *) exit 64 ;;
esac
"#;

fn write_script(dir: &Path) -> PathBuf {
    let path = dir.join("client-cli");
    std::fs::write(&path, FAKE_CLIENT_CLI).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn args(subcommand: &str) -> Vec<String> {
    ["2pc-compose.cfg", "mempool0.dat", "wallet0.dat", subcommand].iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn returns_stdout_on_success() {
    let _guard = SCRIPT_LOCK.lock().await;
    let dir = TempDir::new().unwrap();
    let runner = CliRunner::new(write_script(dir.path())).with_work_dir(dir.path());

    let out = runner.run(&args("info"), None).await.unwrap();
    assert_eq!(out, "Balance: $1.00, UTXOs: 1, pending TXs: 0\n");
}

#[tokio::test]
async fn failure_keeps_captured_output() {
    let _guard = SCRIPT_LOCK.lock().await;
    let dir = TempDir::new().unwrap();
    let runner = CliRunner::new(write_script(dir.path())).with_work_dir(dir.path());

    match runner.run(&args("fail"), None).await {
        Err(ProcessError::Failed { exit_code, output }) => {
            assert_eq!(exit_code, Some(3));
            assert!(output.contains("partial output"));
            assert!(output.contains("bad things"));
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_binary_is_spawn_error() {
    let _guard = SCRIPT_LOCK.lock().await;
    let dir = TempDir::new().unwrap();
    let runner = CliRunner::new(dir.path().join("no-such-client-cli"));
    assert!(matches!(runner.run(&args("info"), None).await, Err(ProcessError::Spawn { .. })));
}

#[tokio::test]
async fn timeout_kills_hung_process() {
    let _guard = SCRIPT_LOCK.lock().await;
    let dir = TempDir::new().unwrap();
    let runner = CliRunner::new(write_script(dir.path()))
        .with_work_dir(dir.path())
        .with_timeout(Some(Duration::from_millis(200)));

    let started = std::time::Instant::now();
    assert!(matches!(runner.run(&args("hang"), None).await, Err(ProcessError::TimedOut(_))));
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn explicit_work_dir_overrides_default() {
    let _guard = SCRIPT_LOCK.lock().await;
    let dir = TempDir::new().unwrap();
    let other = TempDir::new().unwrap();
    let runner = CliRunner::new(write_script(dir.path())).with_work_dir(dir.path());

    let out = runner.run(&args("pwd"), Some(other.path())).await.unwrap();
    let reported = std::fs::canonicalize(out.trim()).unwrap();
    assert_eq!(reported, std::fs::canonicalize(other.path()).unwrap());
}

#[tokio::test]
async fn wallet_flow_over_real_subprocess() {
    let _guard = SCRIPT_LOCK.lock().await;
    let dir = TempDir::new().unwrap();
    let config = ProxyConfig::new().with_cli(write_script(dir.path())).with_work_dir(dir.path());
    let wallets = WalletService::from_config(&config);

    let alice = wallets.create_wallet().await.unwrap();
    let bob = wallets.create_wallet().await.unwrap();
    assert_eq!((alice.wallet_id, alice.address.as_str()), (0, "usd1q0fake"));
    assert_eq!((bob.wallet_id, bob.address.as_str()), (1, "usd1q1fake"));

    assert_eq!(wallets.mint("0", 1, 100).await.unwrap(), "minted 1 utxos of 100\n");
    assert_eq!(wallets.balance("usd1q0fake").await.unwrap().balance, "1.00");

    let info = wallets.send_and_import("0", &bob.address, 10).await.unwrap();
    assert!(info.starts_with("Balance: $1.00"));

    let log = std::fs::read_to_string(dir.path().join("calls.log")).unwrap();
    let calls: Vec<&str> = log.lines().collect();
    assert_eq!(
        calls,
        [
            "newaddress wallet0.dat",
            "newaddress wallet1.dat",
            "mint wallet0.dat",
            "info wallet0.dat",
            "send wallet0.dat",
            "importinput wallet1.dat",
            "sync wallet1.dat",
            "info wallet1.dat",
        ]
    );

    let registry = std::fs::read_to_string(config.registry_path()).unwrap();
    let records: serde_json::Value = serde_json::from_str(&registry).unwrap();
    assert_eq!(records.as_array().map(Vec::len), Some(2));
}
