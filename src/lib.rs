//! cbdc-wallet-proxy: HTTP front for the OpenCBDC `client-cli` wallet.
//!
//! # Architecture
//!
//! ```text
//! HTTP (axum)            CLI (bin/main.rs)
//!   │  X-API-KEY check      │
//!   └──────────┬────────────┘
//!              ▼
//!        WalletService ─────────── WalletRegistry (walletInfo.json)
//!              │
//!              ├── StepChain (importinput → sync → info)
//!              ▼
//!        CommandRunner ─── client-cli <cfg> mempool<ID>.dat wallet<ID>.dat <subcommand>
//!              │
//!              ▼
//!        core::parse (address | balance | importinput token)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use cbdc_wallet_proxy::{ProxyConfig, WalletService};
//!
//! let config = ProxyConfig::from_env().with_work_dir("/var/lib/opencbdc");
//! let wallets = WalletService::from_config(&config);
//!
//! let wallet = wallets.create_wallet().await?;
//! wallets.mint(&wallet.wallet_id.to_string(), 1, 100).await?;
//! let balance = wallets.balance(&wallet.address).await?;
//! ```

pub mod auth;
pub mod config;
pub mod core;
pub mod logging;
pub mod process;
pub mod registry;
pub mod runtime;
pub mod server;
pub mod wallet;

pub use auth::ApiKey;
pub use config::ProxyConfig;
pub use crate::core::command::{WalletCommand, WalletFiles};
pub use crate::core::parse::{parse_address, parse_balance_info, parse_continuation_token, BalanceInfo, ParseError};
pub use process::{CliRunner, CommandRunner, ProcessError};
pub use registry::{RegistryError, WalletRecord, WalletRegistry};
pub use runtime::shutdown_signal;
pub use server::{create_router, create_router_with_name};
pub use wallet::{StepChain, WalletError, WalletService};
