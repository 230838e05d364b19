//! Wallet module - orchestrates client-cli on behalf of API callers
//!
//! # Architecture
//!
//! ```text
//! WalletService
//!     │
//!     ├── WalletRegistry ── walletID ↔ address (walletInfo.json)
//!     │
//!     ├── WalletLocks ───── one chain at a time per walletID
//!     │
//!     └── CommandRunner ─── client-cli <cfg> mempool<ID>.dat wallet<ID>.dat <subcommand>
//!                                 │
//!                                 ▼
//!                           core::parse (address, balance, importinput token)
//! ```
//!
//! # Operations
//!
//! | Method | client-cli steps | Result |
//! |--------|------------------|--------|
//! | `create_wallet` | newaddress | `{walletID, address}` |
//! | `get_wallet` | - | registry record |
//! | `mint` | mint | raw text |
//! | `balance` | info | `{balance, utxos, pending}` |
//! | `send` | send | raw text with importinput token |
//! | `import` | importinput → sync → info | raw info text |
//! | `send_and_import` | send, then importinput → sync → info on receiver | raw info text |

mod error;
mod locks;
mod service;
mod steps;

pub use error::WalletError;
pub use locks::WalletLocks;
pub use service::WalletService;
pub use steps::{StepChain, StepFailure, StepOutput};
