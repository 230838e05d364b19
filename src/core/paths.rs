//! Path and name constants for the proxy
//!
//! Centralized registry for client-cli subcommands, per-wallet file names
//! and HTTP routes.

/// client-cli subcommands
pub mod subcommand {
    pub const NEW_ADDRESS: &str = "newaddress";
    pub const MINT: &str = "mint";
    pub const INFO: &str = "info";
    pub const SEND: &str = "send";
    pub const IMPORT_INPUT: &str = "importinput";
    pub const SYNC: &str = "sync";
}

/// Files the proxy owns or hands to client-cli
pub mod files {
    pub const CLI_CONFIG: &str = "2pc-compose.cfg";
    pub const CLI_BINARY: &str = "bin/client-cli";
    pub const REGISTRY: &str = "walletInfo.json";

    pub const MEMPOOL_PREFIX: &str = "mempool";
    pub const WALLET_PREFIX: &str = "wallet";
    pub const EXTENSION: &str = ".dat";

    pub fn mempool(wallet_id: u64) -> String { format!("{MEMPOOL_PREFIX}{wallet_id}{EXTENSION}") }
    pub fn wallet(wallet_id: u64) -> String { format!("{WALLET_PREFIX}{wallet_id}{EXTENSION}") }
}

/// HTTP routes
pub mod routes {
    pub const HEALTH: &str = "/health";
    pub const WALLET: &str = "/wallet";
    pub const WALLET_BY_ID: &str = "/wallet/:wallet_id";
    pub const MINT: &str = "/mint";
    pub const BALANCE: &str = "/balance/:wallet_id";
    pub const SEND: &str = "/send";
    pub const IMPORT: &str = "/importfunds";
    pub const SEND_AND_IMPORT: &str = "/sendandimport";

    pub const API_KEY_HEADER: &str = "X-API-KEY";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wallet_files_derive_from_id() {
        assert_eq!(files::mempool(0), "mempool0.dat");
        assert_eq!(files::wallet(17), "wallet17.dat");
    }
}
