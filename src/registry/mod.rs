//! Wallet registry - walletID → address mapping persisted as one JSON array
//!
//! The file is read fully on every query and rewritten fully on every
//! registration. Each registration holds an exclusive lock on the sidecar
//! `walletInfo.json.lock` across load, append and commit, so writers in
//! other processes (the CLI next to a running server) are serialized too.
//! Commits go through a uniquely named temp file in the same directory and
//! are persisted over the registry with a rename; readers never see a torn
//! document.
//!
//! The registry is the only authority for identifiers. On-disk
//! `wallet<N>.dat` artifacts are derived state; [`highest_artifact_id`]
//! exists so startup can warn when the two disagree.

use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::core::paths::files;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("invalid wallet record: {0}")]
    InvalidRecord(String),

    #[error("wallet {0} is already registered")]
    DuplicateId(u64),

    #[error("registry io: {0}")]
    Io(#[from] std::io::Error),

    #[error("registry json: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletRecord {
    #[serde(rename = "walletID")]
    pub wallet_id: u64,
    pub address: String,
    /// Only set when key material was generated by the proxy itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
}

pub struct WalletRegistry {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl WalletRegistry {
    /// The file is created lazily on first registration.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path { &self.path }

    pub async fn all(&self) -> Result<Vec<WalletRecord>, RegistryError> {
        self.load().await
    }

    /// Next free identifier. Not reserved: register it before anyone else
    /// allocates, or hold an outer lock across both calls.
    pub async fn allocate_next_identifier(&self) -> Result<u64, RegistryError> {
        next_identifier(&self.load().await?)
    }

    pub async fn register(&self, wallet_id: u64, address: &str, secret: Option<String>) -> Result<WalletRecord, RegistryError> {
        if address.trim().is_empty() {
            return Err(RegistryError::InvalidRecord("address is empty".into()));
        }
        let _guard = self.write_lock.lock().await;
        let record = WalletRecord { wallet_id, address: address.to_string(), secret };
        let path = self.path.clone();
        let appended = record.clone();
        tokio::task::spawn_blocking(move || append_locked(&path, appended))
            .await
            .map_err(|e| RegistryError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))??;
        tracing::info!(wallet_id, address = %record.address, "wallet registered");
        Ok(record)
    }

    /// Resolve a walletID (canonical integer form) or an address to the
    /// first matching record. A missing registry file is simply empty.
    pub async fn lookup(&self, key: &str) -> Result<Option<WalletRecord>, RegistryError> {
        let key = key.trim();
        let id = key.parse::<u64>().ok();
        Ok(self
            .load()
            .await?
            .into_iter()
            .find(|r| Some(r.wallet_id) == id || r.address == key))
    }

    pub async fn lookup_id(&self, wallet_id: u64) -> Result<Option<WalletRecord>, RegistryError> {
        Ok(self.load().await?.into_iter().find(|r| r.wallet_id == wallet_id))
    }

    async fn load(&self) -> Result<Vec<WalletRecord>, RegistryError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => parse_records(&raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }
}

fn parse_records(raw: &str) -> Result<Vec<WalletRecord>, RegistryError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(raw)?)
}

/// Load, append and commit under the sidecar lock. Blocking.
fn append_locked(path: &Path, record: WalletRecord) -> Result<(), RegistryError> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    std::fs::create_dir_all(dir)?;

    let mut lock_path = path.as_os_str().to_owned();
    lock_path.push(".lock");
    let lock = OpenOptions::new().read(true).write(true).create(true).truncate(false).open(PathBuf::from(lock_path))?;
    // Released when `lock` is closed.
    lock.lock_exclusive()?;

    let mut records = match std::fs::read_to_string(path) {
        Ok(raw) => parse_records(&raw)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(e) => return Err(e.into()),
    };
    if records.iter().any(|r| r.wallet_id == record.wallet_id) {
        return Err(RegistryError::DuplicateId(record.wallet_id));
    }
    records.push(record);

    let mut tmp = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(tmp.as_file_mut(), &records)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn next_identifier(records: &[WalletRecord]) -> Result<u64, RegistryError> {
    let mut next = records.len() as u64;
    for record in records {
        let after = record
            .wallet_id
            .checked_add(1)
            .ok_or_else(|| RegistryError::InvalidRecord("walletID space exhausted".into()))?;
        next = next.max(after);
    }
    Ok(next)
}

/// Highest N among `wallet<N>.dat` files in `dir`, if any.
pub fn highest_artifact_id(dir: &Path) -> std::io::Result<Option<u64>> {
    let mut highest = None;
    for entry in std::fs::read_dir(dir)? {
        let name = entry?.file_name();
        let Some(name) = name.to_str() else { continue };
        let id = name
            .strip_prefix(files::WALLET_PREFIX)
            .and_then(|rest| rest.strip_suffix(files::EXTENSION))
            .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|digits| digits.parse::<u64>().ok());
        if let Some(id) = id {
            highest = highest.max(Some(id));
        }
    }
    Ok(highest)
}
