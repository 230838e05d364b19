//! Parsers for client-cli output
//!
//! client-cli has no structured output mode, so these patterns are the
//! whole contract between the proxy and the tool. All functions are pure.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static ADDRESS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(usd\w+)\b").expect("address regex"));
static BALANCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Balance: \$(\d+(?:\.\d+)?),").expect("balance regex"));
static UTXOS: Lazy<Regex> = Lazy::new(|| Regex::new(r"UTXOs: (\d+),").expect("utxos regex"));
static PENDING: Lazy<Regex> = Lazy::new(|| Regex::new(r"pending TXs: (\d+)").expect("pending regex"));
static IMPORT_INPUT: Lazy<Regex> = Lazy::new(|| Regex::new(r"importinput:\r?\n(\w+)").expect("importinput regex"));

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("no address in client-cli output")]
    MissingAddress,

    #[error("no '{0}' field in client-cli output")]
    MissingField(&'static str),
}

/// Output of `info`. Serializes with string values, the shape API clients
/// already consume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceInfo {
    pub balance: String,
    #[serde(with = "as_string")]
    pub utxos: u64,
    #[serde(with = "as_string")]
    pub pending: u64,
}

pub fn parse_address(text: &str) -> Result<String, ParseError> {
    ADDRESS.captures(text).map(|c| c[1].to_string()).ok_or(ParseError::MissingAddress)
}

/// All three anchors must be present; there is no partial result.
pub fn parse_balance_info(text: &str) -> Result<BalanceInfo, ParseError> {
    let balance = capture(&BALANCE, text, "balance")?.to_string();
    let utxos = capture(&UTXOS, text, "utxos")?.parse().map_err(|_| ParseError::MissingField("utxos"))?;
    let pending = capture(&PENDING, text, "pending")?.parse().map_err(|_| ParseError::MissingField("pending"))?;
    Ok(BalanceInfo { balance, utxos, pending })
}

/// `None` means the send produced no output for the receiver to import.
pub fn parse_continuation_token(text: &str) -> Option<String> {
    IMPORT_INPUT.captures(text).map(|c| c[1].to_string())
}

fn capture<'t>(re: &Regex, text: &'t str, field: &'static str) -> Result<&'t str, ParseError> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .ok_or(ParseError::MissingField(field))
}

mod as_string {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u64, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        String::deserialize(d)?.parse().map_err(D::Error::custom)
    }
}
